//! Conversation and message models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A thread between one organization and one volunteer about one
/// opportunity. At most one exists per triple.
///
/// The three name fields are snapshots taken when the thread is created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub volunteer_id: Uuid,
    pub opportunity_id: Uuid,
    pub opportunity_title: String,
    pub organization_name: String,
    pub volunteer_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single message. Only `is_read` ever changes, and only false → true.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Projection of the newest message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// A conversation as listed in a user's inbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    /// Unread messages sent by the other party.
    pub unread_count: i64,
    pub last_message: Option<LastMessage>,
}

/// A conversation with its full message history, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationWithMessages {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

/// Request to open (or reuse) a conversation with an initial message
/// from the organization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewConversation {
    pub organization_id: Uuid,
    pub volunteer_id: Uuid,
    pub opportunity_id: Uuid,
    #[validate(length(min = 1, max = 5000))]
    pub initial_message: String,
}
