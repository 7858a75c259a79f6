//! Which side of a conversation the caller is on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Conversation;

/// The caller's side of an organization–volunteer conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Volunteer,
    Organization,
}

impl ParticipantRole {
    /// Column holding this side's user id.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Volunteer => "volunteer_id",
            Self::Organization => "organization_id",
        }
    }

    /// Whether `user_id` is this side of `conversation`.
    pub fn is_member(&self, conversation: &Conversation, user_id: Uuid) -> bool {
        match self {
            Self::Volunteer => conversation.volunteer_id == user_id,
            Self::Organization => conversation.organization_id == user_id,
        }
    }
}
