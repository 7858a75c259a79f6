//! Conversation and messaging repository.
//!
//! Unread counts and last-message projections are always computed at read
//! time from the `messages` rows. Conversations carry snapshot display
//! names and no foreign keys to the participants, so a missing user or
//! opportunity is tolerated with a placeholder name.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use volunhub_core::error::AppError;
use volunhub_core::result::AppResult;
use volunhub_entity::conversation::placeholder;
use volunhub_entity::conversation::{
    Conversation, ConversationSummary, ConversationWithMessages, LastMessage, Message,
    NewConversation, ParticipantRole,
};

use crate::connection::Database;

/// Longest message body accepted by [`ConversationRepository::send_message`].
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// Repository for conversations and their messages.
#[derive(Debug, Clone)]
pub struct ConversationRepository {
    db: Database,
}

/// A conversation row joined with its derived unread count and the
/// columns of its newest message.
#[derive(Debug, FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    conversation: Conversation,
    unread_count: i64,
    last_message_id: Option<Uuid>,
    last_message_sender_id: Option<Uuid>,
    last_message_text: Option<String>,
    last_message_created_at: Option<DateTime<Utc>>,
    last_message_is_read: Option<bool>,
}

impl SummaryRow {
    fn into_summary(self) -> ConversationSummary {
        let last_message = match (
            self.last_message_id,
            self.last_message_sender_id,
            self.last_message_text,
            self.last_message_created_at,
            self.last_message_is_read,
        ) {
            (Some(id), Some(sender_id), Some(text), Some(created_at), Some(is_read)) => {
                Some(LastMessage {
                    id,
                    sender_id,
                    text,
                    created_at,
                    is_read,
                })
            }
            _ => None,
        };

        ConversationSummary {
            conversation: self.conversation,
            unread_count: self.unread_count,
            last_message,
        }
    }
}

impl ConversationRepository {
    /// Create a new conversation repository.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Find or create the conversation for the (organization, volunteer,
    /// opportunity) triple and append the initial message from the
    /// organization.
    pub async fn create_conversation(&self, data: NewConversation) -> AppResult<ConversationWithMessages> {
        data.validate()?;
        let text = message_text(&data.initial_message)?;

        let view = self
            .db
            .with_transaction("create_conversation", move |conn| {
                Box::pin(async move {
                    let id = ensure_conversation(
                        conn,
                        data.organization_id,
                        data.volunteer_id,
                        data.opportunity_id,
                    )
                    .await?;

                    insert_message(conn, id, data.organization_id, &text).await?;

                    let conversation = load_conversation(conn, id)
                        .await?
                        .ok_or_else(|| AppError::internal("Conversation row missing after upsert"))?;
                    let messages = load_messages(conn, id).await?;
                    Ok(ConversationWithMessages {
                        conversation,
                        messages,
                    })
                })
            })
            .await?;

        info!(
            conversation_id = %view.conversation.id,
            organization_id = %view.conversation.organization_id,
            volunteer_id = %view.conversation.volunteer_id,
            "Conversation opened"
        );
        Ok(view)
    }

    /// All conversations of a user on the given side, most recently active
    /// first, each with its unread count and newest message.
    pub async fn get_conversations_for_user(
        &self,
        user_id: Uuid,
        role: ParticipantRole,
    ) -> AppResult<Vec<ConversationSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(&summary_sql(role))
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| AppError::from_sqlx("Failed to list conversations", e))?;

        Ok(rows.into_iter().map(SummaryRow::into_summary).collect())
    }

    /// Open a conversation.
    ///
    /// Returns the conversation with every message in chronological order,
    /// then marks the other party's messages read. The returned `is_read`
    /// flags are the values from before this call.
    pub async fn get_conversation_details(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        role: ParticipantRole,
    ) -> AppResult<ConversationWithMessages> {
        self.db
            .with_transaction("get_conversation_details", move |conn| {
                Box::pin(async move {
                    let conversation = require_member(conn, conversation_id, user_id, role).await?;
                    let messages = load_messages(conn, conversation_id).await?;
                    mark_read(conn, conversation_id, user_id).await?;
                    Ok(ConversationWithMessages {
                        conversation,
                        messages,
                    })
                })
            })
            .await
    }

    /// Mark every unread message from the other party as read. Returns how
    /// many messages changed.
    pub async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        role: ParticipantRole,
    ) -> AppResult<u64> {
        let count = self
            .db
            .with_transaction("mark_conversation_read", move |conn| {
                Box::pin(async move {
                    require_member(conn, conversation_id, user_id, role).await?;
                    mark_read(conn, conversation_id, user_id).await
                })
            })
            .await?;

        info!(conversation_id = %conversation_id, user_id = %user_id, count, "Conversation marked read");
        Ok(count)
    }

    /// Append an unread message and move the conversation to the top of
    /// recency-sorted listings.
    pub async fn send_message(&self, conversation_id: Uuid, sender_id: Uuid, text: &str) -> AppResult<Message> {
        let text = message_text(text)?;

        let message = self
            .db
            .with_transaction("send_message", move |conn| {
                Box::pin(async move {
                    let conversation = load_conversation(conn, conversation_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::not_found(format!("Conversation {conversation_id} not found"))
                        })?;

                    if sender_id != conversation.organization_id && sender_id != conversation.volunteer_id {
                        return Err(AppError::not_found(format!(
                            "Conversation {conversation_id} not found"
                        )));
                    }

                    insert_message(conn, conversation_id, sender_id, &text).await
                })
            })
            .await?;

        info!(conversation_id = %conversation_id, message_id = %message.id, "Message sent");
        Ok(message)
    }
}

fn message_text(text: &str) -> AppResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::validation("Message text cannot be empty"));
    }
    if text.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::validation(format!(
            "Message text exceeds {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(text.to_string())
}

fn summary_sql(role: ParticipantRole) -> String {
    format!(
        "SELECT c.id, c.organization_id, c.volunteer_id, c.opportunity_id, c.opportunity_title, \
         c.organization_name, c.volunteer_name, c.created_at, c.updated_at, \
         (SELECT COUNT(*) FROM messages m \
          WHERE m.conversation_id = c.id AND m.sender_id <> $1 AND m.is_read = FALSE) AS unread_count, \
         lm.id AS last_message_id, lm.sender_id AS last_message_sender_id, \
         lm.text AS last_message_text, lm.created_at AS last_message_created_at, \
         lm.is_read AS last_message_is_read \
         FROM conversations c \
         LEFT JOIN LATERAL ( \
           SELECT m.id, m.sender_id, m.text, m.created_at, m.is_read FROM messages m \
           WHERE m.conversation_id = c.id ORDER BY m.created_at DESC, m.id DESC LIMIT 1 \
         ) lm ON TRUE \
         WHERE c.{} = $1 \
         ORDER BY c.updated_at DESC, c.id",
        role.column()
    )
}

/// Return the id of the conversation for the triple, creating it when
/// absent. An existing conversation only has its updated timestamp
/// refreshed.
pub(crate) async fn ensure_conversation(
    conn: &mut PgConnection,
    organization_id: Uuid,
    volunteer_id: Uuid,
    opportunity_id: Uuid,
) -> AppResult<Uuid> {
    let existing: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM conversations \
         WHERE organization_id = $1 AND volunteer_id = $2 AND opportunity_id = $3",
    )
    .bind(organization_id)
    .bind(volunteer_id)
    .bind(opportunity_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::from_sqlx("Failed to look up conversation", e))?;

    if let Some(id) = existing {
        touch(conn, id).await?;
        return Ok(id);
    }

    let organization_name = resolve_name(
        conn,
        "SELECT name FROM users WHERE id = $1",
        organization_id,
        "organization",
        placeholder::organization_name,
    )
    .await?;
    let volunteer_name = resolve_name(
        conn,
        "SELECT name FROM users WHERE id = $1",
        volunteer_id,
        "volunteer",
        placeholder::volunteer_name,
    )
    .await?;
    let opportunity_title = resolve_name(
        conn,
        "SELECT title FROM opportunities WHERE id = $1",
        opportunity_id,
        "opportunity",
        placeholder::opportunity_title,
    )
    .await?;

    // A concurrent creator may have inserted the triple since the lookup.
    sqlx::query_scalar(
        "INSERT INTO conversations (organization_id, volunteer_id, opportunity_id, \
         opportunity_title, organization_name, volunteer_name) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT ON CONSTRAINT conversations_participants_key \
         DO UPDATE SET updated_at = clock_timestamp() \
         RETURNING id",
    )
    .bind(organization_id)
    .bind(volunteer_id)
    .bind(opportunity_id)
    .bind(&opportunity_title)
    .bind(&organization_name)
    .bind(&volunteer_name)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::from_sqlx("Failed to create conversation", e))
}

async fn resolve_name(
    conn: &mut PgConnection,
    sql: &'static str,
    id: Uuid,
    entity: &'static str,
    fallback: fn(Uuid) -> String,
) -> AppResult<String> {
    let name: Option<String> = sqlx::query_scalar(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx(format!("Failed to resolve {entity} name"), e))?;

    Ok(name.unwrap_or_else(|| {
        let name = fallback(id);
        warn!(entity, id = %id, placeholder = %name, "Referential gap, using placeholder name");
        name
    }))
}

async fn touch(conn: &mut PgConnection, conversation_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE conversations SET updated_at = clock_timestamp() WHERE id = $1")
        .bind(conversation_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to touch conversation", e))?;
    Ok(())
}

async fn insert_message(
    conn: &mut PgConnection,
    conversation_id: Uuid,
    sender_id: Uuid,
    text: &str,
) -> AppResult<Message> {
    let message = sqlx::query_as::<_, Message>(
        "INSERT INTO messages (id, conversation_id, sender_id, text) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(conversation_id)
    .bind(sender_id)
    .bind(text)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::from_sqlx("Failed to insert message", e))?;

    touch(conn, conversation_id).await?;
    Ok(message)
}

async fn load_conversation(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Conversation>> {
    sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::from_sqlx("Failed to load conversation", e))
}

async fn load_messages(conn: &mut PgConnection, conversation_id: Uuid) -> AppResult<Vec<Message>> {
    sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at, id",
    )
    .bind(conversation_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::from_sqlx("Failed to load messages", e))
}

/// Load a conversation the caller participates in on the given side.
/// Non-members get the same `NotFound` as a missing conversation.
async fn require_member(
    conn: &mut PgConnection,
    conversation_id: Uuid,
    user_id: Uuid,
    role: ParticipantRole,
) -> AppResult<Conversation> {
    load_conversation(conn, conversation_id)
        .await?
        .filter(|c| role.is_member(c, user_id))
        .ok_or_else(|| AppError::not_found(format!("Conversation {conversation_id} not found")))
}

async fn mark_read(conn: &mut PgConnection, conversation_id: Uuid, reader_id: Uuid) -> AppResult<u64> {
    let result = sqlx::query(
        "UPDATE messages SET is_read = TRUE \
         WHERE conversation_id = $1 AND sender_id <> $2 AND is_read = FALSE",
    )
    .bind(conversation_id)
    .bind(reader_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::from_sqlx("Failed to mark messages read", e))?;
    Ok(result.rows_affected())
}
