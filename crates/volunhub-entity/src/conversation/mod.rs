//! Conversation and messaging entities.

pub mod model;
pub mod participant;
pub mod placeholder;

pub use model::{
    Conversation, ConversationSummary, ConversationWithMessages, LastMessage, Message,
    NewConversation,
};
pub use participant::ParticipantRole;
