use async_trait::async_trait;

use super::types::BackendError;
use crate::models::{
    Conversation, FeedbackRequest, ImageAttachment, Message, Profile, ProfileRequest,
};

#[async_trait]
pub trait Backend: Send + Sync {
    async fn get_profile(&self) -> Result<Profile, BackendError>;

    async fn create_profile(&self, request: &ProfileRequest) -> Result<(), BackendError>;

    /// Replace the stored profile; returns the server's canonical copy.
    async fn update_profile(&self, profile: &Profile) -> Result<Profile, BackendError>;

    async fn get_conversations(&self) -> Result<Vec<Conversation>, BackendError>;

    async fn create_conversation(&self) -> Result<Conversation, BackendError>;

    async fn get_conversation_messages(
        &self,
        conversation_id: i64,
    ) -> Result<Vec<Message>, BackendError>;

    /// Does not return the stored message; callers reload the conversation afterwards.
    async fn send_chat_message(
        &self,
        text: &str,
        image: Option<&ImageAttachment>,
        conversation_id: Option<i64>,
    ) -> Result<(), BackendError>;

    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<(), BackendError>;

    /// Clears every conversation, message, profile and feedback entry on the server.
    async fn reset_demo(&self) -> Result<(), BackendError>;
}
