use crate::backend::{Backend, BackendError};
use crate::models::{Conversation, ImageAttachment, LocalId, Message, Profile};
use crate::services::preview::ImagePreview;

/// Everything needed to deliver one message, detached from the application state so it
/// can run while the state keeps serving reads and conversation switches.
#[derive(Debug)]
pub struct SendJob {
    pub local_id: LocalId,
    pub conversation_id: i64,
    pub text: String,
    pub image: Option<ImageAttachment>,
}

#[derive(Debug)]
pub struct Refresh {
    pub messages: Result<Vec<Message>, BackendError>,
    pub conversations: Result<Vec<Conversation>, BackendError>,
    pub profile: Result<Profile, BackendError>,
}

impl Refresh {
    pub async fn fetch(backend: &dyn Backend, conversation_id: i64) -> Self {
        let messages = backend.get_conversation_messages(conversation_id).await;
        let conversations = backend.get_conversations().await;
        let profile = backend.get_profile().await;
        Self {
            messages,
            conversations,
            profile,
        }
    }
}

#[derive(Debug)]
pub struct SendOutcome {
    pub local_id: LocalId,
    pub conversation_id: i64,
    pub result: Result<Refresh, BackendError>,
}

impl SendJob {
    pub async fn run(self, backend: &dyn Backend) -> SendOutcome {
        let result = match backend
            .send_chat_message(&self.text, self.image.as_ref(), Some(self.conversation_id))
            .await
        {
            Ok(()) => {
                tracing::debug!(
                    "Send {} delivered to conversation {}",
                    self.local_id,
                    self.conversation_id
                );
                Ok(Refresh::fetch(backend, self.conversation_id).await)
            }
            Err(e) => {
                tracing::warn!("Send {} failed: {}", self.local_id, e);
                Err(e)
            }
        };

        SendOutcome {
            local_id: self.local_id,
            conversation_id: self.conversation_id,
            result,
        }
    }
}

/// A send that has begun and not yet been reconciled.
#[derive(Debug)]
pub struct InFlight {
    pub local_id: LocalId,
    pub conversation_id: i64,
    pub preview: Option<ImagePreview>,
    pub directory_revision: u64,
    pub profile_revision: u64,
}

#[derive(Debug, Default)]
pub enum SendPhase {
    #[default]
    Idle,
    Sending(InFlight),
}

impl SendPhase {
    pub fn is_sending(&self) -> bool {
        matches!(self, SendPhase::Sending(_))
    }
}

pub fn optimistic_label(text: &str, has_image: bool, placeholder: &str) -> String {
    if text.trim().is_empty() && has_image {
        placeholder.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{FakeBackend, Op};

    fn job(backend: &FakeBackend, text: &str) -> SendJob {
        SendJob {
            local_id: LocalId::new(1),
            conversation_id: backend.seed_conversation("Dinner", &[]),
            text: text.to_string(),
            image: None,
        }
    }

    #[test]
    fn test_optimistic_label() {
        assert_eq!(optimistic_label("eggs?", false, "Fridge image"), "eggs?");
        assert_eq!(optimistic_label("", true, "Fridge image"), "Fridge image");
        assert_eq!(optimistic_label("  ", true, "Fridge image"), "Fridge image");
        assert_eq!(optimistic_label("what now", true, "Fridge image"), "what now");
    }

    #[tokio::test]
    async fn test_run_reloads_after_delivery() {
        let backend = FakeBackend::new();
        let job = job(&backend, "What can I make with eggs?");
        let conversation_id = job.conversation_id;

        let outcome = job.run(&backend).await;
        assert_eq!(outcome.conversation_id, conversation_id);
        let refresh = outcome.result.unwrap();
        let messages = refresh.messages.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].reply.recipe().is_some());
        assert_eq!(refresh.conversations.unwrap()[0].message_count, 1);
        assert!(refresh.profile.is_ok());

        assert_eq!(
            backend.calls(),
            vec![Op::SendChat, Op::GetMessages, Op::GetConversations, Op::GetProfile]
        );
    }

    #[tokio::test]
    async fn test_run_skips_reload_when_send_fails() {
        let backend = FakeBackend::new();
        backend.fail(Op::SendChat);
        let outcome = job(&backend, "hello").run(&backend).await;

        assert!(outcome.result.is_err());
        assert_eq!(backend.calls(), vec![Op::SendChat]);
    }

    #[tokio::test]
    async fn test_reload_failures_are_independent() {
        let backend = FakeBackend::new();
        backend.fail(Op::GetConversations);
        let refresh = job(&backend, "hello").run(&backend).await.result.unwrap();

        assert!(refresh.messages.is_ok());
        assert!(refresh.conversations.is_err());
        assert!(refresh.profile.is_ok());
    }
}
