//! In-memory backend used by the state machine tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::traits::Backend;
use super::types::BackendError;
use crate::models::{
    AssistantReply, Conversation, FeedbackRequest, ImageAttachment, ImageRef, Message, MessageId,
    Profile, ProfileRequest, Recipe,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetProfile,
    CreateProfile,
    UpdateProfile,
    GetConversations,
    CreateConversation,
    GetMessages,
    SendChat,
    SubmitFeedback,
    ResetDemo,
}

#[derive(Default)]
struct FakeState {
    profile: Profile,
    conversations: Vec<Conversation>,
    messages: HashMap<i64, Vec<Message>>,
    next_conversation_id: i64,
    next_message_id: i64,
    failing: HashSet<Op>,
    calls: Vec<Op>,
    reply: Option<AssistantReply>,
    profile_after_send: Option<Profile>,
}

pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_conversation_id: 1,
                next_message_id: 100,
                ..Default::default()
            }),
        }
    }

    pub fn with_profile(profile: Profile) -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().profile = profile;
        backend
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.state.lock().unwrap().failing.remove(&op);
    }

    /// Reply stored with the next confirmed messages. Defaults to a recipe.
    pub fn set_reply(&self, reply: AssistantReply) {
        self.state.lock().unwrap().reply = Some(reply);
    }

    /// Profile the server "extracts" after the next successful send.
    pub fn set_profile_after_send(&self, profile: Profile) {
        self.state.lock().unwrap().profile_after_send = Some(profile);
    }

    pub fn calls(&self) -> Vec<Op> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: Op) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| **c == op).count()
    }

    pub fn server_profile(&self) -> Profile {
        self.state.lock().unwrap().profile.clone()
    }

    pub fn seed_conversation(&self, title: &str, texts: &[&str]) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_conversation_id;
        state.next_conversation_id += 1;
        let now = Utc::now();
        state.conversations.insert(
            0,
            Conversation {
                id,
                title: title.to_string(),
                created_at: Some(now),
                updated_at: Some(now),
                message_count: texts.len() as u32,
            },
        );
        for text in texts {
            let msg = confirmed(&mut state, text, false, AssistantReply::Empty);
            state.messages.entry(id).or_default().push(msg);
        }
        id
    }

    fn enter(&self, op: Op) -> Result<std::sync::MutexGuard<'_, FakeState>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        if state.failing.contains(&op) {
            return Err(BackendError::Server {
                status: 500,
                detail: format!("{:?} failed", op),
            });
        }
        Ok(state)
    }
}

fn confirmed(state: &mut FakeState, text: &str, has_image: bool, reply: AssistantReply) -> Message {
    let id = state.next_message_id;
    state.next_message_id += 1;
    Message {
        id: MessageId::Confirmed(id),
        text: text.to_string(),
        has_image,
        image: has_image.then(|| ImageRef::Stored(format!("uploads/{}.jpg", id))),
        reply,
        created_at: Utc::now(),
    }
}

fn default_reply() -> AssistantReply {
    AssistantReply::Recipe(Recipe {
        name: "Spinach omelette".to_string(),
        ingredients: vec!["2 eggs".to_string(), "a handful of spinach".to_string()],
        steps: vec!["Whisk the eggs".to_string(), "Cook with spinach".to_string()],
    })
}

#[async_trait]
impl Backend for FakeBackend {
    async fn get_profile(&self) -> Result<Profile, BackendError> {
        let state = self.enter(Op::GetProfile)?;
        Ok(state.profile.clone())
    }

    async fn create_profile(&self, request: &ProfileRequest) -> Result<(), BackendError> {
        let mut state = self.enter(Op::CreateProfile)?;
        state.profile = Profile {
            situation: vec![request.ability_description.clone()],
            restrictions: Some(request.restrictions_description.clone())
                .filter(|s| !s.is_empty())
                .into_iter()
                .collect(),
            preferences: Some(request.goal_description.clone())
                .filter(|s| !s.is_empty())
                .into_iter()
                .collect(),
            ..Default::default()
        };
        Ok(())
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile, BackendError> {
        let mut state = self.enter(Op::UpdateProfile)?;
        // The server drops blank entries left by the edit form.
        let mut canonical = profile.clone();
        for field in crate::models::ProfileField::ALL {
            canonical.items_mut(field).retain(|s| !s.trim().is_empty());
        }
        state.profile = canonical.clone();
        Ok(canonical)
    }

    async fn get_conversations(&self) -> Result<Vec<Conversation>, BackendError> {
        let state = self.enter(Op::GetConversations)?;
        Ok(state.conversations.clone())
    }

    async fn create_conversation(&self) -> Result<Conversation, BackendError> {
        let mut state = self.enter(Op::CreateConversation)?;
        let id = state.next_conversation_id;
        state.next_conversation_id += 1;
        let conv = Conversation {
            id,
            title: "New Chat".to_string(),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
            message_count: 0,
        };
        state.conversations.insert(0, conv.clone());
        Ok(Conversation {
            created_at: None,
            updated_at: None,
            ..conv
        })
    }

    async fn get_conversation_messages(
        &self,
        conversation_id: i64,
    ) -> Result<Vec<Message>, BackendError> {
        let state = self.enter(Op::GetMessages)?;
        if !state.conversations.iter().any(|c| c.id == conversation_id) {
            return Err(BackendError::Server {
                status: 404,
                detail: "Conversation not found".to_string(),
            });
        }
        Ok(state.messages.get(&conversation_id).cloned().unwrap_or_default())
    }

    async fn send_chat_message(
        &self,
        text: &str,
        image: Option<&ImageAttachment>,
        conversation_id: Option<i64>,
    ) -> Result<(), BackendError> {
        let mut state = self.enter(Op::SendChat)?;
        let conversation_id = conversation_id.ok_or_else(|| BackendError::Server {
            status: 400,
            detail: "conversation_id required by the fake".to_string(),
        })?;
        let reply = state.reply.clone().unwrap_or_else(default_reply);
        let msg = confirmed(&mut state, text, image.is_some(), reply);
        state.messages.entry(conversation_id).or_default().push(msg);

        let now = Utc::now();
        if let Some(pos) = state.conversations.iter().position(|c| c.id == conversation_id) {
            let mut conv = state.conversations.remove(pos);
            if conv.title == "New Chat" {
                conv.title = text.chars().take(30).collect();
            }
            conv.message_count += 1;
            conv.updated_at = Some(now);
            state.conversations.insert(0, conv);
        }

        if let Some(profile) = state.profile_after_send.take() {
            state.profile = profile;
        }
        Ok(())
    }

    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<(), BackendError> {
        let mut state = self.enter(Op::SubmitFeedback)?;
        if feedback.rating <= 3 {
            let note = format!("disliked {}", feedback.recipe.name);
            state.profile.preferences.push(note);
        }
        Ok(())
    }

    async fn reset_demo(&self) -> Result<(), BackendError> {
        let mut state = self.enter(Op::ResetDemo)?;
        state.profile = Profile::default();
        state.conversations.clear();
        state.messages.clear();
        Ok(())
    }
}
