use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::backend::{Backend, BackendError};
use crate::config::ClientConfig;
use crate::models::{
    Conversation, FeedbackRequest, ImageAttachment, ImageRef, Message, MessageId, Profile,
    ProfileRequest,
};
use crate::services::chat::{self, InFlight, Refresh, SendJob, SendOutcome, SendPhase};
use crate::services::timeline::HistorySummary;
use crate::services::{
    ConversationDirectory, ConversationGroup, LocalIdAllocator, PendingRegistry, PreviewStore,
    ProfileDraft, ProfileEditError, ProfileState, Timeline,
};

const HISTORY_PREVIEW_LEN: usize = 5;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to load {what}: {source}")]
    LoadFailed {
        what: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("Failed to create conversation: {0}")]
    CreateConversation(#[source] BackendError),

    #[error("Failed to send message: {0}")]
    SendFailed(#[source] BackendError),

    #[error("Failed to save profile: {0}")]
    SaveProfile(#[source] BackendError),

    #[error("Failed to create profile: {0}")]
    CreateProfile(#[source] BackendError),

    #[error("Failed to submit feedback: {0}")]
    Feedback(#[source] BackendError),

    #[error("Failed to reset demo: {0}")]
    Reset(#[source] BackendError),

    #[error("A message is still being sent")]
    SendInFlight,

    #[error("No profile edit in progress")]
    NoProfileEdit,

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error(transparent)]
    ProfileEdit(#[from] ProfileEditError),
}

impl AppError {
    pub fn notice(&self) -> String {
        match self {
            AppError::LoadFailed { what, .. } => format!("Failed to load {}.", what),
            AppError::CreateConversation(_) => {
                "Failed to create conversation. Please try again.".to_string()
            }
            AppError::SendFailed(_) => "Failed to send message. Please try again.".to_string(),
            AppError::SaveProfile(_) => {
                "Failed to save profile. Your changes are kept, please try again.".to_string()
            }
            AppError::CreateProfile(_) => "Failed to create profile. Please try again.".to_string(),
            AppError::Feedback(_) => "Failed to submit feedback. Please try again.".to_string(),
            AppError::Reset(_) => "Failed to reset demo. Please try again.".to_string(),
            AppError::SendInFlight => "Please wait for the current message to finish.".to_string(),
            AppError::NoProfileEdit => "Open the profile editor first.".to_string(),
            AppError::InvalidInput(msg) => msg.to_string(),
            AppError::ProfileEdit(e) => e.to_string(),
        }
    }
}

pub struct App {
    backend: Arc<dyn Backend>,
    config: ClientConfig,
    ids: LocalIdAllocator,
    pending: PendingRegistry,
    previews: PreviewStore,
    timeline: Timeline,
    directory: ConversationDirectory,
    profile: ProfileState,
    profile_edit: Option<ProfileDraft>,
    phase: SendPhase,
    profile_loaded: bool,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, config: ClientConfig) -> Self {
        Self {
            backend,
            config,
            ids: LocalIdAllocator::new(),
            pending: PendingRegistry::new(),
            previews: PreviewStore::new(),
            timeline: Timeline::new(),
            directory: ConversationDirectory::new(),
            profile: ProfileState::new(),
            profile_edit: None,
            phase: SendPhase::Idle,
            profile_loaded: false,
        }
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    // --- Read side ---

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn conversations(&self) -> &[Conversation] {
        self.directory.list()
    }

    pub fn grouped_conversations<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Vec<ConversationGroup<'_>> {
        self.directory.grouped(now)
    }

    pub fn active_conversation_id(&self) -> Option<i64> {
        self.directory.active()
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.directory.active_conversation()
    }

    pub fn profile(&self) -> &Profile {
        self.profile.current()
    }

    pub fn profile_loaded(&self) -> bool {
        self.profile_loaded
    }

    pub fn needs_setup(&self) -> bool {
        !self.profile.has_profile()
    }

    pub fn is_sending(&self) -> bool {
        self.phase.is_sending()
    }

    pub fn is_pending(&self, id: MessageId) -> bool {
        id.local_id().is_some_and(|local| self.pending.is_pending(local))
    }

    pub fn pending(&self) -> &PendingRegistry {
        &self.pending
    }

    pub fn history_summary(&self) -> HistorySummary {
        self.timeline.history_summary(HISTORY_PREVIEW_LEN)
    }

    /// Something an image view can load: a `data:` URI for previews, an absolute URL for
    /// uploads stored on the server.
    pub fn image_url(&self, image: &ImageRef) -> Option<String> {
        match image {
            ImageRef::Preview(id) => self.previews.data_uri(*id).map(str::to_string),
            ImageRef::Stored(path) => {
                let base = self.config.base_url().ok()?;
                base.join(path.trim_start_matches('/'))
                    .ok()
                    .map(|u| u.to_string())
            }
        }
    }

    // --- Loading and navigation ---

    pub async fn load(&mut self) -> Result<(), AppError> {
        let profile = self.backend.get_profile().await;
        let conversations = self.backend.get_conversations().await;
        self.profile_loaded = true;

        let mut first_error = None;

        match profile {
            Ok(profile) => self.profile.apply_server_update(profile),
            Err(e) => {
                tracing::error!("Failed to load profile: {}", e);
                first_error.get_or_insert(AppError::LoadFailed {
                    what: "profile",
                    source: e,
                });
            }
        }

        match conversations {
            Ok(list) => self.directory.replace(list),
            Err(e) => {
                tracing::error!("Failed to load conversations: {}", e);
                first_error.get_or_insert(AppError::LoadFailed {
                    what: "conversations",
                    source: e,
                });
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    pub async fn new_conversation(&mut self) -> Result<Conversation, AppError> {
        let conversation = self
            .directory
            .create(self.backend.as_ref())
            .await
            .map_err(AppError::CreateConversation)?;
        self.directory.select(Some(conversation.id));
        self.timeline.show(Some(conversation.id), Vec::new());
        Ok(conversation)
    }

    /// Make `id` the active conversation and load its messages; `None` shows an empty chat.
    pub async fn select_conversation(&mut self, id: Option<i64>) -> Result<(), AppError> {
        self.directory.select(id);
        let Some(conversation_id) = id else {
            self.timeline.clear();
            return Ok(());
        };

        match self.backend.get_conversation_messages(conversation_id).await {
            Ok(messages) => {
                self.timeline.show(Some(conversation_id), messages);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    "Failed to load messages for conversation {}: {}",
                    conversation_id,
                    e
                );
                self.timeline.show(Some(conversation_id), Vec::new());
                Err(AppError::LoadFailed {
                    what: "conversation messages",
                    source: e,
                })
            }
        }
    }

    // --- Sending ---

    pub async fn send(
        &mut self,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Result<bool, AppError> {
        let Some(job) = self.begin_send(text, image).await? else {
            return Ok(false);
        };
        let backend = self.backend();
        let outcome = job.run(backend.as_ref()).await;
        self.finish_send(outcome)?;
        Ok(true)
    }

    /// Show the message optimistically and hand back the job that delivers it.
    pub async fn begin_send(
        &mut self,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Result<Option<SendJob>, AppError> {
        if text.trim().is_empty() && image.is_none() {
            return Ok(None);
        }
        if self.phase.is_sending() {
            return Err(AppError::SendInFlight);
        }

        let conversation_id = match self.directory.active() {
            Some(id) => id,
            None => self.new_conversation().await?.id,
        };

        let local_id = self.ids.next_id();
        let preview = image.as_ref().map(|img| self.previews.create(img));
        let preview_id = preview.as_ref().map(|p| p.id());
        let registered = self.pending.begin(local_id, text.to_string(), preview_id);
        debug_assert!(registered, "local ids must not repeat");

        let label = chat::optimistic_label(
            text,
            image.is_some(),
            &self.config.placeholder_image_label,
        );
        self.timeline.insert_optimistic(Message::optimistic(
            local_id,
            label,
            preview_id,
            Utc::now(),
        ));

        tracing::info!(
            "Sending {} to conversation {} (image: {})",
            local_id,
            conversation_id,
            image.is_some()
        );
        self.phase = SendPhase::Sending(InFlight {
            local_id,
            conversation_id,
            preview,
            directory_revision: self.directory.revision(),
            profile_revision: self.profile.revision(),
        });

        Ok(Some(SendJob {
            local_id,
            conversation_id,
            text: text.to_string(),
            image,
        }))
    }

    pub fn finish_send(&mut self, outcome: SendOutcome) -> Result<(), AppError> {
        let in_flight = match std::mem::take(&mut self.phase) {
            SendPhase::Sending(in_flight) if in_flight.local_id == outcome.local_id => in_flight,
            other => {
                tracing::warn!("Ignoring outcome of unknown send {}", outcome.local_id);
                self.phase = other;
                return Ok(());
            }
        };

        let result = match outcome.result {
            Ok(refresh) => {
                self.reconcile(&in_flight, refresh);
                Ok(())
            }
            Err(e) => {
                if self.timeline.remove_optimistic(in_flight.local_id).is_none() {
                    tracing::debug!("Send {} was no longer on screen", in_flight.local_id);
                }
                tracing::warn!("Rolled back send {}", in_flight.local_id);
                Err(AppError::SendFailed(e))
            }
        };

        if let Some(preview) = in_flight.preview {
            self.previews.release(preview);
        }
        self.pending.end(in_flight.local_id);
        result
    }

    fn reconcile(&mut self, in_flight: &InFlight, refresh: Refresh) {
        let conversation_id = in_flight.conversation_id;
        let still_on_screen = self.directory.active() == Some(conversation_id)
            && self.timeline.conversation_id() == Some(conversation_id);

        if still_on_screen {
            match refresh.messages {
                Ok(messages) => self.timeline.replace_with_confirmed(messages),
                Err(e) => tracing::warn!(
                    "Failed to reload messages for conversation {}: {}",
                    conversation_id,
                    e
                ),
            }
        } else {
            tracing::info!(
                "Conversation {} is no longer shown; discarding its refreshed messages",
                conversation_id
            );
        }
        self.timeline.remove_optimistic(in_flight.local_id);

        match refresh.conversations {
            Ok(_) if self.directory.revision() != in_flight.directory_revision => {
                tracing::info!("Conversation list changed during send; keeping the newer list")
            }
            Ok(list) => self.directory.replace(list),
            Err(e) => tracing::warn!("Failed to reload conversations: {}", e),
        }

        match refresh.profile {
            Ok(_) if self.profile.revision() != in_flight.profile_revision => {
                tracing::info!("Profile changed during send; keeping the newer profile")
            }
            Ok(profile) => self.profile.apply_server_update(profile),
            Err(e) => tracing::warn!("Failed to reload profile: {}", e),
        }
    }

    // --- Profile ---

    pub fn begin_profile_edit(&mut self) -> &mut ProfileDraft {
        self.profile_edit.insert(self.profile.begin_edit())
    }

    pub fn profile_draft(&self) -> Option<&ProfileDraft> {
        self.profile_edit.as_ref()
    }

    pub fn profile_draft_mut(&mut self) -> Option<&mut ProfileDraft> {
        self.profile_edit.as_mut()
    }

    pub fn cancel_profile_edit(&mut self) {
        self.profile_edit = None;
    }

    /// Save the open draft. The draft is closed on success and kept for another try on
    /// failure.
    pub async fn commit_profile_edit(&mut self) -> Result<&Profile, AppError> {
        let draft = self.profile_edit.as_ref().ok_or(AppError::NoProfileEdit)?;
        if let Err(e) = self.profile.commit_edit(self.backend.as_ref(), draft).await {
            tracing::error!("Failed to save profile: {}", e);
            return Err(AppError::SaveProfile(e));
        }
        self.profile_edit = None;
        Ok(self.profile.current())
    }

    pub async fn complete_setup(&mut self, request: ProfileRequest) -> Result<(), AppError> {
        if request.ability_description.trim().is_empty() {
            return Err(AppError::InvalidInput("Please describe your cooking ability."));
        }
        self.backend
            .create_profile(&request)
            .await
            .map_err(AppError::CreateProfile)?;
        self.refresh_profile().await
    }

    pub async fn submit_feedback(&mut self, feedback: FeedbackRequest) -> Result<(), AppError> {
        feedback.validate().map_err(AppError::InvalidInput)?;
        self.backend
            .submit_feedback(&feedback)
            .await
            .map_err(AppError::Feedback)?;
        self.refresh_profile().await
    }

    async fn refresh_profile(&mut self) -> Result<(), AppError> {
        let profile = self
            .backend
            .get_profile()
            .await
            .map_err(|e| AppError::LoadFailed {
                what: "profile",
                source: e,
            })?;
        self.profile.apply_server_update(profile);
        Ok(())
    }

    // --- Reset ---

    /// Wipe all server-side data and local state. The profile is reloaded afterwards,
    /// which normally sends the user back to setup.
    pub async fn reset(&mut self) -> Result<(), AppError> {
        if self.phase.is_sending() {
            return Err(AppError::SendInFlight);
        }
        self.backend.reset_demo().await.map_err(AppError::Reset)?;
        tracing::info!("Demo reset");

        self.timeline.clear();
        self.directory.clear();
        self.profile.clear();
        self.profile_edit = None;

        if let Err(e) = self.refresh_profile().await {
            tracing::warn!("Profile reload after reset failed: {}", e);
        }
        Ok(())
    }
}
