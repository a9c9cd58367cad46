use std::fmt;

use chrono::{DateTime, Utc};

use super::attachment::PreviewId;
use super::reply::AssistantReply;

/// Session-local handle for a message the server has not confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(u64);

impl LocalId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    Confirmed(i64),
    Optimistic(LocalId),
}

impl MessageId {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MessageId::Confirmed(_))
    }

    pub fn local_id(&self) -> Option<LocalId> {
        match self {
            MessageId::Optimistic(id) => Some(*id),
            MessageId::Confirmed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Path of the upload on the server, relative to the API base URL.
    Stored(String),
    /// Temporary preview owned by the client while the send is in flight.
    Preview(PreviewId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub has_image: bool,
    pub image: Option<ImageRef>,
    pub reply: AssistantReply,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build the placeholder shown while a send is in flight. The reply is always empty.
    pub fn optimistic(
        local_id: LocalId,
        text: String,
        preview: Option<PreviewId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::Optimistic(local_id),
            text,
            has_image: preview.is_some(),
            image: preview.map(ImageRef::Preview),
            reply: AssistantReply::Empty,
            created_at,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.id.is_confirmed()
    }
}
