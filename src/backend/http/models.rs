use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::backend::types::BackendError;
use crate::models::{AssistantReply, Conversation, ImageRef, Message, MessageId, Profile};

// --- Response types ---

#[derive(Debug, Deserialize)]
pub struct ConversationRecord {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub message_count: u32,
}

impl From<ConversationRecord> for Conversation {
    fn from(record: ConversationRecord) -> Self {
        Conversation {
            id: record.id,
            title: record.title.unwrap_or_default(),
            created_at: record.created_at.as_deref().and_then(parse_timestamp),
            updated_at: record.updated_at.as_deref().and_then(parse_timestamp),
            message_count: record.message_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub message: String,
    #[serde(default)]
    pub response: Value,
    #[serde(default)]
    pub has_image: bool,
    #[serde(default)]
    pub image_path: Option<String>,
    pub created_at: String,
}

impl TryFrom<MessageRecord> for Message {
    type Error = BackendError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(&record.created_at).ok_or_else(|| {
            BackendError::InvalidResponse(format!(
                "Message {} has an unreadable timestamp: {}",
                record.id, record.created_at
            ))
        })?;

        Ok(Message {
            id: MessageId::Confirmed(record.id),
            text: record.message,
            has_image: record.has_image,
            image: record
                .image_path
                .filter(|p| !p.is_empty())
                .map(ImageRef::Stored),
            reply: AssistantReply::from_json(record.response),
            created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileEnvelope {
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub detail: Value,
}

/// Accepts RFC 3339 as well as SQLite's `CURRENT_TIMESTAMP` format, which is UTC
/// without an offset.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
