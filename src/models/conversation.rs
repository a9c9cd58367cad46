use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    /// Missing on conversations the server has just created.
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub message_count: u32,
}

impl Conversation {
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            format!("Chat {}", self.id)
        } else {
            self.title.clone()
        }
    }

    pub fn message_count_label(&self) -> Option<String> {
        match self.message_count {
            0 => None,
            1 => Some("1 message".to_string()),
            n => Some(format!("{} messages", n)),
        }
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}
