use serde::{Deserialize, Serialize};

use super::reply::Recipe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MadeStatus {
    Made,
    NotMade,
    Planned,
}

impl MadeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MadeStatus::Made => "made",
            MadeStatus::NotMade => "not_made",
            MadeStatus::Planned => "planned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "made" => Some(MadeStatus::Made),
            "not_made" => Some(MadeStatus::NotMade),
            "planned" => Some(MadeStatus::Planned),
            _ => None,
        }
    }
}

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub made_status: MadeStatus,
    pub rating: u8,
    pub comments: String,
    pub recipe: Recipe,
}

impl FeedbackRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err("Rating must be between 1 and 10");
        }
        Ok(())
    }
}
