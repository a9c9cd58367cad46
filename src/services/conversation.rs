use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};

use crate::backend::{Backend, BackendError};
use crate::models::Conversation;

/// Conversation list, most recent activity first, plus the one on screen.
#[derive(Debug, Default)]
pub struct ConversationDirectory {
    conversations: Vec<Conversation>,
    active: Option<i64>,
    revision: u64,
}

impl ConversationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active(&self) -> Option<i64> {
        self.active
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active?;
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Bumped whenever the list changes. Selection does not count.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub async fn create(&mut self, backend: &dyn Backend) -> Result<Conversation, BackendError> {
        let conversation = backend.create_conversation().await?;
        tracing::info!("Created conversation {}", conversation.id);
        self.conversations.retain(|c| c.id != conversation.id);
        self.conversations.insert(0, conversation.clone());
        self.revision += 1;
        Ok(conversation)
    }

    /// Replace the list with a fresh copy from the server. The active id is kept.
    pub fn replace(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
        self.revision += 1;
    }

    pub fn select(&mut self, id: Option<i64>) {
        self.active = id;
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
        self.active = None;
        self.revision += 1;
    }

    pub fn grouped<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<ConversationGroup<'_>> {
        group_by_day(&self.conversations, now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBucket {
    Today,
    Yesterday,
    /// Two to six days ago.
    Weekday(Weekday),
    Date(NaiveDate),
}

impl fmt::Display for DayBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayBucket::Today => f.write_str("Today"),
            DayBucket::Yesterday => f.write_str("Yesterday"),
            DayBucket::Weekday(day) => f.write_str(weekday_name(*day)),
            DayBucket::Date(date) => write!(f, "{}", date.format("%B %-d")),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Classify `at` against the calendar day of `now`, in `now`'s time zone.
/// Timestamps ahead of `now` count as today.
pub fn day_bucket<Tz: TimeZone>(at: DateTime<Utc>, now: &DateTime<Tz>) -> DayBucket {
    let today = now.date_naive();
    let day = at.with_timezone(&now.timezone()).date_naive();

    match today.signed_duration_since(day).num_days() {
        i64::MIN..=0 => DayBucket::Today,
        1 => DayBucket::Yesterday,
        2..=6 => DayBucket::Weekday(day.weekday()),
        _ => DayBucket::Date(day),
    }
}

#[derive(Debug)]
pub struct ConversationGroup<'a> {
    pub bucket: DayBucket,
    pub conversations: Vec<&'a Conversation>,
}

/// Buckets keep the order they are first seen in, except that `Today` and `Yesterday`
/// always come first.
pub fn group_by_day<'a, Tz: TimeZone>(
    conversations: &'a [Conversation],
    now: &DateTime<Tz>,
) -> Vec<ConversationGroup<'a>> {
    let mut groups: Vec<ConversationGroup<'a>> = Vec::new();

    for conv in conversations {
        // A conversation the server just created has no timestamps yet.
        let at = conv
            .last_activity()
            .unwrap_or_else(|| now.with_timezone(&Utc));
        let bucket = day_bucket(at, now);

        match groups.iter_mut().find(|g| g.bucket == bucket) {
            Some(group) => group.conversations.push(conv),
            None => groups.push(ConversationGroup {
                bucket,
                conversations: vec![conv],
            }),
        }
    }

    groups.sort_by_key(|g| match g.bucket {
        DayBucket::Today => 0,
        DayBucket::Yesterday => 1,
        _ => 2,
    });
    groups
}
