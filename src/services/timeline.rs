use crate::models::{LocalId, Message, MessageId};

/// Messages of the conversation on screen: the server's confirmed list, followed by
/// whatever is still in flight.
#[derive(Debug, Default)]
pub struct Timeline {
    conversation_id: Option<i64>,
    confirmed: Vec<Message>,
    optimistic: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub text: String,
    pub recipe_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    pub total: usize,
    pub items: Vec<HistoryItem>,
}

impl HistorySummary {
    pub fn remaining(&self) -> usize {
        self.total - self.items.len()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation_id
    }

    /// Switch to another conversation. Drops everything, including in-flight entries.
    pub fn show(&mut self, conversation_id: Option<i64>, messages: Vec<Message>) {
        self.conversation_id = conversation_id;
        self.optimistic.clear();
        self.confirmed.clear();
        self.replace_with_confirmed(messages);
    }

    pub fn clear(&mut self) {
        self.show(None, Vec::new());
    }

    pub fn current_view(&self) -> impl Iterator<Item = &Message> {
        self.confirmed.iter().chain(self.optimistic.iter())
    }

    pub fn len(&self) -> usize {
        self.confirmed.len() + self.optimistic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.current_view().any(|m| m.id == id)
    }

    pub fn insert_optimistic(&mut self, message: Message) {
        debug_assert!(!message.is_confirmed());
        if !self.optimistic.is_empty() {
            tracing::warn!(
                "Inserting a second in-flight message ({} already shown)",
                self.optimistic.len()
            );
        }
        self.optimistic.push(message);
    }

    /// Replace the confirmed part wholesale. In-flight entries are left in place.
    pub fn replace_with_confirmed(&mut self, mut messages: Vec<Message>) {
        messages.retain(Message::is_confirmed);
        self.confirmed = messages;
    }

    pub fn remove_optimistic(&mut self, local_id: LocalId) -> Option<Message> {
        let pos = self
            .optimistic
            .iter()
            .position(|m| m.id == MessageId::Optimistic(local_id))?;
        Some(self.optimistic.remove(pos))
    }

    pub fn history_summary(&self, limit: usize) -> HistorySummary {
        HistorySummary {
            total: self.confirmed.len(),
            items: self
                .confirmed
                .iter()
                .take(limit)
                .map(|m| HistoryItem {
                    text: m.text.clone(),
                    recipe_name: m.reply.recipe().map(|r| r.name.clone()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{AssistantReply, Recipe};

    fn confirmed(id: i64, text: &str) -> Message {
        Message {
            id: MessageId::Confirmed(id),
            text: text.to_string(),
            has_image: false,
            image: None,
            reply: AssistantReply::Empty,
            created_at: Utc::now(),
        }
    }

    fn optimistic(id: u64, text: &str) -> Message {
        Message::optimistic(LocalId::new(id), text.to_string(), None, Utc::now())
    }

    fn texts(timeline: &Timeline) -> Vec<&str> {
        timeline.current_view().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn test_optimistic_trails_confirmed() {
        let mut timeline = Timeline::new();
        timeline.show(Some(1), vec![confirmed(10, "a"), confirmed(11, "b")]);
        timeline.insert_optimistic(optimistic(1, "c"));
        assert_eq!(texts(&timeline), vec!["a", "b", "c"]);
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn test_replace_keeps_in_flight_entry_last() {
        let mut timeline = Timeline::new();
        timeline.show(Some(1), vec![confirmed(10, "a")]);
        timeline.insert_optimistic(optimistic(1, "pending"));
        timeline.replace_with_confirmed(vec![confirmed(10, "a"), confirmed(12, "b")]);
        assert_eq!(texts(&timeline), vec!["a", "b", "pending"]);
    }

    #[test]
    fn test_replace_ignores_unconfirmed_input() {
        let mut timeline = Timeline::new();
        timeline.replace_with_confirmed(vec![confirmed(1, "a"), optimistic(9, "stray")]);
        assert_eq!(texts(&timeline), vec!["a"]);
    }

    #[test]
    fn test_remove_optimistic_removes_exactly_one() {
        let mut timeline = Timeline::new();
        timeline.show(Some(1), vec![confirmed(10, "a")]);
        timeline.insert_optimistic(optimistic(3, "pending"));

        let removed = timeline.remove_optimistic(LocalId::new(3)).unwrap();
        assert_eq!(removed.text, "pending");
        assert_eq!(texts(&timeline), vec!["a"]);
        assert!(timeline.remove_optimistic(LocalId::new(3)).is_none());
    }

    #[test]
    fn test_show_drops_in_flight_entries() {
        let mut timeline = Timeline::new();
        timeline.show(Some(1), vec![]);
        timeline.insert_optimistic(optimistic(1, "pending"));
        timeline.show(Some(2), vec![confirmed(20, "other")]);
        assert_eq!(timeline.conversation_id(), Some(2));
        assert!(!timeline.contains(MessageId::Optimistic(LocalId::new(1))));

        timeline.clear();
        assert!(timeline.is_empty());
        assert_eq!(timeline.conversation_id(), None);
    }

    #[test]
    fn test_history_summary() {
        let mut timeline = Timeline::new();
        let mut with_recipe = confirmed(2, "eggs?");
        with_recipe.reply = AssistantReply::Recipe(Recipe {
            name: "Frittata".to_string(),
            ..Default::default()
        });
        timeline.show(
            Some(1),
            vec![confirmed(1, "hi"), with_recipe, confirmed(3, "thanks")],
        );
        timeline.insert_optimistic(optimistic(1, "not counted"));

        let summary = timeline.history_summary(2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.remaining(), 1);
        assert_eq!(summary.items[1].recipe_name.as_deref(), Some("Frittata"));
        assert_eq!(summary.items[0].recipe_name, None);
    }
}
