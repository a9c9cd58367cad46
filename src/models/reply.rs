use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::profile::ProfileField;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInfo {
    #[serde(default)]
    pub new_instructions: Vec<String>,
    #[serde(default)]
    pub new_preferences: Vec<String>,
    #[serde(default)]
    pub new_restrictions: Vec<String>,
    #[serde(default)]
    pub new_situation: Vec<String>,
}

impl ParsedInfo {
    pub fn items(&self, field: ProfileField) -> &[String] {
        match field {
            ProfileField::Instructions => &self.new_instructions,
            ProfileField::Preferences => &self.new_preferences,
            ProfileField::Restrictions => &self.new_restrictions,
            ProfileField::Situation => &self.new_situation,
        }
    }

    pub fn is_empty(&self) -> bool {
        ProfileField::ALL.iter().all(|f| self.items(*f).is_empty())
    }
}

/// The subset of extracted facts the server promoted into the long-term profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermDelta {
    #[serde(default)]
    pub new_long_term_instructions: Vec<String>,
    #[serde(default)]
    pub new_long_term_preferences: Vec<String>,
    #[serde(default)]
    pub new_long_term_restrictions: Vec<String>,
    #[serde(default)]
    pub new_long_term_situation: Vec<String>,
}

impl LongTermDelta {
    pub fn items(&self, field: ProfileField) -> &[String] {
        match field {
            ProfileField::Instructions => &self.new_long_term_instructions,
            ProfileField::Preferences => &self.new_long_term_preferences,
            ProfileField::Restrictions => &self.new_long_term_restrictions,
            ProfileField::Situation => &self.new_long_term_situation,
        }
    }

    pub fn is_empty(&self) -> bool {
        ProfileField::ALL.iter().all(|f| self.items(*f).is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AssistantReply {
    #[default]
    Empty,
    Recipe(Recipe),
    ProfileUpdate {
        parsed: ParsedInfo,
        long_term: LongTermDelta,
    },
    /// A payload this client does not know how to present; kept verbatim.
    Unrecognized(Value),
}

impl AssistantReply {
    pub fn from_json(value: Value) -> Self {
        match &value {
            Value::Null => return AssistantReply::Empty,
            Value::Object(map) if map.is_empty() => return AssistantReply::Empty,
            _ => {}
        }

        if let Some(recipe) = value.get("recipe") {
            if let Ok(recipe) = serde_json::from_value::<Recipe>(recipe.clone()) {
                return AssistantReply::Recipe(recipe);
            }
        }

        if let Some(parsed) = value.get("parsed_info") {
            if let Ok(parsed) = serde_json::from_value::<ParsedInfo>(parsed.clone()) {
                let long_term = value
                    .get("long_term_updates")
                    .and_then(|v| serde_json::from_value::<LongTermDelta>(v.clone()).ok())
                    .unwrap_or_default();
                return AssistantReply::ProfileUpdate { parsed, long_term };
            }
        }

        tracing::debug!("Unrecognized assistant reply shape");
        AssistantReply::Unrecognized(value)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AssistantReply::Empty)
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        match self {
            AssistantReply::Recipe(recipe) => Some(recipe),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_reply() {
        assert_eq!(AssistantReply::from_json(json!({})), AssistantReply::Empty);
        assert_eq!(AssistantReply::from_json(Value::Null), AssistantReply::Empty);
    }

    #[test]
    fn test_recipe_reply() {
        let reply = AssistantReply::from_json(json!({
            "recipe": {
                "name": "Spinach omelette",
                "ingredients": ["2 eggs", "spinach"],
                "steps": ["Whisk", "Cook"]
            }
        }));
        let recipe = reply.recipe().unwrap();
        assert_eq!(recipe.name, "Spinach omelette");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.steps, vec!["Whisk", "Cook"]);
    }

    #[test]
    fn test_recipe_without_name() {
        let reply = AssistantReply::from_json(json!({
            "recipe": { "ingredients": ["rice"], "steps": ["Boil"] }
        }));
        assert_eq!(reply.recipe().unwrap().name, "");
    }

    #[test]
    fn test_profile_update_reply() {
        let reply = AssistantReply::from_json(json!({
            "parsed_info": {
                "new_instructions": [],
                "new_preferences": ["likes spicy food"],
                "new_restrictions": [],
                "new_situation": []
            },
            "long_term_updates": {}
        }));
        match reply {
            AssistantReply::ProfileUpdate { parsed, long_term } => {
                assert_eq!(parsed.items(ProfileField::Preferences), ["likes spicy food"]);
                assert!(!parsed.is_empty());
                assert!(long_term.is_empty());
            }
            other => panic!("Expected ProfileUpdate, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_shape_is_kept() {
        let value = json!({ "something": "else" });
        assert_eq!(
            AssistantReply::from_json(value.clone()),
            AssistantReply::Unrecognized(value)
        );
    }
}
