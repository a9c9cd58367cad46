use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Instructions,
    Preferences,
    Restrictions,
    Situation,
}

impl ProfileField {
    pub const ALL: [ProfileField; 4] = [
        ProfileField::Instructions,
        ProfileField::Preferences,
        ProfileField::Restrictions,
        ProfileField::Situation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Instructions => "instructions",
            ProfileField::Preferences => "preferences",
            ProfileField::Restrictions => "restrictions",
            ProfileField::Situation => "situation",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProfileField::Instructions => "Instructions",
            ProfileField::Preferences => "Preferences",
            ProfileField::Restrictions => "Restrictions",
            ProfileField::Situation => "Situation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "instructions" => Some(ProfileField::Instructions),
            "preferences" => Some(ProfileField::Preferences),
            "restrictions" => Some(ProfileField::Restrictions),
            "situation" => Some(ProfileField::Situation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "long_term_instructions", default)]
    pub instructions: Vec<String>,
    #[serde(rename = "long_term_preferences", default)]
    pub preferences: Vec<String>,
    #[serde(rename = "long_term_restrictions", default)]
    pub restrictions: Vec<String>,
    #[serde(rename = "long_term_situation", default)]
    pub situation: Vec<String>,
}

impl Profile {
    pub fn items(&self, field: ProfileField) -> &[String] {
        match field {
            ProfileField::Instructions => &self.instructions,
            ProfileField::Preferences => &self.preferences,
            ProfileField::Restrictions => &self.restrictions,
            ProfileField::Situation => &self.situation,
        }
    }

    pub fn items_mut(&mut self, field: ProfileField) -> &mut Vec<String> {
        match field {
            ProfileField::Instructions => &mut self.instructions,
            ProfileField::Preferences => &mut self.preferences,
            ProfileField::Restrictions => &mut self.restrictions,
            ProfileField::Situation => &mut self.situation,
        }
    }

    pub fn has_data(&self) -> bool {
        ProfileField::ALL.iter().any(|f| !self.items(*f).is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub ability_description: String,
    pub restrictions_description: String,
    pub goal_description: String,
}
