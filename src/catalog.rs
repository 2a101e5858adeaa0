//! Reference data: lessons and collectible cards

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::unlocks::ConditionSpec;

fn default_true() -> bool {
    true
}

fn default_base_xp() -> u32 {
    10
}

/// A lesson as seen by the progression engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    pub chapter_id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_base_xp")]
    pub base_xp: u32,
    /// Inactive lessons do not count toward chapter completion
    #[serde(default = "default_true")]
    pub active: bool,
}

/// A collectible reward with its unlock condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Chapter the card belongs to; target of a `chapter_complete`
    /// condition that names no chapter itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<Uuid>,
    pub condition: ConditionSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Catalog {
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn lesson(&self, id: Uuid) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn card(&self, id: Uuid) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unlocks::UnlockCondition;

    #[test]
    fn test_parse_catalog() {
        let json = r#"{
            "lessons": [
                {"id": "6f1c1f4e-1d2b-4c55-9d7e-2b3f0a9e1a01",
                 "chapterId": "0b7e6c7a-55c3-4c0f-8a57-1e0f6f1d2c11",
                 "title": "Greetings"}
            ],
            "cards": [
                {"id": "a3b0a6f2-7c7c-4f0f-9e55-0c3a4d2b1f22",
                 "name": "Dedicated",
                 "condition": {"type": "streak", "days": 30}},
                {"id": "c1d2e3f4-0000-4000-8000-000000000001",
                 "name": "Mystery",
                 "condition": {"type": "moon_phase"}}
            ]
        }"#;

        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.lessons[0].base_xp, 10);
        assert!(catalog.lessons[0].active);
        assert_eq!(
            catalog.cards[0].condition,
            ConditionSpec::Known(UnlockCondition::Streak { days: 30 })
        );
        assert!(matches!(
            catalog.cards[1].condition,
            ConditionSpec::Unrecognized { .. }
        ));
        assert!(catalog.lesson(catalog.lessons[0].id).is_some());
        assert!(catalog.card(Uuid::nil()).is_none());
    }
}
