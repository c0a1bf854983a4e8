use serde::{Deserialize, Serialize};

/// Difficulty level of a quest card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Normal => write!(f, "Normal"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// Life area a quest card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Stuff,
    Family,
    Health,
    Learning,
    Leisure,
    Work,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Stuff => write!(f, "Stuff"),
            Category::Family => write!(f, "Family"),
            Category::Health => write!(f, "Health"),
            Category::Learning => write!(f, "Learning"),
            Category::Leisure => write!(f, "Leisure"),
            Category::Work => write!(f, "Work"),
        }
    }
}

/// One-off task or ongoing challenge.
/// The wire field is named "type"; `kind` avoids the Rust keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    Task,
    Challenge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardStatus {
    Incomplete,
    Complete,
}

/// A quest card as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub category: Category,
    /// Due date as "YYYY-MM-DD"
    pub date: String,
    /// Due time as "HH:MM"
    pub time: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
    pub status: CardStatus,
}

impl Card {
    pub fn is_complete(&self) -> bool {
        self.status == CardStatus::Complete
    }

    pub fn is_challenge(&self) -> bool {
        self.kind == CardKind::Challenge
    }

    /// Due date parsed, if the backend sent a well-formed one.
    pub fn due_date(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Compact "2026-08-29, 14:30" label for list views.
    pub fn due_display(&self) -> String {
        format!("{}, {}", self.date, self.time)
    }
}

/// Payload for `POST /card`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCard {
    pub title: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
}

/// Payload for `PATCH /card/{id}`. Status and kind are not editable in place;
/// completion goes through its own endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EditCard {
    pub title: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub date: String,
    pub time: String,
}

/// Response wrapper for `GET /card`.
#[derive(Debug, Clone, Deserialize)]
pub struct CardsResponse {
    #[serde(default)]
    pub cards: Vec<Card>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_card() {
        let json = r#"{
            "_id": "64f1c0ffee64f1c0ffee64f1",
            "title": "Submit report",
            "difficulty": "Hard",
            "category": "Work",
            "date": "2026-08-29",
            "time": "14:30",
            "type": "Task",
            "status": "Incomplete"
        }"#;

        let card: Card = serde_json::from_str(json).expect("card should parse");
        assert_eq!(card.id, "64f1c0ffee64f1c0ffee64f1");
        assert_eq!(card.difficulty, Difficulty::Hard);
        assert_eq!(card.category, Category::Work);
        assert_eq!(card.kind, CardKind::Task);
        assert!(!card.is_complete());
        assert!(!card.is_challenge());
        assert_eq!(card.due_display(), "2026-08-29, 14:30");
        assert_eq!(
            card.due_date(),
            chrono::NaiveDate::from_ymd_opt(2026, 8, 29)
        );
    }

    #[test]
    fn test_parse_cards_response() {
        let json = r#"{"cards": [
            {"_id": "a", "title": "Daily coding", "difficulty": "Normal",
             "category": "Learning", "date": "2026-09-01", "time": "08:00",
             "type": "Challenge", "status": "Complete"}
        ]}"#;

        let resp: CardsResponse = serde_json::from_str(json).expect("response should parse");
        assert_eq!(resp.cards.len(), 1);
        assert!(resp.cards[0].is_challenge());
        assert!(resp.cards[0].is_complete());
    }

    #[test]
    fn test_new_card_serializes_type_field() {
        let card = NewCard {
            title: "Clean the garage".to_string(),
            difficulty: Difficulty::Normal,
            category: Category::Stuff,
            date: "2026-09-02".to_string(),
            time: "10:00".to_string(),
            kind: CardKind::Task,
        };

        let value = serde_json::to_value(&card).expect("serialize");
        assert_eq!(value["type"], "Task");
        assert_eq!(value["difficulty"], "Normal");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_invalid_date_yields_none() {
        let json = r#"{"_id": "x", "title": "t", "difficulty": "Easy",
            "category": "Health", "date": "someday", "time": "09:00",
            "type": "Task", "status": "Incomplete"}"#;
        let card: Card = serde_json::from_str(json).expect("card should parse");
        assert!(card.due_date().is_none());
    }
}
