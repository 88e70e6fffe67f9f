//! Card is a target word with one example sentence plus its scheduling state.
use super::ReviewResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Learner-facing content. Optional aids are opaque to scheduling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    pub word: String,
    pub sentence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_pronunciation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardInputError {
    #[error("word is required")]
    MissingWord,
    #[error("sentence is required")]
    MissingSentence,
}

impl CardContent {
    pub fn new(word: &str, sentence: &str) -> Self {
        Self {
            word: word.to_string(),
            sentence: sentence.to_string(),
            ..Default::default()
        }
    }

    /// Trims every field and turns blank optional fields into `None`.
    /// Word and sentence must be non-empty after trimming.
    pub fn normalized(self) -> Result<Self, CardInputError> {
        let word = self.word.trim().to_string();
        if word.is_empty() {
            return Err(CardInputError::MissingWord);
        }
        let sentence = self.sentence.trim().to_string();
        if sentence.is_empty() {
            return Err(CardInputError::MissingSentence);
        }

        Ok(Self {
            word,
            sentence,
            meaning: non_blank(self.meaning),
            word_pronunciation: non_blank(self.word_pronunciation),
            sentence_translation: non_blank(self.sentence_translation),
            sentence_pronunciation: non_blank(self.sentence_pronunciation),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: String,
    #[serde(flatten)]
    pub content: CardContent,
    pub streak: u32,
    pub next_due_at: DateTime<Utc>,
    pub last_result: Option<ReviewResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// A freshly authored card: due immediately, never reviewed.
    pub fn new(id: String, content: CardContent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            content,
            streak: 0,
            next_due_at: now,
            last_result: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_due_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_creation_defaults() {
        let now = Utc::now();
        let card = Card::new(
            "c1".to_string(),
            CardContent::new("borrow", "Can I borrow your pen today?"),
            now,
        );

        assert_eq!(card.streak, 0);
        assert_eq!(card.next_due_at, now);
        assert_eq!(card.last_result, None);
        assert_eq!(card.created_at, card.updated_at);
        assert!(card.is_due(now));
    }

    #[test]
    fn test_normalized_trims_and_drops_blank_fields() {
        let content = CardContent {
            word: "  both ".to_string(),
            sentence: " They both like cake after lunch. ".to_string(),
            meaning: Some(" 둘 다 ".to_string()),
            word_pronunciation: Some("   ".to_string()),
            sentence_translation: None,
            sentence_pronunciation: Some(String::new()),
        }
        .normalized()
        .unwrap();

        assert_eq!(content.word, "both");
        assert_eq!(content.sentence, "They both like cake after lunch.");
        assert_eq!(content.meaning.as_deref(), Some("둘 다"));
        assert_eq!(content.word_pronunciation, None);
        assert_eq!(content.sentence_pronunciation, None);
    }

    #[test]
    fn test_normalized_requires_word_and_sentence() {
        assert_eq!(
            CardContent::new(" ", "sentence").normalized(),
            Err(CardInputError::MissingWord)
        );
        assert_eq!(
            CardContent::new("word", "").normalized(),
            Err(CardInputError::MissingSentence)
        );
    }
}
