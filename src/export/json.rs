//! JSON import/export of card content.
//! Only content travels; scheduling state starts fresh for imported cards.

use crate::models::{Card, CardContent};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the content of `cards` as a pretty JSON array.
pub fn export_cards_to_path(cards: &[Card], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let contents: Vec<&CardContent> = cards.iter().map(|card| &card.content).collect();
    let json_string = serde_json::to_string_pretty(&contents)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Reads a JSON array of card contents. Entries are not validated here;
/// the store checks them when the cards are created.
pub fn import_cards(path: impl AsRef<Path>) -> Result<Vec<CardContent>, ExportError> {
    let file = File::open(path)?;
    let cards: Vec<CardContent> = serde_json::from_reader(BufReader::new(file))?;
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;

    fn create_test_cards() -> Vec<Card> {
        vec![
            Card::new(
                "c1".to_string(),
                CardContent {
                    meaning: Some("둘 다".to_string()),
                    ..CardContent::new("both", "They both like cake after lunch.")
                },
                Utc::now(),
            ),
            Card::new(
                "c2".to_string(),
                CardContent::new("borrow", "Can I borrow your pen today?"),
                Utc::now(),
            ),
        ]
    }

    #[test]
    fn test_export_writes_content_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");

        export_cards_to_path(&create_test_cards(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"word\": \"both\""));
        assert!(written.contains("\"meaning\": \"둘 다\""));
        assert!(!written.contains("streak"));
        assert!(!written.contains("c1"));
    }

    #[test]
    fn test_import_cards() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        fs::write(
            &path,
            r#"[
  { "word": "test word", "sentence": "test sentence", "sentence_translation": "번역" },
  { "word": "other", "sentence": "Other sentence." }
]"#,
        )
        .unwrap();

        let cards = import_cards(&path).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].word, "test word");
        assert_eq!(cards[0].sentence_translation.as_deref(), Some("번역"));
        assert_eq!(cards[1].meaning, None);
    }

    #[test]
    fn test_export_then_import_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");
        let original = create_test_cards();

        export_cards_to_path(&original, &path).unwrap();
        let imported = import_cards(&path).unwrap();

        let expected: Vec<CardContent> = original.into_iter().map(|c| c.content).collect();
        assert_eq!(imported, expected);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_cards("nonexistent_file_xyz123.json");
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_cards(&path), Err(ExportError::Json(_))));
    }
}
