//! Command handlers for the `vocab` binary.
//! Each handler opens nothing itself; it works against the store it is given.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::Path;
use vocab_review::config;
use vocab_review::export::{export_cards_to_path, import_cards};
use vocab_review::models::{Card, CardContent, DailySummary, ReviewResult};
use vocab_review::study::{
    QueueRequest, ReviewRecorder, StudyMode, StudyQueueBuilder, StudySession, recent_summaries,
};
use vocab_review::{CardStore, SqliteStore};

#[derive(Serialize)]
struct ReviewOutcome<'a> {
    card_id: &'a str,
    result: ReviewResult,
    streak: u32,
    next_due_at: DateTime<Utc>,
}

pub struct App {
    store: SqliteStore,
    json: bool,
}

/// Formats a timestamp in local time as YYYY-MM-DD HH:MM
fn format_time(time: DateTime<Utc>) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

impl App {
    pub fn new(store: SqliteStore, json: bool) -> Self {
        Self { store, json }
    }

    pub fn add(&self, content: CardContent) -> Result<()> {
        let card = self
            .store
            .create_card(content, Utc::now())
            .context("failed to create card")?;
        self.print_card(&card)
    }

    pub fn edit(&self, id: &str, content: CardContent) -> Result<()> {
        let card = self
            .store
            .update_card_content(id, content, Utc::now())
            .with_context(|| format!("failed to update card {}", id))?;
        self.print_card(&card)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.store
            .delete_card(id)
            .with_context(|| format!("failed to delete card {}", id))?;
        if !self.json {
            println!("Deleted card {}", id);
        }
        Ok(())
    }

    pub fn show(&self, id: &str) -> Result<()> {
        let Some(card) = self.store.find_card(id)? else {
            bail!("card not found: {}", id);
        };
        let reviews = self.store.reviews_for_card(id)?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "card": card,
                    "reviews": reviews,
                }))?
            );
            return Ok(());
        }

        print_card_details(&card);
        println!("History ({} reviews):", reviews.len());
        for review in reviews {
            println!(
                "  {}  {:<7} streak {}  next {}",
                format_time(review.reviewed_at),
                review.result,
                review.streak,
                format_time(review.next_due_at)
            );
        }
        Ok(())
    }

    pub fn list(&self, query: Option<&str>, limit: Option<i64>) -> Result<()> {
        let cards = self.store.list_cards(query, config::list_limit(limit))?;
        self.print_cards(&cards)
    }

    pub fn queue(&self, request: QueueRequest) -> Result<()> {
        let (_, cards) = self.build_queue(request)?;
        self.print_cards(&cards)
    }

    pub fn review(&self, id: &str, label: &str) -> Result<()> {
        let result: ReviewResult = label.parse()?;
        let recorder = ReviewRecorder::new(&self.store);
        let state = recorder.record(id, result, Utc::now())?;

        if self.json {
            let outcome = ReviewOutcome {
                card_id: id,
                result,
                streak: state.streak,
                next_due_at: state.next_due_at,
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            println!(
                "Streak {}, next review {}",
                state.streak,
                format_time(state.next_due_at)
            );
        }
        Ok(())
    }

    pub fn stats(&self, days: Option<i64>) -> Result<()> {
        let summaries = recent_summaries(&self.store, config::summary_days(days), Utc::now())?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
            return Ok(());
        }

        if summaries.is_empty() {
            println!("No reviews in this period.");
        }
        for DailySummary {
            date,
            total,
            correct,
            hold,
            wrong,
        } in summaries
        {
            println!(
                "{}  total {:>3}  correct {:>3}  hold {:>3}  wrong {:>3}",
                date, total, correct, hold, wrong
            );
        }
        Ok(())
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        let cards = self.store.all_cards()?;
        export_cards_to_path(&cards, path)
            .with_context(|| format!("failed to export to {}", path.display()))?;
        println!("Exported {} cards to '{}'", cards.len(), path.display());
        Ok(())
    }

    pub fn import(&self, path: &Path) -> Result<()> {
        let contents = import_cards(path)
            .with_context(|| format!("failed to import from {}", path.display()))?;

        let now = Utc::now();
        let mut imported = 0;
        for content in contents {
            match self.store.create_card(content, now) {
                Ok(_) => imported += 1,
                Err(e) => tracing::warn!("Skipping imported card: {}", e),
            }
        }
        println!("Imported {} cards from '{}'", imported, path.display());
        Ok(())
    }

    pub fn seed(&self) -> Result<()> {
        let added = self.store.seed_sample_cards(Utc::now())?;
        if added > 0 {
            println!("Sample data created!");
        } else {
            println!("Store already has cards; nothing seeded.");
        }
        Ok(())
    }

    /// Interactive study loop on stdin/stdout.
    pub fn study(&self, request: QueueRequest) -> Result<()> {
        let (mode, cards) = self.build_queue(request)?;
        let mut session = StudySession::new(mode, cards);
        let recorder = ReviewRecorder::new(&self.store);

        println!("Mode: {}", session.mode);
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        while let Some(card) = session.current_card() {
            println!();
            println!("[{}] {}", session.progress(), card.content.word);
            println!("    {}", card.content.sentence);
            if session.show_answer {
                print_answer(card);
            }
            print!("(enter) flip  (c)orrect (h)old (w)rong  (s)huffle  (q)uit > ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            match line?.trim() {
                "" => session.toggle_answer(),
                "s" => session.reshuffle(),
                "q" => break,
                input => {
                    let result = match input {
                        "c" => ReviewResult::Correct,
                        "h" => ReviewResult::Hold,
                        "w" => ReviewResult::Wrong,
                        other => match other.parse() {
                            Ok(result) => result,
                            Err(e) => {
                                println!("{}", e);
                                continue;
                            }
                        },
                    };
                    // A failed save keeps the card on screen so it can be answered again.
                    match session.submit(&recorder, result, Utc::now()) {
                        Ok(Some(state)) => {
                            println!("  next review {}", format_time(state.next_due_at))
                        }
                        Ok(None) => {}
                        Err(e) => println!("Could not save the result, try again: {}", e),
                    }
                }
            }
        }

        if session.is_completed() {
            println!("No cards left to study.");
        } else {
            println!("Stopped with {} cards remaining.", session.remaining_count());
        }
        Ok(())
    }

    fn build_queue(&self, request: QueueRequest) -> Result<(StudyMode, Vec<Card>)> {
        let queue = StudyQueueBuilder::new(&self.store).build(request, Utc::now())?;
        Ok(queue)
    }

    fn print_card(&self, card: &Card) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(card)?);
        } else {
            print_card_details(card);
        }
        Ok(())
    }

    fn print_cards(&self, cards: &[Card]) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(cards)?);
            return Ok(());
        }

        if cards.is_empty() {
            println!("No cards.");
        }
        for card in cards {
            let last = card
                .last_result
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{}  {:<20} streak {:>2}  last {:<7} due {}",
                card.id,
                card.content.word,
                card.streak,
                last,
                format_time(card.next_due_at)
            );
        }
        Ok(())
    }
}

fn print_card_details(card: &Card) {
    println!("{} ({})", card.content.word, card.id);
    println!("  {}", card.content.sentence);
    print_answer(card);
    println!(
        "  streak {}, last result {}, due {}",
        card.streak,
        card.last_result
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string()),
        format_time(card.next_due_at)
    );
}

fn print_answer(card: &Card) {
    let content = &card.content;
    let pron = content
        .word_pronunciation
        .as_deref()
        .map(|p| format!(" ({})", p))
        .unwrap_or_default();
    println!(
        "  meaning: {}{}",
        content.meaning.as_deref().unwrap_or("-"),
        pron
    );
    println!(
        "  translation: {}",
        content.sentence_translation.as_deref().unwrap_or("-")
    );
    if let Some(pron) = &content.sentence_pronunciation {
        println!("  ({})", pron);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_card() -> (App, Card) {
        let store = SqliteStore::open_in_memory().unwrap();
        let card = store
            .create_card(CardContent::new("gato", "El gato duerme."), Utc::now())
            .unwrap();
        (App::new(store, true), card)
    }

    #[test]
    fn test_review_records_parsed_label_once() {
        let (app, card) = app_with_card();
        app.review(&card.id, " Hold ").unwrap();

        let reviews = app.store.reviews_for_card(&card.id).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].result, ReviewResult::Hold);
    }

    #[test]
    fn test_review_rejects_unknown_label_without_writing() {
        let (app, card) = app_with_card();
        assert!(app.review(&card.id, "maybe").is_err());
        assert!(app.store.reviews_for_card(&card.id).unwrap().is_empty());
    }
}
