mod app;

use anyhow::{Context, Result};
use app::App;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vocab_review::config::DEFAULT_DB_PATH;
use vocab_review::models::CardContent;
use vocab_review::SqliteStore;
use vocab_review::study::QueueRequest;

/// Spaced-repetition vocabulary review.
#[derive(Parser)]
#[command(name = "vocab", version, about = "Spaced-repetition vocabulary review")]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true, env = "VOCAB_DB", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a card, due immediately
    Add(ContentArgs),

    /// Replace the content of a card (schedule is kept)
    Edit {
        id: String,
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Delete a card and its review history
    Delete { id: String },

    /// Show a card with its review history
    Show { id: String },

    /// List cards, newest first
    List {
        /// Substring of the word to search for
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Print a study queue without studying it
    Queue {
        #[command(subcommand)]
        mode: QueueMode,
    },

    /// Record an outcome for a card: correct, hold or wrong
    Review { id: String, result: String },

    /// Daily review counts for recent days
    Stats {
        #[arg(long)]
        days: Option<i64>,
    },

    /// Study interactively
    Study {
        /// Study cards last answered hold or wrong
        #[arg(long, conflicts_with = "ids")]
        retry: bool,
        /// Comma-separated card ids to study in order
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        new_limit: Option<i64>,
    },

    /// Export card content to a JSON file
    Export { path: PathBuf },

    /// Create cards from a JSON file
    Import { path: PathBuf },

    /// Add sample cards to an empty database
    Seed,
}

#[derive(Subcommand)]
enum QueueMode {
    /// Due reviews first, then new cards in the remaining room
    Today {
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        new_limit: Option<i64>,
    },
    /// Cards last answered hold or wrong
    Retry {
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Specific cards, in the given order
    Selected {
        #[arg(value_delimiter = ',', required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args)]
struct ContentArgs {
    #[arg(long)]
    word: String,
    #[arg(long)]
    sentence: String,
    #[arg(long)]
    meaning: Option<String>,
    #[arg(long)]
    word_pronunciation: Option<String>,
    #[arg(long)]
    sentence_translation: Option<String>,
    #[arg(long)]
    sentence_pronunciation: Option<String>,
}

impl From<ContentArgs> for CardContent {
    fn from(args: ContentArgs) -> Self {
        CardContent {
            word: args.word,
            sentence: args.sentence,
            meaning: args.meaning,
            word_pronunciation: args.word_pronunciation,
            sentence_translation: args.sentence_translation,
            sentence_pronunciation: args.sentence_pronunciation,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("failed to open database {}", cli.db.display()))?;
    let app = App::new(store, cli.json);

    match cli.command {
        Commands::Add(content) => app.add(content.into()),
        Commands::Edit { id, content } => app.edit(&id, content.into()),
        Commands::Delete { id } => app.delete(&id),
        Commands::Show { id } => app.show(&id),
        Commands::List { query, limit } => app.list(query.as_deref(), limit),
        Commands::Queue { mode } => app.queue(match mode {
            QueueMode::Today { limit, new_limit } => QueueRequest::Today { limit, new_limit },
            QueueMode::Retry { limit } => QueueRequest::Retry { limit },
            QueueMode::Selected { ids } => QueueRequest::Selected { ids },
        }),
        Commands::Review { id, result } => app.review(&id, &result),
        Commands::Stats { days } => app.stats(days),
        Commands::Study {
            retry,
            ids,
            limit,
            new_limit,
        } => app.study(if !ids.is_empty() {
            QueueRequest::Selected { ids }
        } else if retry {
            QueueRequest::Retry { limit }
        } else {
            QueueRequest::Today { limit, new_limit }
        }),
        Commands::Export { path } => app.export(&path),
        Commands::Import { path } => app.import(&path),
        Commands::Seed => app.seed(),
    }
}
