use anyhow::{Context, Result};
use bayes_core::config::EngineConfig;
use bayes_core::core::scorer::order_by_score;
use bayes_core::{BayesEngine, ClassificationResult, Message, MessageId};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Naive Bayes authorship classifier
///
/// Learns per-author vocabularies from stored messages and ranks authors for new text.
#[derive(Parser, Debug)]
#[command(name = "bayes_engine", version)]
struct Cli {
    /// Config file (default: ~/.config/bayes-authorship/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store snapshot file, overrides the config
    #[arg(long, global = true, env = "BAYES_STORE_PATH")]
    store: Option<PathBuf>,

    /// MeCab executable, overrides the config
    #[arg(long, global = true, env = "BAYES_MECAB")]
    mecab: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register an author with an empty model
    AddAuthor { author: String },

    /// Store a message for later learning
    AddMessage {
        #[arg(long)]
        author: String,
        #[arg(long)]
        id: MessageId,
        text: String,
    },

    /// Learn pending messages (all authors unless --author is given)
    Learn {
        #[arg(long)]
        author: Option<String>,
        /// Messages per author (default: learning.batch_size)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Rank every known author for a text
    Classify {
        text: String,
        #[arg(long)]
        json: bool,
    },

    /// Show the eligible word counts of a text
    Vectorize { text: String },

    /// List authors and their counters
    Authors,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = EngineConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if let Some(mecab) = cli.mecab {
        config.tokenizer.program = mecab;
    }

    let engine = BayesEngine::open(&config)
        .with_context(|| format!("Failed to open store {}", config.store_path.display()))?;
    run(&engine, cli.command)
}

fn run(engine: &BayesEngine, command: Command) -> Result<()> {
    match command {
        Command::AddAuthor { author } => {
            if engine.register_author(&author)? {
                println!("Registered '{}'", author);
            } else {
                println!("'{}' is already registered", author);
            }
        }
        Command::AddMessage { author, id, text } => {
            if engine.add_message(Message::new(id, author, text))? {
                println!("Stored message {}", id);
            } else {
                println!("Message {} was already stored", id);
            }
        }
        Command::Learn { author, max } => {
            let learned = match author {
                Some(author) => {
                    let count = match max {
                        Some(max) => engine.learn(&author, max)?,
                        None => engine.learn_pending(&author)?,
                    };
                    vec![(author, count)]
                }
                None => engine.learn_all_with(max.unwrap_or(engine.batch_size()))?,
            };
            for (author, count) in learned {
                println!("{:<20} learned {} message(s)", author, count);
            }
        }
        Command::Classify { text, json } => {
            let mut results = engine.rank_all(&text)?;
            order_by_score(&mut results);
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_ranking(&results);
            }
        }
        Command::Vectorize { text } => {
            let vector = engine.vectorize(&text);
            if vector.is_empty() {
                println!("No eligible words.");
            }
            for (word, count) in vector.sorted() {
                println!("{:>6}  {}", count, word);
            }
        }
        Command::Authors => {
            let authors = engine.authors()?;
            if authors.is_empty() {
                println!("No authors yet.");
            }
            for stats in authors {
                let range = match (stats.min_message_id, stats.max_message_id) {
                    (Some(min), Some(max)) => format!("{}..={}", min, max),
                    _ => "-".to_string(),
                };
                println!(
                    "{:<20} {:>6} learned / {:>6} total, {:>6} words, ids {}",
                    stats.author_id,
                    stats.messages_incorporated,
                    stats.messages_total,
                    stats.vocabulary_size,
                    range
                );
            }
        }
    }
    Ok(())
}

fn print_ranking(results: &[ClassificationResult]) {
    if results.is_empty() {
        println!("No authors to compare against.");
        return;
    }
    println!("Ranking (higher score = more likely author):");
    for (i, result) in results.iter().enumerate() {
        match result.score {
            Some(score) if i == 0 => {
                let name = format!("{:<20}", result.author_id);
                println!("  {:>2}. {} {:>12.4}", i + 1, name.bold().green(), score)
            }
            Some(score) => println!("  {:>2}. {:<20} {:>12.4}", i + 1, result.author_id, score),
            None => println!(
                "  {:>2}. {:<20} {}",
                i + 1,
                result.author_id,
                "cannot classify".dark_grey()
            ),
        }
    }
}
