use clap::{Parser, Subcommand};
use langlearn::answer::expected_answers;
use langlearn::catalog::json::load_catalog;
use langlearn::engine::Recorded;
use langlearn::models::RetryOutcome;
use langlearn::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "langlearn")]
#[command(about = "Spaced-repetition phrase trainer")]
#[command(version)]
struct Cli {
    /// SQLite file holding progress and settings
    #[arg(long, default_value = "db.sqlite3")]
    db: PathBuf,

    /// JSON file with the phrase collections
    #[arg(long)]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List collections, including mixed practice and review sets
    List,

    /// Show learned and remaining counts
    Stats {
        /// Collection id, e.g. `travel`, `mixed_de` or `review_de`
        collection: String,
    },

    /// Practice interactively. Opens the last collection when none is given.
    Practice { collection: Option<String> },

    /// Delete all progress of a collection
    Reset { collection: String },

    /// Star or unstar a phrase for the language's review set
    Star { collection: String, phrase: String },

    /// Bring back a hidden phrase
    Unhide { collection: String, phrase: String },

    /// Words that keep being missed across phrases
    Weak {
        #[arg(long, default_value_t = 2)]
        min_contexts: usize,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("langlearn=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "langlearn failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let store = SqliteStore::open(&cli.db)?;
    let catalog = load_catalog(&cli.catalog)?;
    let mut engine = Engine::new(store, catalog);
    let mut state = SessionState::new();

    match cli.command {
        Commands::List => {
            for entry in engine.list_collections() {
                let stats = engine.stats_for(&entry.id)?;
                println!(
                    "{:<20} {:<30} [{}] {}/{} learned",
                    entry.id, entry.name, entry.language, stats.learned, stats.total
                );
            }
        }
        Commands::Stats { collection } => {
            let stats = engine.stats_for(&collection)?;
            println!("Total:     {}", stats.total);
            println!("Learned:   {}", stats.learned);
            println!("Remaining: {}", stats.remaining);
        }
        Commands::Practice { collection } => {
            let opened = match collection {
                Some(id) => engine.open_collection(&mut state, &id)?,
                None => engine.open_last(&mut state)?,
            };
            println!("Practicing {opened}. Commands: :star :hide :stats :q");
            practice(&mut engine, &mut state)?;
        }
        Commands::Reset { collection } => {
            engine.reset_collection(&mut state, &collection)?;
            println!("Progress of {collection} reset.");
        }
        Commands::Star { collection, phrase } => {
            if engine.toggle_star(&collection, &phrase)? {
                println!("Starred {phrase}.");
            } else {
                println!("Unstarred {phrase}.");
            }
        }
        Commands::Unhide { collection, phrase } => {
            engine.unhide(&mut state, &collection, &phrase)?;
            println!("{phrase} is visible again.");
        }
        Commands::Weak { min_contexts } => {
            let words = engine.weak_vocabulary(min_contexts);
            if words.is_empty() {
                println!("No weak words yet.");
            }
            for word in words {
                println!(
                    "{:<20} {:>3.0}% across {} phrases",
                    word.word,
                    word.mastery * 100.0,
                    word.contexts
                );
            }
        }
    }
    Ok(())
}

enum Input {
    Text(String),
    Quit,
}

fn prompt_line(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    prompt: &str,
) -> Result<Input, Error> {
    print!("{prompt}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => {
            let line = line?;
            if line.trim() == ":q" {
                Ok(Input::Quit)
            } else {
                Ok(Input::Text(line))
            }
        }
        None => Ok(Input::Quit),
    }
}

fn practice<S: KeyValueStore, C: CatalogProvider>(
    engine: &mut Engine<S, C>,
    state: &mut SessionState,
) -> Result<(), Error> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    // Set when the engine already advanced while handling a command.
    let mut queued: Option<Next> = None;

    loop {
        let next = match queued.take() {
            Some(next) => next,
            None => engine.load_next(state)?,
        };
        let phrase = match next {
            Next::Phrase(phrase) => phrase,
            Next::AllLearned => {
                println!("All phrases in this collection are learned.");
                return Ok(());
            }
        };
        let reverse = engine.settings().reverse_mode;
        let expected = expected_answers(&phrase.phrase, reverse)
            .first()
            .map(|s| s.to_string())
            .unwrap_or_default();

        let marker = if state.retry().is_active() { " (retry)" } else { "" };
        println!();
        println!("{}{marker}", phrase.phrase.shown_side(reverse));

        let response = match prompt_line(&mut lines, "> ")? {
            Input::Quit => return Ok(()),
            Input::Text(text) => text,
        };
        match response.trim() {
            ":star" => {
                match engine.toggle_current_star(state)? {
                    StarToggle::Starred => {
                        println!("Starred.");
                        queued = Some(Next::Phrase(phrase.clone()));
                    }
                    StarToggle::Unstarred => {
                        println!("Unstarred.");
                        queued = Some(Next::Phrase(phrase.clone()));
                    }
                    StarToggle::RemovedFromReview(next) => {
                        println!("Removed from review.");
                        queued = Some(next);
                    }
                }
                continue;
            }
            ":hide" => {
                queued = Some(engine.hide_current(state)?);
                println!("Hidden.");
                continue;
            }
            ":stats" => {
                let stats = engine.stats(state)?;
                println!("{}/{} learned", stats.learned, stats.total);
                queued = Some(Next::Phrase(phrase.clone()));
                continue;
            }
            _ => {}
        }

        let correct = match engine.settings().exercise_mode {
            ExerciseMode::ActiveRecall => engine.check_response(state, &response)?,
            ExerciseMode::ShowAnswer => {
                println!("{expected}");
                match prompt_line(&mut lines, "Did you know it? [y/n] ")? {
                    Input::Quit => return Ok(()),
                    Input::Text(text) => text.trim().eq_ignore_ascii_case("y"),
                }
            }
        };
        if engine.settings().exercise_mode == ExerciseMode::ActiveRecall {
            if correct {
                println!("Correct.");
            } else {
                println!("Expected: {expected}");
            }
        }

        match engine.submit(state, correct)? {
            SubmitOutcome::Recorded {
                recorded: Recorded { record, persisted },
                retry_started,
            } => {
                if !persisted {
                    println!("(progress could not be saved)");
                }
                if retry_started {
                    println!("Let's try that one again.");
                } else if correct {
                    println!("Next review in {} days.", record.interval);
                }
            }
            SubmitOutcome::Practiced(RetryOutcome::Satisfied) => println!("Got it."),
            SubmitOutcome::Practiced(RetryOutcome::Continuing) => {}
        }
    }
}
