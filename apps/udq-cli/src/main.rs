use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use udq_deck::{DeckResult, QuantityValue};

#[derive(Parser)]
#[command(name = "udq-cli")]
#[command(about = "UDQ CLI - evaluate user defined quantities over a scenario deck", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate deck syntax, structure and records
    Validate {
        /// Path to the deck (YAML, or JSON by extension)
        deck_path: PathBuf,
    },
    /// List quantities and the summary vectors they need
    Keys {
        /// Path to the deck
        deck_path: PathBuf,
    },
    /// Evaluate every step of a deck
    Run {
        /// Path to the deck
        deck_path: PathBuf,
        /// Override the deck's random seed
        #[arg(long)]
        seed: Option<u64>,
        /// Write per-step results as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Dump restart records for the registry after a step
    Restart {
        /// Path to the deck
        deck_path: PathBuf,
        /// Last step whose records are included (defaults to all)
        #[arg(long)]
        step: Option<usize>,
        /// Output JSON file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> DeckResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { deck_path } => cmd_validate(&deck_path),
        Commands::Keys { deck_path } => cmd_keys(&deck_path),
        Commands::Run {
            deck_path,
            seed,
            output,
        } => cmd_run(&deck_path, seed, output.as_deref()),
        Commands::Restart {
            deck_path,
            step,
            output,
        } => cmd_restart(&deck_path, step, output.as_deref()),
    }
}

fn cmd_validate(deck_path: &Path) -> DeckResult<()> {
    println!("Validating deck: {}", deck_path.display());
    let deck = udq_deck::load(deck_path)?;
    println!("✓ Deck is valid ({} steps)", deck.steps.len());
    Ok(())
}

fn cmd_keys(deck_path: &Path) -> DeckResult<()> {
    let deck = udq_deck::load(deck_path)?;
    let config = udq_deck::registry_at(&deck, None)?;

    if config.is_empty() {
        println!("No quantities found in deck");
    } else {
        println!("Quantities:");
        for name in config.names() {
            let Some(index) = config.index(name) else {
                continue;
            };
            let unit = config.unit(name).unwrap_or("-");
            println!("  {name} - {} {} [{unit}]", index.category, index.action);
        }
    }

    let keys = config.required_summary_keys();
    if !keys.is_empty() {
        println!("Summary vectors:");
        for key in keys {
            println!("  {key}");
        }
    }
    Ok(())
}

fn cmd_run(deck_path: &Path, seed: Option<u64>, output: Option<&Path>) -> DeckResult<()> {
    let deck = udq_deck::load(deck_path)?;
    println!("Running deck: {}", deck_path.display());
    let run = udq_deck::run_seeded(&deck, seed)?;
    let undefined = deck.params.undefined_value;

    for snapshot in &run.steps {
        println!("Step {}:", snapshot.report.report_step);
        for (name, value) in &snapshot.values {
            match value {
                QuantityValue::Scalar(v) => {
                    println!("  {name} = {}", v.unwrap_or(undefined));
                }
                QuantityValue::Entities(values) => {
                    let cells: Vec<String> = values
                        .iter()
                        .map(|(entity, v)| format!("{entity}={}", v.unwrap_or(undefined)))
                        .collect();
                    println!("  {name}: {}", cells.join(" "));
                }
            }
        }
        for diagnostic in &snapshot.report.diagnostics {
            let location = diagnostic
                .location
                .as_ref()
                .map(|l| format!(" ({l})"))
                .unwrap_or_default();
            println!("  ! {}{location}: {}", diagnostic.name, diagnostic.message);
        }
    }

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&run)?)?;
        println!("✓ Results written to: {}", path.display());
    }

    if run.is_clean() {
        println!("✓ Run completed");
    } else {
        println!("✓ Run completed with diagnostics");
    }
    Ok(())
}

fn cmd_restart(deck_path: &Path, step: Option<usize>, output: Option<&Path>) -> DeckResult<()> {
    let deck = udq_deck::load(deck_path)?;
    let config = udq_deck::registry_at(&deck, step)?;
    let records = config.to_restart_records();
    let text = serde_json::to_string_pretty(&records)?;

    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            println!(
                "✓ Wrote {} restart records to: {}",
                records.len(),
                path.display()
            );
        }
        None => println!("{text}"),
    }
    Ok(())
}
