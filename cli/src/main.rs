//! mealdedup CLI - cafeteria dish-name deduplication tool
//!
//! Previews duplicate groups in a batch of menu names and applies the
//! resulting mapping to a JSON meal store.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use mealdedup::{
    apply_mapping, normalize, protein_tag, read_names, render_preview, ApplyMode, ApplyOutcome,
    ApplyReport, BatchStats, DedupOptions, DedupReport, Deduplicator, MemoryStore,
    PreviewOptions,
};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "MEALDEDUP_LOG";

/// Duplicate detection for cafeteria menu dish names
#[derive(Parser)]
#[command(
    name = "mealdedup",
    version,
    about = "Find and merge duplicate dish names",
    long_about = "mealdedup - duplicate detection for scraped cafeteria menus.\n\n\
                  Input files hold one name per line or a JSON array of strings.\n\n\
                  Usage:\n  \
                  mealdedup preview <file>             Show duplicate groups\n  \
                  mealdedup explain <a> <b>            Explain one pair\n  \
                  mealdedup apply <store.json>         Dry-run deduplication of a store"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Overall similarity threshold (0.0 - 1.0)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// JSON file with deduplication options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable parallel processing
    #[arg(long, global = true)]
    sequential: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the duplicate groups of a batch
    Preview {
        /// Input file with names
        input: PathBuf,

        /// Number of groups to show
        #[arg(long, default_value = "30")]
        limit: usize,
    },

    /// Write the full report (groups and mapping) as JSON
    Groups {
        /// Input file with names
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Explain whether two names are the same dish
    Explain {
        name1: String,
        name2: String,
    },

    /// Show the normalized forms of a name
    Normalize {
        name: String,
    },

    /// Show statistics about a batch
    Stats {
        /// Input file with names
        input: PathBuf,

        /// Number of top words to show
        #[arg(long, default_value = "20")]
        top: usize,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Deduplicate the meals of a JSON meal store
    Apply {
        /// JSON meal store
        store: PathBuf,

        /// File with the names to deduplicate (default: every stored meal)
        #[arg(long)]
        names: Option<PathBuf>,

        /// Write the changes (default: dry run)
        #[arg(long)]
        commit: bool,

        /// Where to save the updated store (default: in place)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = build_options(cli.config.as_deref(), cli.threshold, cli.sequential)?;
    let deduplicator = Deduplicator::with_options(options);

    match cli.command {
        Commands::Preview { input, limit } => {
            let report = run_batch(&deduplicator, read_names(&input)?)?;
            let preview_options = PreviewOptions::new()
                .with_limit(limit)
                .with_seed_marker("→".yellow().to_string());
            print!("{}", render_preview(&report, &preview_options));
        }

        Commands::Groups {
            input,
            output,
            compact,
        } => {
            let report = run_batch(&deduplicator, read_names(&input)?)?;

            let json = if compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };

            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!(
                    "{} {} groups written to {}",
                    "✓".green().bold(),
                    report.groups.len(),
                    path.display()
                );
            }
        }

        Commands::Explain { name1, name2 } => {
            let decision = deduplicator.explain(&name1, &name2);
            let verdict = if decision.is_duplicate() {
                "same dish".green().bold()
            } else {
                "different dishes".red().bold()
            };

            println!("{}: {}", "Verdict".bold(), verdict);
            match decision.rule {
                Some(rule) => println!("{}: {:?} ({})", "Rule".bold(), rule, rule),
                None => println!("{}: {}", "Rule".bold(), "no rule matched".dimmed()),
            }
            println!(
                "{}: {:.4}",
                "Similarity".bold(),
                mealdedup::similarity(
                    &normalize(&name1).comparison,
                    &normalize(&name2).comparison
                )
            );
        }

        Commands::Normalize { name } => {
            let form = normalize(&name);
            let codes: Vec<&str> = form.allergen_codes.iter().map(String::as_str).collect();

            println!("{}: {}", "Comparison".bold(), form.comparison);
            println!("{}: {}", "Clean".bold(), form.clean);
            println!("{}: {}", "Headline".bold(), mealdedup::dish_headline(&name));
            println!("{}: {}", "Protein".bold(), protein_tag(&name));
            println!("{}: {}", "Allergens".bold(), codes.join(", "));
        }

        Commands::Stats { input, top, json } => {
            let names = read_names(&input)?;
            let stats = BatchStats::collect_with_top(&names, top);

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }

        Commands::Apply {
            store,
            names,
            commit,
            output,
            yes,
        } => {
            let mut meal_store = MemoryStore::load(&store)?;
            let batch = batch_for_store(&meal_store, names.as_deref())?;
            let report = run_batch(&deduplicator, batch)?;
            print!("{}", render_preview(&report, &PreviewOptions::default()));

            if !report.has_duplicates() {
                println!("\n{} No duplicates found.", "✓".green().bold());
                return Ok(());
            }

            let mode = if commit {
                ApplyMode::Commit
            } else {
                ApplyMode::DryRun
            };

            if mode == ApplyMode::Commit && !yes {
                print!("\nAre you sure you want to apply these changes? (yes/no): ");
                io::stdout().flush()?;
                if !confirm(io::stdin().lock())? {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            let applied = apply_mapping(&mut meal_store, &report.mapping, mode)?;
            print_apply_report(&applied);

            if mode == ApplyMode::Commit {
                let target = output.as_deref().unwrap_or(&store);
                meal_store.save(target)?;
                println!(
                    "\n{} Deduplicated {} meals, store saved to {}",
                    "✓".green().bold(),
                    applied.updates_made(),
                    target.display()
                );
            } else {
                println!(
                    "\nWould deduplicate {} meals. {}",
                    applied.updates_made(),
                    "Re-run with --commit to apply.".dimmed()
                );
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Reads the options file, then applies command-line overrides.
fn build_options(
    config: Option<&Path>,
    threshold: Option<f64>,
    sequential: bool,
) -> Result<DedupOptions, Box<dyn std::error::Error>> {
    let mut options = match config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => DedupOptions::default(),
    };

    if let Some(threshold) = threshold {
        options = options.with_threshold(threshold);
    }
    if sequential {
        options = options.sequential();
    }

    options.validate()?;
    Ok(options)
}

fn run_batch(
    deduplicator: &Deduplicator,
    names: Vec<String>,
) -> Result<DedupReport, Box<dyn std::error::Error>> {
    let pb = create_spinner(&format!("Comparing {} names...", names.len()));

    let report = deduplicator.try_run(&names)?;

    pb.finish_and_clear();
    Ok(report)
}

/// Names to deduplicate for `apply`: the names file if given, else every stored meal.
fn batch_for_store(
    store: &MemoryStore,
    names: Option<&Path>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    match names {
        Some(path) => Ok(read_names(path)?),
        None => Ok(store.meal_names()),
    }
}

/// True if the answer line is "yes" (any case).
fn confirm<R: BufRead>(mut reader: R) -> io::Result<bool> {
    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

fn print_apply_report(report: &ApplyReport) {
    let title = match report.mode {
        ApplyMode::DryRun => "DRY RUN - No changes will be made",
        ApplyMode::Commit => "APPLYING DEDUPLICATION",
    };
    println!("\n{}", title.cyan().bold());
    println!("{}", "─".repeat(40));

    for record in &report.records {
        let old = mealdedup::preview::truncate(&record.old, 60);
        let canonical = mealdedup::preview::truncate(&record.canonical, 60);
        match record.outcome {
            ApplyOutcome::Skipped => {
                println!("{} {} {}", "Skipped:".dimmed(), old, "(not stored)".dimmed())
            }
            ApplyOutcome::Renamed => println!("{} {} -> {}", "Renamed:".yellow(), old, canonical),
            ApplyOutcome::Merged => println!(
                "{} {} -> {} ({} references)",
                "Merged:".green(),
                old,
                canonical,
                record.references
            ),
        }
    }
}

fn print_stats(stats: &BatchStats) {
    println!("{}", "Batch Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Names".bold(), stats.total);
    println!("{}: {}", "With allergen codes".bold(), stats.with_allergen_codes);
    println!(
        "{}: {} groups, {} names",
        "Exact collisions".bold(),
        stats.collision_groups,
        stats.collided_names
    );

    if let Some(length) = &stats.length {
        println!(
            "{}: min {}, max {}, mean {:.1}, median {}",
            "Length".bold(),
            length.min,
            length.max,
            length.mean,
            length.median
        );
    }

    println!("\n{}", "Proteins".cyan().bold());
    println!("{}", "─".repeat(40));
    for (tag, count) in &stats.proteins {
        println!("  {:20}: {:4}", tag.to_string(), count);
    }

    if !stats.non_meal_markers.is_empty() {
        println!("\n{}", "Non-meal entries".cyan().bold());
        println!("{}", "─".repeat(40));
        for marker in &stats.non_meal_markers {
            println!("  {:20}: {:4}", marker.word, marker.count);
        }
    }

    println!("\n{}", "Top words".cyan().bold());
    println!("{}", "─".repeat(40));
    for word in &stats.top_words {
        println!("  {:20}: {:4}", word.word, word.count);
    }
}

fn print_version() {
    println!("{} {}", "mealdedup".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Duplicate detection for cafeteria menu dish names");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
