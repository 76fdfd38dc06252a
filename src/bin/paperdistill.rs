//! CLI binary for paperdistill.
//!
//! A thin shim over the library crate: maps CLI flags to `AnalysisConfig`,
//! drives an `AnalysisSession` through its lifecycle, and prints or writes
//! the results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use paperdistill::session::{
    drive_status_messages, DOCUMENT_STATUS_SCHEDULE, TEXT_STATUS_SCHEDULE,
};
use paperdistill::{
    analyze_document, analyze_text, diagram, AnalysisConfig, AnalysisResult, AnalysisSession,
    DiagramSlot, TargetLanguage,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Turn documents into summaries, key takeaways, and concept maps.
#[derive(Parser, Debug)]
#[command(name = "paperdistill", version, about)]
struct Cli {
    /// PDF document to analyze.
    input: Option<PathBuf>,

    /// Analyze this text instead of a document.
    #[arg(long, conflicts_with = "input")]
    text: Option<String>,

    /// Read the text to analyze from stdin.
    #[arg(long, conflicts_with_all = ["input", "text"])]
    stdin: bool,

    /// Target language for the translated insights.
    #[arg(short, long, default_value = "Chinese")]
    language: String,

    /// Model identifier.
    #[arg(long, default_value = "gemini-2.5-flash")]
    model: String,

    /// API key (defaults to the GEMINI_API_KEY environment variable).
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Write report.md and diagram.svg into this directory.
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Print the raw analysis result as JSON.
    #[arg(long)]
    json: bool,

    /// Per-call timeout in seconds.
    #[arg(long, default_value_t = 120)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let language: TargetLanguage = cli.language.parse()?;
    let mut builder = AnalysisConfig::builder()
        .model(&cli.model)
        .target_language(language)
        .api_timeout_secs(cli.timeout);
    if let Some(key) = &cli.api_key {
        builder = builder.api_key(key);
    }
    let config = builder.build()?;

    // Resolve the submission before touching the session so invalid
    // invocations fail fast.
    let (text_input, schedule) = if cli.stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        (Some(buf), &TEXT_STATUS_SCHEDULE[..])
    } else if let Some(text) = cli.text.clone() {
        (Some(text), &TEXT_STATUS_SCHEDULE[..])
    } else if cli.input.is_some() {
        (None, &DOCUMENT_STATUS_SCHEDULE[..])
    } else {
        bail!("nothing to analyze: pass a PDF path, --text, or --stdin");
    };

    let session = Arc::new(Mutex::new(AnalysisSession::new()));
    let ticket = session
        .lock()
        .expect("session lock")
        .begin()
        .expect("fresh session is idle");

    let bar = spinner();
    tokio::spawn(drive_status_messages(
        Arc::clone(&session),
        ticket,
        schedule,
    ));

    // Await the single analysis call while mirroring the session's advisory
    // status line onto the spinner.
    let outcome = {
        let fut = async {
            match (&text_input, &cli.input) {
                (Some(text), _) => analyze_text(text, &config).await,
                (None, Some(path)) => analyze_document(path, &config).await,
                (None, None) => unreachable!("validated above"),
            }
        };
        tokio::pin!(fut);
        let mut ticker = tokio::time::interval(Duration::from_millis(120));
        loop {
            tokio::select! {
                result = &mut fut => break result,
                _ = ticker.tick() => {
                    if let Some(msg) = session.lock().expect("session lock").status_message() {
                        bar.set_message(msg.to_string());
                    }
                }
            }
        }
    };

    let result = match outcome {
        Ok(result) => {
            session
                .lock()
                .expect("session lock")
                .resolve(ticket, result.clone());
            bar.finish_and_clear();
            result
        }
        Err(e) => {
            tracing::warn!("Analysis failed: {e}");
            let mut s = session.lock().expect("session lock");
            s.fail(ticket, Some(e.user_message()));
            bar.finish_and_clear();
            let msg = s.error_message().unwrap_or("Something went wrong.").to_string();
            eprintln!("{} {}", red("✗"), bold(&msg));
            std::process::exit(1);
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_report(&result);

    // Render the concept map through a display slot, exactly as a result
    // view would; a fallback render is a notice, not a failure.
    let mut slot = DiagramSlot::new();
    let seq = slot.begin();
    slot.complete(seq, diagram::render(&result.diagram_source));
    let rendered = slot.current().expect("render just completed");
    if rendered.fallback {
        eprintln!("{}", dim(&format!("note: {}", diagram::FALLBACK_MESSAGE)));
    }

    if let Some(dir) = &cli.out {
        write_outputs(dir, &result, &rendered.svg)?;
        println!("\n{} Wrote {} and {}", cyan("◆"),
            dir.join("report.md").display(),
            dir.join("diagram.svg").display());
    }

    Ok(())
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
    bar.set_style(style);
    bar.set_message("Initializing...");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_report(result: &AnalysisResult) {
    println!("{}", bold(&result.title));
    println!("{}\n", dim(&format!("detected language: {}", result.original_language)));
    println!("{}", result.export_text());
    if let Some(translation) = &result.translation {
        println!("{}", bold("Translation:"));
        println!("{translation}");
    }
}

/// Write `report.md` and `diagram.svg` into `dir`, creating it if needed.
fn write_outputs(dir: &PathBuf, result: &AnalysisResult, svg: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let mut report = String::new();
    report.push_str(&format!("# {}\n\n", result.title));
    report.push_str(&format!("*Detected language: {}*\n\n", result.original_language));
    report.push_str(&format!("## Summary\n\n{}\n\n", result.summary));
    report.push_str("## Key Takeaways\n\n");
    for point in &result.key_points {
        report.push_str(&format!("- {point}\n"));
    }
    report.push_str("\n## Concept Map\n\n![Concept map](diagram.svg)\n");
    if let Some(translation) = &result.translation {
        report.push_str(&format!("\n## Translation\n\n{translation}\n"));
    }

    let report_path = dir.join("report.md");
    std::fs::write(&report_path, report)
        .with_context(|| format!("writing {}", report_path.display()))?;

    let svg_path = dir.join("diagram.svg");
    std::fs::write(&svg_path, svg)
        .with_context(|| format!("writing {}", svg_path.display()))?;
    Ok(())
}
