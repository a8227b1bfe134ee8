use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use phishguard::client::PredictClient;
use phishguard::controller::ScanController;
use phishguard::counter::{CounterStore, FileCounterStore, MemoryCounterStore, ScanCounter};
use phishguard::types::{Presentation, UiEvent};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// phishguard — scan a URL against a phishing-classification service.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "phishguard",
    version,
    about = "Scan a URL against a phishing-classification service and print the verdict.",
    long_about = None
)]
struct Cli {
    /// URL to scan.
    url: String,

    /// Base endpoint of the classification service.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    endpoint: String,

    /// Client-side request timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 15_000)]
    timeout_ms: u64,

    /// File persisting the running scan counter. If omitted, the counter is
    /// kept in memory for this run only.
    #[arg(long)]
    counter_file: Option<PathBuf>,

    /// Write the presentation model as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    println!("phishguard configuration:");
    println!("  endpoint     : {}", cli.endpoint);
    println!("  timeout_ms   : {}", cli.timeout_ms);
    println!(
        "  counter_file : {}",
        cli.counter_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<in-memory>".to_string())
    );

    let store: Arc<dyn CounterStore> = match &cli.counter_file {
        Some(path) => Arc::new(FileCounterStore::new(path.clone())),
        None => Arc::new(MemoryCounterStore::new()),
    };
    let counter = Arc::new(ScanCounter::new(store));

    let client = PredictClient::new(
        cli.endpoint.clone(),
        Some(Duration::from_millis(cli.timeout_ms)),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = ScanController::new(client, counter, tx);
    controller.submit_scan(&cli.url).await;

    let mut total_scans = None;
    while let Some(event) = rx.recv().await {
        match event {
            UiEvent::ShowLoading => {
                println!("\nScanning {} ...", cli.url.trim());
            }
            UiEvent::CounterUpdated(n) => {
                total_scans = Some(n);
            }
            UiEvent::ShowResult(p) => {
                print_result_card(&p, total_scans);
                if let Some(path) = cli.output.as_deref() {
                    if let Err(e) = write_presentation_json(path, &p) {
                        eprintln!("Failed to write JSON to {}: {}", path.display(), e);
                    } else {
                        println!("Wrote JSON presentation to {}", path.display());
                    }
                }
                return Ok(());
            }
            UiEvent::ShowError(p) => {
                println!("\n{}: {}", p.title, p.detail);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_result_card(p: &Presentation, total_scans: Option<u64>) {
    println!("\n{}", p.title);
    println!("  status       : {} ({})", p.detail, p.color_token);
    println!(
        "  confidence   : {:.1}% {} ({})",
        p.confidence_percent,
        p.confidence_tag,
        p.confidence_level.label()
    );
    println!("  url          : {}", p.url);
    println!("  threats      : {} risk factor(s)", p.risk_factors.len());
    for factor in &p.risk_factors {
        println!("    - {}", factor);
    }
    println!("  scanned at   : {}", p.scanned_at);
    if let Some(n) = total_scans {
        println!("  total scans  : {}", n);
    }
    println!("  share        : {}", p.share_text());
}

fn write_presentation_json(path: &std::path::Path, p: &Presentation) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, p)?;
    Ok(())
}
