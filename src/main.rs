//! One-shot runner: fetch every configured source once and print the
//! aggregated list as JSON on stdout. Logs go to stderr.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trend_aggregator::config::load_config_default;
use trend_aggregator::Aggregator;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trend_aggregator=info,warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = load_config_default()?;
    let aggregator = Aggregator::from_config(&cfg)?;
    tracing::info!(
        sources = aggregator.source_count(),
        target = aggregator.target_count(),
        blocklist_keywords = cfg.blocklist.keyword_count(),
        "starting aggregation cycle"
    );

    let report = aggregator.run().await;
    for failure in &report.config_errors {
        tracing::error!(source = %failure.source, error = %failure.error, "source skipped");
    }

    println!("{}", serde_json::to_string_pretty(&report.items)?);
    Ok(())
}
