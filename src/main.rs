use anyhow::Context;
use clap::Parser;

use chain_pulse::cli::Cli;
use chain_pulse::collector::{self, CollectSettings};
use chain_pulse::config::Config;
use chain_pulse::explorer::{ExplorerClient, ExplorerError};
use chain_pulse::report;
use chain_pulse::stats::NetworkReport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    let client =
        ExplorerClient::new(&config.explorer_api_url).context("failed to build explorer client")?;

    let settings = CollectSettings {
        block_count: cli.blocks.unwrap_or(config.block_count),
        tx_page_size: config.tx_page_size,
        retry: config.retry,
    };
    tracing::info!(
        url = %config.explorer_api_url,
        blocks = settings.block_count,
        "collecting network statistics"
    );

    let collection = match collector::collect(&client, &settings).await {
        Ok(collection) => collection,
        Err(err) => {
            eprintln!("{}", fatal_message(&err));
            std::process::exit(1);
        }
    };

    let report = NetworkReport::build(&collection.blocks, &collection.transactions, cli.top)
        .with_skipped_blocks(collection.skipped_blocks);

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{json}");
    } else {
        print!("{}", report::render(&report));
    }

    Ok(())
}

fn fatal_message(err: &ExplorerError) -> String {
    if err.is_rate_limited() {
        "The block explorer is rate limiting requests. Wait a minute and try again, or lower BLOCK_COUNT.".to_string()
    } else {
        format!("Could not fetch recent blocks from the block explorer: {err}")
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
