use clap::Parser;

use crate::stats::DEFAULT_TOP_ADDRESSES;

#[derive(Parser, Debug)]
#[command(name = "chain-pulse", version, about = "Block explorer network statistics")]
pub struct Cli {
    /// Number of recent blocks to analyze (overrides BLOCK_COUNT)
    #[arg(long)]
    pub blocks: Option<usize>,
    /// How many of the most active addresses to list
    #[arg(long, default_value_t = DEFAULT_TOP_ADDRESSES)]
    pub top: usize,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}
