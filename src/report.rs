use std::fmt::{self, Write};

use crate::stats::{NetworkReport, TransactionStats};

/// Renders the report as console text. Transaction sections are left out
/// entirely when no transactions were collected.
pub fn render(report: &NetworkReport) -> String {
    report.to_string()
}

impl fmt::Display for NetworkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(f, self)
    }
}

fn write_report(out: &mut impl Write, report: &NetworkReport) -> fmt::Result {
    let volume = &report.volume;
    writeln!(out, "== Transaction Volume ==")?;
    writeln!(out, "  Blocks analyzed:        {}", volume.blocks_analyzed)?;
    writeln!(out, "  Total transactions:     {}", volume.total_transactions)?;
    writeln!(out, "  Avg txs per block:      {:.2}", volume.avg_per_block)?;

    let block_time = &report.block_time;
    writeln!(out)?;
    writeln!(out, "== Block Time ==")?;
    writeln!(out, "  Blocks:                 {}", block_time.total_blocks)?;
    writeln!(out, "  Average:                {:.2}s", block_time.avg)?;
    writeln!(out, "  Min:                    {}s", block_time.min)?;
    writeln!(out, "  Max:                    {}s", block_time.max)?;

    if let Some(txs) = &report.transactions {
        write_transaction_sections(out, txs)?;
    }

    if !report.skipped_blocks.is_empty() {
        let skipped: Vec<String> = report.skipped_blocks.iter().map(u64::to_string).collect();
        writeln!(out)?;
        writeln!(
            out,
            "Transactions unavailable for {} block(s): {}",
            skipped.len(),
            skipped.join(", ")
        )?;
    }

    Ok(())
}

fn write_transaction_sections(out: &mut impl Write, txs: &TransactionStats) -> fmt::Result {
    let gas = &txs.gas_price;
    writeln!(out)?;
    writeln!(out, "== Gas Price (gwei) ==")?;
    writeln!(out, "  Transactions:           {}", gas.total_transactions)?;
    writeln!(out, "  Min:                    {:.4}", gas.min)?;
    writeln!(out, "  Average:                {:.4}", gas.avg)?;
    writeln!(out, "  Max:                    {:.4}", gas.max)?;

    let value = &txs.value;
    writeln!(out)?;
    writeln!(out, "== Transaction Value (ETH) ==")?;
    writeln!(out, "  Transactions:           {}", value.total_transactions)?;
    writeln!(out, "  Total:                  {:.6}", value.total)?;
    writeln!(out, "  Min:                    {:.6}", value.min)?;
    writeln!(out, "  Average:                {:.6}", value.avg)?;
    writeln!(out, "  Max:                    {:.6}", value.max)?;

    let addresses = &txs.addresses;
    writeln!(out)?;
    writeln!(out, "== Active Addresses ==")?;
    writeln!(out, "  Unique senders:         {}", addresses.unique_senders)?;
    writeln!(out, "  Unique receivers:       {}", addresses.unique_receivers)?;
    writeln!(out, "  Unique addresses:       {}", addresses.unique_addresses)?;

    let deployments = &txs.deployments;
    writeln!(out)?;
    writeln!(out, "== Contract Deployments ==")?;
    writeln!(out, "  Deployments:            {}", deployments.total_deployments)?;
    writeln!(out, "  Share of transactions:  {:.2}%", deployments.deployment_percentage)?;

    writeln!(out)?;
    writeln!(out, "== Top Addresses ==")?;
    for (rank, entry) in txs.top_addresses.iter().enumerate() {
        writeln!(out, "  {:>2}. {}  {} txs", rank + 1, entry.address, entry.count)?;
    }

    Ok(())
}
