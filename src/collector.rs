use crate::explorer::{ExplorerClient, ExplorerError};
use crate::models::{Block, Transaction};
use crate::retry::{retry, RetryPolicy};

#[derive(Debug, Clone)]
pub struct CollectSettings {
    pub block_count: usize,
    pub tx_page_size: usize,
    pub retry: RetryPolicy,
}

#[derive(Debug, Default)]
pub struct Collection {
    pub blocks: Vec<Block>,
    pub transactions: Vec<Transaction>,
    /// Blocks whose transactions could not be fetched.
    pub skipped_blocks: Vec<u64>,
}

/// Fetches the recent block list, then each block's transactions one block
/// at a time.
///
/// Failing to fetch the block list is an error. A block whose transactions
/// cannot be fetched after retries is logged, recorded in
/// [`Collection::skipped_blocks`] and left out.
pub async fn collect(
    client: &ExplorerClient,
    settings: &CollectSettings,
) -> Result<Collection, ExplorerError> {
    let blocks = retry(&settings.retry, || client.list_recent_blocks(settings.block_count)).await?;
    tracing::info!(blocks = blocks.len(), "fetched recent blocks");

    let mut transactions = Vec::new();
    let mut skipped_blocks = Vec::new();

    for block in &blocks {
        if block.transaction_count == 0 {
            continue;
        }

        let fetched = retry(&settings.retry, || {
            client.get_transactions_for_block(block.number, settings.tx_page_size)
        })
        .await;

        match fetched {
            Ok(txs) => {
                tracing::debug!(block = block.number, txs = txs.len(), "fetched block transactions");
                transactions.extend(txs);
            }
            Err(err) => {
                tracing::warn!(block = block.number, error = %err, "skipping block transactions");
                skipped_blocks.push(block.number);
            }
        }
    }

    tracing::info!(
        transactions = transactions.len(),
        skipped = skipped_blocks.len(),
        "finished collecting transactions"
    );

    Ok(Collection {
        blocks,
        transactions,
        skipped_blocks,
    })
}
