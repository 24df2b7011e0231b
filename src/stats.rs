//! Pure reductions over fetched blocks and transactions.
//!
//! Amounts are summed and compared as exact [`BigUint`] base units and only
//! converted to floating-point display units once, at the end.

use std::collections::{HashMap, HashSet};

use num_bigint::BigUint;
use num_traits::Zero;
use serde::Serialize;

use crate::models::{
    AddressActivity, Block, BlockTimeStats, ContractDeployments, GasPriceStats, TopAddress,
    Transaction, TransactionVolume, ValueStats,
};
use crate::units::{parse_base_units, to_display_units, ETHER_DECIMALS, GWEI_DECIMALS};

pub const DEFAULT_TOP_ADDRESSES: usize = 5;

pub fn transaction_volume(blocks: &[Block]) -> TransactionVolume {
    let total_transactions = blocks
        .iter()
        .map(|b| b.transaction_count)
        .fold(0u64, u64::saturating_add);
    let blocks_analyzed = blocks.len();
    let avg_per_block = if blocks_analyzed > 0 {
        total_transactions as f64 / blocks_analyzed as f64
    } else {
        0.0
    };

    TransactionVolume {
        total_transactions,
        blocks_analyzed,
        avg_per_block,
    }
}

pub fn gas_price_stats(txs: &[Transaction]) -> GasPriceStats {
    let Some(summary) = PositiveAmounts::collect(txs.iter().map(|tx| tx.gas_price.as_str())) else {
        return GasPriceStats {
            total_transactions: txs.len(),
            ..GasPriceStats::default()
        };
    };

    GasPriceStats {
        min: to_display_units(&summary.min, GWEI_DECIMALS),
        avg: to_display_units(&summary.average(), GWEI_DECIMALS),
        max: to_display_units(&summary.max, GWEI_DECIMALS),
        total_transactions: txs.len(),
    }
}

pub fn transaction_value_stats(txs: &[Transaction]) -> ValueStats {
    let Some(summary) = PositiveAmounts::collect(txs.iter().map(|tx| tx.value.as_str())) else {
        return ValueStats {
            total_transactions: txs.len(),
            ..ValueStats::default()
        };
    };

    ValueStats {
        total: to_display_units(&summary.sum, ETHER_DECIMALS),
        avg: to_display_units(&summary.average(), ETHER_DECIMALS),
        min: to_display_units(&summary.min, ETHER_DECIMALS),
        max: to_display_units(&summary.max, ETHER_DECIMALS),
        total_transactions: txs.len(),
    }
}

pub fn active_addresses(txs: &[Transaction]) -> AddressActivity {
    let mut senders = HashSet::new();
    let mut receivers = HashSet::new();

    for tx in txs {
        if let Some(from) = normalize_address(&tx.from) {
            senders.insert(from);
        }
        if let Some(to) = tx.to.as_deref().and_then(normalize_address) {
            receivers.insert(to);
        }
    }

    let unique_addresses = senders.union(&receivers).count();
    AddressActivity {
        unique_senders: senders.len(),
        unique_receivers: receivers.len(),
        unique_addresses,
    }
}

pub fn contract_deployments(txs: &[Transaction]) -> ContractDeployments {
    let total_deployments = txs.iter().filter(|tx| tx.is_deployment()).count();
    let deployment_percentage = if txs.is_empty() {
        0.0
    } else {
        100.0 * total_deployments as f64 / txs.len() as f64
    };

    ContractDeployments {
        total_deployments,
        deployment_percentage,
    }
}

/// Intervals between consecutive blocks ordered by height. Out-of-order
/// timestamps yield zero or negative intervals, which are kept as-is.
/// Arithmetic saturates instead of overflowing on absurd timestamps.
pub fn block_time_stats(blocks: &[Block]) -> BlockTimeStats {
    if blocks.len() < 2 {
        return BlockTimeStats {
            total_blocks: blocks.len(),
            ..BlockTimeStats::default()
        };
    }

    let mut ordered: Vec<&Block> = blocks.iter().collect();
    ordered.sort_by_key(|b| b.number);

    let deltas: Vec<i64> = ordered
        .windows(2)
        .map(|pair| pair[1].timestamp.saturating_sub(pair[0].timestamp))
        .collect();

    let sum = deltas.iter().copied().fold(0i64, i64::saturating_add);
    BlockTimeStats {
        avg: sum as f64 / deltas.len() as f64,
        min: deltas.iter().copied().min().unwrap_or_default(),
        max: deltas.iter().copied().max().unwrap_or_default(),
        total_blocks: blocks.len(),
    }
}

/// Most frequent participants, counting both sides of every transaction.
/// Equal counts keep the order in which addresses were first seen.
pub fn top_addresses(txs: &[Transaction], limit: usize) -> Vec<TopAddress> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<TopAddress> = Vec::new();

    let mut bump = |address: String| match index.get(&address) {
        Some(&slot) => counts[slot].count += 1,
        None => {
            index.insert(address.clone(), counts.len());
            counts.push(TopAddress { address, count: 1 });
        }
    };

    for tx in txs {
        if let Some(from) = normalize_address(&tx.from) {
            bump(from);
        }
        if let Some(to) = tx.to.as_deref().and_then(normalize_address) {
            bump(to);
        }
    }

    // `sort_by` is stable, so ties stay in first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

fn normalize_address(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_lowercase())
    }
}

/// Exact reduction over the strictly positive amounts of a batch.
struct PositiveAmounts {
    sum: BigUint,
    min: BigUint,
    max: BigUint,
    count: usize,
}

impl PositiveAmounts {
    fn collect<'a>(raw: impl Iterator<Item = &'a str>) -> Option<Self> {
        let mut acc: Option<Self> = None;

        for amount in raw.map(parse_base_units).filter(|v| !v.is_zero()) {
            match acc.as_mut() {
                None => {
                    acc = Some(Self {
                        sum: amount.clone(),
                        min: amount.clone(),
                        max: amount,
                        count: 1,
                    });
                }
                Some(s) => {
                    s.sum += &amount;
                    s.count += 1;
                    if amount < s.min {
                        s.min = amount;
                    } else if amount > s.max {
                        s.max = amount;
                    }
                }
            }
        }

        acc
    }

    /// Truncating integer division.
    fn average(&self) -> BigUint {
        &self.sum / BigUint::from(self.count)
    }
}

/// Transaction-dependent statistic groups. Only present when at least one
/// transaction was collected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionStats {
    pub gas_price: GasPriceStats,
    pub value: ValueStats,
    pub addresses: AddressActivity,
    pub deployments: ContractDeployments,
    pub top_addresses: Vec<TopAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkReport {
    pub volume: TransactionVolume,
    pub block_time: BlockTimeStats,
    pub transactions: Option<TransactionStats>,
    pub transactions_collected: usize,
    pub skipped_blocks: Vec<u64>,
}

impl NetworkReport {
    pub fn build(blocks: &[Block], txs: &[Transaction], top_limit: usize) -> Self {
        let transactions = (!txs.is_empty()).then(|| TransactionStats {
            gas_price: gas_price_stats(txs),
            value: transaction_value_stats(txs),
            addresses: active_addresses(txs),
            deployments: contract_deployments(txs),
            top_addresses: top_addresses(txs, top_limit),
        });

        Self {
            volume: transaction_volume(blocks),
            block_time: block_time_stats(blocks),
            transactions,
            transactions_collected: txs.len(),
            skipped_blocks: Vec::new(),
        }
    }

    pub fn with_skipped_blocks(mut self, skipped: Vec<u64>) -> Self {
        self.skipped_blocks = skipped;
        self
    }
}
