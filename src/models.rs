use serde::Serialize;

/// One mined block, as translated from the explorer API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub hash: String,
    pub number: u64,
    /// Unix seconds.
    pub timestamp: i64,
    pub transaction_count: u64,
}

/// One transaction included in some block.
///
/// `from` is empty when the sender is unknown. `to` is `None` (or empty)
/// for contract-creation transactions. `value` and `gas_price` are decimal
/// base-unit strings and may be malformed; see [`crate::units`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    pub value: String,
    pub gas_price: String,
    /// Unix seconds.
    pub timestamp: i64,
}

impl Transaction {
    pub fn is_deployment(&self) -> bool {
        self.to.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionVolume {
    pub total_transactions: u64,
    pub blocks_analyzed: usize,
    pub avg_per_block: f64,
}

/// Gas prices in gwei.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GasPriceStats {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    pub total_transactions: usize,
}

/// Transferred value in ether.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueStats {
    pub total: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub total_transactions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressActivity {
    pub unique_senders: usize,
    pub unique_receivers: usize,
    pub unique_addresses: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContractDeployments {
    pub total_deployments: usize,
    pub deployment_percentage: f64,
}

/// Seconds between consecutive blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockTimeStats {
    pub avg: f64,
    pub min: i64,
    pub max: i64,
    pub total_blocks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopAddress {
    pub address: String,
    pub count: u64,
}
