pub mod cli;
pub mod collector;
pub mod config;
pub mod explorer;
pub mod models;
pub mod report;
pub mod retry;
pub mod stats;
pub mod units;
