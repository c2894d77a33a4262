pub mod analytics;
pub mod config;
pub mod errors;
pub mod goals;
pub mod ledger;
pub mod models;
pub mod rates;
pub mod server;
pub mod storage;
#[cfg(test)]
pub mod test_helpers;
pub mod tracker;
