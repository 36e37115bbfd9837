pub mod approval;
pub mod chain;
pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod quote;
pub mod settlement;
#[cfg(test)]
pub mod tests;
pub mod trading;
