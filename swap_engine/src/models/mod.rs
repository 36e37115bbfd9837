pub mod intent;
pub mod trade;
