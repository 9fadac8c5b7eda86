pub mod run_lease;
pub mod token_cache;
