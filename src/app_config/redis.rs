use std::env;

use anyhow::Result;
use redis::aio::MultiplexedConnection;
use redis::Client;

use crate::app_config::env::env_parse_or;

/// Get a Redis multiplexed async connection using REDIS_HOST from env
pub async fn get_redis_connection() -> Result<MultiplexedConnection> {
    let url = env::var("REDIS_HOST").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    let client = Client::open(url)?;
    let conn = client.get_multiplexed_async_connection().await?;
    Ok(conn)
}

/// 银行 OAuth token 的缓存 key（跨 run 共享）
pub const FUND_TRANSFER_TOKEN_KEY: &str = "OAUTHTOKEN:FUNDTRANSFER";

/// Key for the per-business-date run lease
pub fn run_lease_key(business_date: &str) -> String {
    format!("RECONCILE:RUN:LOCK:{}", business_date)
}

/// TTL for the run lease, seconds
pub fn run_lease_ttl_secs() -> u64 {
    env_parse_or::<u64>("RUN_LEASE_TTL_SECS", 3600)
}
