use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{info, warn};

use crate::app_config::redis::FUND_TRANSFER_TOKEN_KEY;
use crate::recon::bank::BankApi;

/// token 写回 TTL：比银行声明的有效期提前 5 分钟过期，下限 60 秒
pub fn write_back_ttl_secs(expires_in: &str) -> u64 {
    let expires = expires_in.trim().parse::<u64>().unwrap_or(0);
    expires.saturating_sub(300).max(60)
}

/// 读缓存里的 bearer token。缓存不可用按 miss 处理，不致命。
pub async fn get_token(conn: &mut MultiplexedConnection) -> Option<String> {
    match conn.get::<_, Option<String>>(FUND_TRANSFER_TOKEN_KEY).await {
        Ok(v) => v.filter(|t| !t.is_empty()),
        Err(e) => {
            warn!("redis get token failed, treat as miss: {}", e);
            None
        }
    }
}

/// 写回新 token，失败只记日志（缓存只是共享短路，不是事实来源）
pub async fn put_token(conn: &mut MultiplexedConnection, token: &str, ttl_secs: u64) {
    if let Err(e) = conn
        .set_ex::<_, _, ()>(FUND_TRANSFER_TOKEN_KEY, token, ttl_secs)
        .await
    {
        warn!("redis set token failed: {}", e);
    }
}

/// cache-aside 取 token：miss 时向银行认证并写回。
/// 认证失败返回 None，引擎以无 token 方式继续，依赖查询的候选记 err。
pub async fn ensure_token(
    conn: Option<&mut MultiplexedConnection>,
    bank: &dyn BankApi,
) -> Option<String> {
    if let Some(conn) = conn {
        if let Some(token) = get_token(conn).await {
            info!("fund transfer token cache hit");
            return Some(token);
        }
        match bank.authenticate().await {
            Ok(res) => {
                let ttl = write_back_ttl_secs(&res.expires_in);
                put_token(conn, &res.access_token, ttl).await;
                Some(res.access_token)
            }
            Err(e) => {
                tracing::error!("callOauthFundTransferHttp: {:?}", e);
                None
            }
        }
    } else {
        // 无缓存可用时直接认证
        match bank.authenticate().await {
            Ok(res) => Some(res.access_token),
            Err(e) => {
                tracing::error!("callOauthFundTransferHttp: {:?}", e);
                None
            }
        }
    }
}
