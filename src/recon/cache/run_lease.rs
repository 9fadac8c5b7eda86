use redis::aio::MultiplexedConnection;
use tracing::warn;

use crate::app_config::redis::run_lease_key;
use crate::error::AppError;

/// 以 SET NX EX 占一把按业务日期划分的 run 锁，防止两次重叠调度
/// 同时对同一批候选各开一个 PENDING run。
pub async fn acquire(
    conn: &mut MultiplexedConnection,
    business_date: &str,
    ttl_secs: u64,
) -> Result<bool, AppError> {
    let key = run_lease_key(business_date);
    let res: Option<String> = redis::cmd("SET")
        .arg(&key)
        .arg("LOCKED")
        .arg("NX")
        .arg("EX")
        .arg(ttl_secs)
        .query_async(conn)
        .await?;
    Ok(res.is_some())
}

/// 把占锁结果折叠成放行判定：命令自身出错按缓存不可用降级，
/// run 无保护继续；只有明确被占才挡下
pub fn admits(outcome: Result<bool, AppError>) -> bool {
    match outcome {
        Ok(acquired) => acquired,
        Err(e) => {
            warn!("run lease command failed, continue unguarded: {}", e);
            true
        }
    }
}

/// run 收尾后释放锁；失败只记日志，TTL 会兜底
pub async fn release(conn: &mut MultiplexedConnection, business_date: &str) {
    let key = run_lease_key(business_date);
    if let Err(e) = redis::cmd("DEL").arg(&key).query_async::<_, ()>(conn).await {
        warn!("release run lease failed: {}", e);
    }
}
