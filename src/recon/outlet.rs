use anyhow::{anyhow, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::info;

use crate::error::AppError;

/// 下游消息出口。调用方视角是同步 at-least-once：publish 返回即代表
/// 对端已确认，返回 (partition, offset) 供日志定位。
#[async_trait]
pub trait MessageOutlet: Send + Sync {
    async fn publish(&self, topic: &str, event: &serde_json::Value) -> Result<(i32, i64)>;
}

/// 基于 redis stream 的出口实现（XADD，entry id 的毫秒段作为 offset）。
/// 消息总线客户端本体是外部协作方，这里只要求一个可确认的出口。
pub struct RedisStreamOutlet {
    conn: MultiplexedConnection,
}

impl RedisStreamOutlet {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl MessageOutlet for RedisStreamOutlet {
    async fn publish(&self, topic: &str, event: &serde_json::Value) -> Result<(i32, i64)> {
        let payload = serde_json::to_string(event)?;
        let mut conn = self.conn.clone();
        let entry_id: String = redis::cmd("XADD")
            .arg(topic)
            .arg("*")
            .arg("payload")
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::OutletError(e.to_string()))?;

        // entry id 形如 "1718000000000-0"
        let offset = entry_id
            .split('-')
            .next()
            .and_then(|ms| ms.parse::<i64>().ok())
            .ok_or_else(|| anyhow!("unexpected stream entry id: {}", entry_id))?;
        info!("SendMessage Success with topic: {}, Partition: 0, Offset: {}", topic, offset);
        Ok((0, offset))
    }
}
