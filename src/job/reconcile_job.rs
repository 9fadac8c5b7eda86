// 日终结算对账批处理任务

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use log::{error, info, warn};
use redis::aio::MultiplexedConnection;

use crate::app_config::redis::{get_redis_connection, run_lease_ttl_secs};
use crate::app_config::settings::{self, ProducerConfig};
use crate::error::AppError;
use crate::recon::bank::BankApi;
use crate::recon::cache::{run_lease, token_cache};
use crate::recon::engine::ReconEngine;
use crate::recon::model::candidate::CandidateModel;
use crate::recon::model::unmatched_header::UnmatchedHeaderModel;
use crate::recon::outlet::MessageOutlet;
use crate::time_util;

/// 对账批：开 run -> 选候选 -> 逐个过状态机 -> 批量落审计行 -> 收 run。
/// 每次调度一个逻辑 run，处理完即退出。
pub struct ReconcileJob {
    bank: Arc<dyn BankApi>,
    outlet: Arc<dyn MessageOutlet>,
    producer: ProducerConfig,
    merchant_id: String,
}

impl ReconcileJob {
    pub fn new(
        bank: Arc<dyn BankApi>,
        outlet: Arc<dyn MessageOutlet>,
        producer: ProducerConfig,
        merchant_id: String,
    ) -> Self {
        Self {
            bank,
            outlet,
            producer,
            merchant_id,
        }
    }

    pub async fn run(&self, as_of: NaiveDate) -> Result<()> {
        let business_date = time_util::compact_date(as_of);

        // redis 不可用不致命：token 走直连认证，run 锁降级为无保护
        let mut redis_conn = match get_redis_connection().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                warn!("redis unavailable, continue without cache: {}", e);
                None
            }
        };

        if let Some(conn) = redis_conn.as_mut() {
            let outcome = run_lease::acquire(conn, &business_date, run_lease_ttl_secs()).await;
            if !run_lease::admits(outcome) {
                return Err(AppError::BizError(format!(
                    "another reconcile run holds the lease for {}",
                    business_date
                ))
                .into());
            }
        }

        let result = self.execute(as_of, redis_conn.as_mut()).await;

        // 成败都释放：失败的 run 不该让锁占满 TTL 挡住人工重跑
        if let Some(conn) = redis_conn.as_mut() {
            run_lease::release(conn, &business_date).await;
        }
        result
    }

    async fn execute(
        &self,
        as_of: NaiveDate,
        redis_conn: Option<&mut MultiplexedConnection>,
    ) -> Result<()> {
        let header_model = UnmatchedHeaderModel::new();
        let run_id = header_model
            .open_run(as_of)
            .await
            .context("Fail InsertUnMatedHeader")?;

        // 候选查询失败在处理任何候选之前中止，run 保持 PENDING
        let candidates = match CandidateModel::new().select_candidates(as_of).await {
            Ok(rs) => rs,
            Err(e) => {
                error!("Fail GetListResult: {:?}", e);
                return Err(e);
            }
        };
        info!("run {} candidates: {}", run_id, candidates.len());

        // 一个 run 取一次 token，整批查询复用
        let access_token = token_cache::ensure_token(redis_conn, self.bank.as_ref()).await;

        let engine = ReconEngine::new(
            Arc::clone(&self.bank),
            Arc::clone(&self.outlet),
            self.producer.clone(),
            self.merchant_id.clone(),
        );
        // run 总时长有上限，超时让 run 保持 PENDING 等下次调度；
        // 补偿写是每候选事务，中断不会留下无审计行的补偿
        tokio::time::timeout(
            settings::run_deadline(),
            engine.process_all(run_id, &candidates, access_token.as_deref()),
        )
        .await
        .map_err(|_| anyhow!("run deadline exceeded, run stays PENDING"))??;

        header_model
            .close_run(run_id)
            .await
            .context("Fail UpdateUnMatedHeader")?;
        info!("run {} closed SUCCESS", run_id);
        Ok(())
    }
}
