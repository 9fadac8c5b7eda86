extern crate rbatis;

use anyhow::Result;
use rbatis::executor::Executor;
use rbatis::rbdc::DateTime;
use rbatis::RBatis;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_config::db;

pub const REASON_SUCCESS: &str = "SUCCESS";
pub const REASON_REVERT: &str = "REVERT";
pub const REASON_ERR: &str = "err";

/// 对账结果明细（审计行）：每个处理过的候选一行，追加写，
/// 通过 unmatched_header_id 锚定到所属 run
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub struct BankUnmatchedDetailEntity {
    pub unmatched_header_id: i64,
    pub channel_code: String,
    pub transaction_bank_id: String,
    pub bank_status: String,
    pub asp_status: String,
    pub reason: String,
    pub created_date: DateTime,
}

crud!(BankUnmatchedDetailEntity {}, "tbl_bank_unmatched_detail");

pub struct UnmatchedDetailModel {
    db: &'static RBatis,
}

impl UnmatchedDetailModel {
    pub fn new() -> Self {
        Self {
            db: db::get_db_client(),
        }
    }

    /// run 收尾时一次性批量落审计行
    pub async fn add_batch(&self, details: &[BankUnmatchedDetailEntity]) -> Result<u64> {
        if details.is_empty() {
            return Ok(0);
        }
        let data =
            BankUnmatchedDetailEntity::insert_batch(self.db, details, details.len() as u64).await?;
        info!("unmatched detail rows insert: {}", data.rows_affected);
        Ok(data.rows_affected)
    }

    /// 冲正候选的审计行在补偿事务里单独落，与补偿写同生共死
    pub async fn add_on(
        executor: &dyn Executor,
        detail: &BankUnmatchedDetailEntity,
    ) -> Result<u64> {
        let data = BankUnmatchedDetailEntity::insert(executor, detail).await?;
        Ok(data.rows_affected)
    }
}
