extern crate rbatis;

use anyhow::Result;
use chrono::NaiveDate;
use rbatis::rbdc::DateTime;
use rbatis::RBatis;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_config::db;
use crate::time_util;

pub const RUN_STATUS_PENDING: &str = "PENDING";
pub const RUN_STATUS_SUCCESS: &str = "SUCCESS";

/// run 头表：每次调度插入一行 PENDING，跑完置 SUCCESS，不删除
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub struct UnmatchedHeaderEntity {
    pub unmatched_header_id: Option<i64>,
    pub unmatched_date: String,
    pub unmatched_time: String,
    pub status: String,
    pub created_date: DateTime,
}

crud!(UnmatchedHeaderEntity {}, "tbl_bank_unmatched_header");

pub struct UnmatchedHeaderModel {
    db: &'static RBatis,
}

impl UnmatchedHeaderModel {
    pub fn new() -> Self {
        Self {
            db: db::get_db_client(),
        }
    }

    /// 开一个 run：插入 PENDING 头并返回生成的 id
    pub async fn open_run(&self, business_date: NaiveDate) -> Result<i64> {
        let header = UnmatchedHeaderEntity {
            unmatched_header_id: None,
            unmatched_date: time_util::compact_date(business_date),
            unmatched_time: time_util::compact_time_now(),
            status: RUN_STATUS_PENDING.to_string(),
            created_date: DateTime::now(),
        };
        let data = UnmatchedHeaderEntity::insert(self.db, &header).await?;
        let id = data
            .last_insert_id
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("no generated id for unmatched header"))?;
        info!("open run unmatched_header_id: {}", id);
        Ok(id)
    }

    /// 收 run：状态置 SUCCESS。对已 SUCCESS 的行重复执行是幂等的。
    pub async fn close_run(&self, id: i64) -> Result<()> {
        let sql = "update tbl_bank_unmatched_header set status = 'SUCCESS' where unmatched_header_id = ?";
        self.db.exec(sql, vec![id.into()]).await?;
        Ok(())
    }
}
