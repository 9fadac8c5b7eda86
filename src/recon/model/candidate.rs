use anyhow::Result;
use chrono::NaiveDate;
use rbatis::RBatis;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::app_config::db;
use crate::error::AppError;
use crate::time_util;

/// 对账候选：一次 run 内的只读投影，不落库。
/// internal_result_id 为负数表示内部结果还不存在；
/// partner_bank_id 为空表示银行侧没有收到/回传这笔交易。
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct ReconCandidate {
    pub internal_result_id: i64,
    pub asp_bank_id: String,
    pub partner_bank_id: String,
    pub internal_status: String,
    pub channel_code: String,
    pub rs_trans_id: String,
    /// 支付上下文原始 JSON，原样透传到出口
    pub payment: String,
    /// 转账上下文原始 JSON，冲正时才解码
    pub fund_transfer: String,
}

impl ReconCandidate {
    pub fn has_internal_result(&self) -> bool {
        self.internal_result_id >= 0
    }

    pub fn has_partner_id(&self) -> bool {
        !self.partner_bank_id.is_empty()
    }
}

/// 候选查询的两个分支由 run 日期的纯函数决定：
/// 月初第一天要把上个月的分表一起 join 进来（月末入账、今天结算的交易），
/// 内部结果 id 跨两个分表 COALESCE。
pub fn build_candidate_sql(as_of: NaiveDate) -> String {
    let current = time_util::partition_suffix(as_of);
    if time_util::is_first_day_of_month(as_of) {
        let previous = time_util::previous_partition_suffix(as_of);
        format!(
            "select coalesce(ttr.transaction_id, ttr2.transaction_id, -1) as internal_result_id \
             , trb.transaction_bank_id as asp_bank_id \
             , coalesce(tdkr.transaction_bank_id, '') as partner_bank_id \
             , coalesce(ttr.status, ttr2.status, '') as internal_status \
             , coalesce(tt.channel_code, tt2.channel_code, '') as channel_code \
             , coalesce(tdkr.rs_trans_id, '') as rs_trans_id \
             , trb.payment_message_json as payment \
             , trb.fund_transfer_transaction_json as fund_transfer \
             from tbl_reconcile_bank trb \
             left outer join tbl_daily_partner_reconcile tdkr \
             on trb.transaction_bank_id = tdkr.transaction_bank_id \
             left outer join tbl_transaction_{cur} tt \
             on trb.transaction_id = tt.transaction_id \
             left outer join tbl_transaction_result_{cur} ttr \
             on tt.transaction_id = ttr.transaction_id \
             left outer join tbl_transaction_{prev} tt2 \
             on trb.transaction_id = tt2.transaction_id \
             left outer join tbl_transaction_result_{prev} ttr2 \
             on tt2.transaction_id = ttr2.transaction_id \
             where DATE(trb.created_date) = DATE_SUB(?, INTERVAL 1 DAY)",
            cur = current,
            prev = previous,
        )
    } else {
        format!(
            "select coalesce(ttr.transaction_id, -1) as internal_result_id \
             , trb.transaction_bank_id as asp_bank_id \
             , coalesce(tdkr.transaction_bank_id, '') as partner_bank_id \
             , coalesce(ttr.status, '') as internal_status \
             , coalesce(tt.channel_code, '') as channel_code \
             , coalesce(tdkr.rs_trans_id, '') as rs_trans_id \
             , trb.payment_message_json as payment \
             , trb.fund_transfer_transaction_json as fund_transfer \
             from tbl_reconcile_bank trb \
             left outer join tbl_daily_partner_reconcile tdkr \
             on trb.transaction_bank_id = tdkr.transaction_bank_id \
             left outer join tbl_transaction_{cur} tt \
             on trb.transaction_id = tt.transaction_id \
             left outer join tbl_transaction_result_{cur} ttr \
             on tt.transaction_id = ttr.transaction_id \
             where DATE(trb.created_date) = DATE_SUB(?, INTERVAL 1 DAY)",
            cur = current,
        )
    }
}

pub struct CandidateModel {
    db: &'static RBatis,
}

impl CandidateModel {
    pub fn new() -> Self {
        Self {
            db: db::get_db_client(),
        }
    }

    /// 取前一业务日的未决候选集。纯读；查询失败让 run 在处理任何候选之前中止。
    pub async fn select_candidates(&self, as_of: NaiveDate) -> Result<Vec<ReconCandidate>> {
        let sql = build_candidate_sql(as_of);
        let as_of_param = as_of.format("%Y-%m-%d").to_string();
        let results: Vec<ReconCandidate> = self
            .db
            .query_decode(&sql, vec![as_of_param.into()])
            .await
            .map_err(|e| {
                error!("Error executing candidate query: {}", e);
                AppError::DbError(e.to_string())
            })?;
        info!("candidate rows: {}", results.len());
        Ok(results)
    }
}
