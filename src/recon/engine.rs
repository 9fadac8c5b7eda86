use std::sync::Arc;

use anyhow::{Context, Result};
use rbatis::rbdc::DateTime;
use rbatis::RBatis;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::app_config::db;
use crate::app_config::settings::ProducerConfig;
use crate::recon::bank::dto::InquiryStatusRequest;
use crate::recon::bank::{is_success_status, BankApi};
use crate::recon::model::candidate::ReconCandidate;
use crate::recon::model::fund_transfer::{self, FundTransferTransactionModel};
use crate::recon::model::unmatched_detail::{
    BankUnmatchedDetailEntity, UnmatchedDetailModel, REASON_ERR, REASON_REVERT, REASON_SUCCESS,
};
use crate::recon::outlet::MessageOutlet;
use crate::recon::payment::PaymentMessage;
use crate::time_util;

/// 每个候选进入状态机一次：NEW -> {FINALIZED, REVERTED, ERRORED} 终态。
/// 先做纯分类，需要银行侧状态的再发查询。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 银行没收到、内部已有结果：本地已自行了结，不需要终态动作
    LocallyResolved,
    /// 银行没收到、内部也没结果：冲正
    Revert,
    /// 银行收到了、内部没结果：去银行查终态
    Inquire,
    /// 两边都有结果：已对平
    AlreadySettled,
}

/// 分类规则：先看银行侧有没有回传，再看内部结果存不存在
pub fn decide(c: &ReconCandidate) -> Decision {
    if !c.has_partner_id() {
        if c.has_internal_result() {
            Decision::LocallyResolved
        } else {
            Decision::Revert
        }
    } else if !c.has_internal_result() {
        Decision::Inquire
    } else {
        Decision::AlreadySettled
    }
}

/// 单个候选的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 无需动作，只记 SUCCESS 审计行
    Settled,
    /// 银行侧终态成功：发正常结清事件
    Finalized { bank_status: String },
    /// 冲正：补偿写 + 冲正事件
    Revert { bank_status: String },
    /// 查询失败或无 token：记 err，留给人工或下一个 run
    Errored,
}

/// 对一个候选求终态。token 缺失时依赖查询的候选直接 Errored。
pub async fn resolve(
    bank: &dyn BankApi,
    merchant_id: &str,
    candidate: &ReconCandidate,
    access_token: Option<&str>,
) -> Resolution {
    match decide(candidate) {
        Decision::LocallyResolved | Decision::AlreadySettled => Resolution::Settled,
        Decision::Revert => Resolution::Revert {
            bank_status: String::new(),
        },
        Decision::Inquire => {
            let token = match access_token {
                Some(t) => t,
                None => {
                    error!(
                        "no access token, mark candidate err, asp_bank_id: {}",
                        candidate.asp_bank_id
                    );
                    return Resolution::Errored;
                }
            };
            let req = InquiryStatusRequest {
                merchant_id: merchant_id.to_string(),
                request_date_time: time_util::request_date_time(),
                merchant_trans_id: candidate.partner_bank_id.clone(),
                rs_trans_id: candidate.rs_trans_id.clone(),
            };
            match bank.inquire_status(req, token).await {
                Err(e) => {
                    error!("inquiryStatusFundTransferHttp: {:?}", e);
                    Resolution::Errored
                }
                Ok(res) => {
                    if is_success_status(&res.txn_status) {
                        Resolution::Finalized {
                            bank_status: res.txn_status,
                        }
                    } else {
                        Resolution::Revert {
                            bank_status: res.txn_status,
                        }
                    }
                }
            }
        }
    }
}

/// 对账与补偿引擎：对候选集跑状态机，落补偿与审计行，发下游事件
pub struct ReconEngine {
    db: &'static RBatis,
    bank: Arc<dyn BankApi>,
    outlet: Arc<dyn MessageOutlet>,
    producer: ProducerConfig,
    merchant_id: String,
}

impl ReconEngine {
    pub fn new(
        bank: Arc<dyn BankApi>,
        outlet: Arc<dyn MessageOutlet>,
        producer: ProducerConfig,
        merchant_id: String,
    ) -> Self {
        Self {
            db: db::get_db_client(),
            bank,
            outlet,
            producer,
            merchant_id,
        }
    }

    /// 顺序处理整批候选。冲正走独立的每候选事务，其余审计行最后批量落。
    pub async fn process_all(
        &self,
        run_id: i64,
        candidates: &[ReconCandidate],
        access_token: Option<&str>,
    ) -> Result<()> {
        let mut details: Vec<BankUnmatchedDetailEntity> = Vec::new();

        for candidate in candidates {
            let resolution =
                resolve(self.bank.as_ref(), &self.merchant_id, candidate, access_token).await;
            debug!(
                "candidate asp_bank_id: {} resolution: {:?}",
                candidate.asp_bank_id, resolution
            );
            let mut detail = self.detail_template(run_id, candidate);

            match resolution {
                Resolution::Settled => {
                    details.push(detail);
                }
                Resolution::Errored => {
                    detail.reason = REASON_ERR.to_string();
                    details.push(detail);
                }
                Resolution::Finalized { bank_status } => {
                    detail.bank_status = bank_status.clone();
                    detail.reason = bank_status;
                    let event = self.build_event(candidate, false);
                    if let Err(e) = self
                        .outlet
                        .publish(&self.producer.final_topic, &event)
                        .await
                    {
                        error!("Error SendMessage topic: {} {:?}", self.producer.final_topic, e);
                    }
                    details.push(detail);
                }
                Resolution::Revert { bank_status } => {
                    detail.bank_status = bank_status;
                    detail.reason = REASON_REVERT.to_string();
                    // 补偿写失败：已回滚、已记日志，候选留给下一个 run，
                    // 不发冲正事件也不落误导性的审计行
                    if let Err(e) = self.revert_candidate(candidate, &detail).await {
                        error!(
                            "revert failed, candidate left unresolved, asp_bank_id: {} {:?}",
                            candidate.asp_bank_id, e
                        );
                    }
                }
            }
        }

        UnmatchedDetailModel::new().add_batch(&details).await?;
        Ok(())
    }

    /// 冲正：补偿账务行与本候选的审计行在同一个事务里提交，
    /// 提交成功后才发冲正事件
    async fn revert_candidate(
        &self,
        candidate: &ReconCandidate,
        detail: &BankUnmatchedDetailEntity,
    ) -> Result<()> {
        let model = FundTransferTransactionModel::from_raw(&candidate.fund_transfer)?;
        let record = model.to_compensation();

        let tx = self
            .db
            .acquire_begin()
            .await
            .context("unable to begin compensation tx")?;
        // run 超时取消 future 时 guard 被 drop，未提交的事务回滚后才还连接
        let mut tx = tx.defer_async(|mut tx| async move {
            if !tx.done() {
                let _ = tx.rollback().await;
                error!("compensation tx dropped uncommitted, rolled back");
            }
        });

        let write = async {
            fund_transfer::write_compensation(&tx, &record).await?;
            UnmatchedDetailModel::add_on(&tx, detail).await?;
            Ok::<(), anyhow::Error>(())
        }
        .await;

        match write {
            Ok(()) => {
                tx.commit().await.context("commit compensation tx")?;
            }
            Err(e) => {
                if let Err(rb_err) = tx.rollback().await {
                    error!("rollback compensation tx: {}", rb_err);
                }
                return Err(e);
            }
        }

        let event = self.build_event(candidate, true);
        if let Err(e) = self
            .outlet
            .publish(&self.producer.revert_topic, &event)
            .await
        {
            error!("Error SendMessage topic: {} {:?}", self.producer.revert_topic, e);
        }
        info!(
            "revert committed, asp_bank_id: {} transaction_id: {}",
            candidate.asp_bank_id, record.transaction_id
        );
        Ok(())
    }

    fn build_event(&self, candidate: &ReconCandidate, to_revert: bool) -> Value {
        build_event(candidate, to_revert)
    }

    fn detail_template(&self, run_id: i64, candidate: &ReconCandidate) -> BankUnmatchedDetailEntity {
        BankUnmatchedDetailEntity {
            unmatched_header_id: run_id,
            channel_code: candidate.channel_code.clone(),
            transaction_bank_id: candidate.partner_bank_id.clone(),
            bank_status: String::new(),
            asp_status: candidate.internal_status.clone(),
            reason: REASON_SUCCESS.to_string(),
            created_date: DateTime::now(),
        }
    }
}

/// 下游事件：原始支付报文 + 冲正标记 + 随路转账上下文
pub fn build_event(candidate: &ReconCandidate, to_revert: bool) -> Value {
    let mut payment = match PaymentMessage::from_raw(&candidate.payment) {
        Ok(p) => p,
        Err(e) => {
            error!("Map payment: {}", e);
            PaymentMessage::default()
        }
    };
    payment.to_revert = to_revert;
    payment.fund_transfer_transaction =
        serde_json::from_str::<Value>(&candidate.fund_transfer).unwrap_or(Value::Null);
    serde_json::to_value(&payment).unwrap_or(Value::Null)
}
