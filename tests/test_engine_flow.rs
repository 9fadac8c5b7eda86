use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use reconcile_batch::recon::bank::dto::{
    AccessTokenResponse, FundTransferRequest, FundTransferResponse, InquiryStatusRequest,
    InquiryStatusResponse,
};
use reconcile_batch::recon::bank::BankApi;
use reconcile_batch::recon::engine::{build_event, resolve, Resolution};
use reconcile_batch::recon::model::candidate::ReconCandidate;

/// 可编程的银行 mock：固定查询结果，记录调用次数
struct MockBank {
    inquiry_result: Mutex<Option<Result<InquiryStatusResponse>>>,
    inquiry_calls: AtomicUsize,
    auth_calls: AtomicUsize,
}

impl MockBank {
    fn with_inquiry_status(status: &str) -> Self {
        Self {
            inquiry_result: Mutex::new(Some(Ok(InquiryStatusResponse {
                txn_status: status.to_string(),
                ..Default::default()
            }))),
            inquiry_calls: AtomicUsize::new(0),
            auth_calls: AtomicUsize::new(0),
        }
    }

    fn with_inquiry_failure() -> Self {
        Self {
            inquiry_result: Mutex::new(Some(Err(anyhow!("inquiry down")))),
            inquiry_calls: AtomicUsize::new(0),
            auth_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BankApi for MockBank {
    async fn authenticate(&self) -> Result<AccessTokenResponse> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessTokenResponse {
            access_token: "T".to_string(),
            status: "approved".to_string(),
            expires_in: "1799".to_string(),
            ..Default::default()
        })
    }

    async fn inquire_status(
        &self,
        _req: InquiryStatusRequest,
        _access_token: &str,
    ) -> Result<InquiryStatusResponse> {
        self.inquiry_calls.fetch_add(1, Ordering::SeqCst);
        self.inquiry_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(anyhow!("inquiry result consumed")))
    }

    async fn fund_transfer(
        &self,
        _req: FundTransferRequest,
        _access_token: &str,
    ) -> Result<FundTransferResponse> {
        Ok(FundTransferResponse::default())
    }
}

fn candidate(internal_result_id: i64, partner_bank_id: &str) -> ReconCandidate {
    ReconCandidate {
        internal_result_id,
        asp_bank_id: "A1".to_string(),
        partner_bank_id: partner_bank_id.to_string(),
        internal_status: "PENDING".to_string(),
        channel_code: "CH01".to_string(),
        rs_trans_id: "RS9".to_string(),
        payment: r#"{"TransactionId":1,"ChannelCode":"CH01"}"#.to_string(),
        fund_transfer: r#"{"channelCode":"CH01","transactionId":"1","amount":"1.99"}"#.to_string(),
    }
}

#[tokio::test]
async fn test_revert_without_partner_id() {
    let bank = MockBank::with_inquiry_status("Success");
    let res = resolve(&bank, "ARRT", &candidate(-1, ""), Some("T")).await;
    assert_eq!(
        res,
        Resolution::Revert {
            bank_status: String::new()
        }
    );
    // 不需要银行查询
    assert_eq!(bank.inquiry_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_finalized_on_terminal_success() {
    let bank = MockBank::with_inquiry_status("Success");
    let res = resolve(&bank, "ARRT", &candidate(-1, "B2"), Some("T")).await;
    assert_eq!(
        res,
        Resolution::Finalized {
            bank_status: "Success".to_string()
        }
    );
    assert_eq!(bank.inquiry_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_revert_on_terminal_failure_status() {
    let bank = MockBank::with_inquiry_status("Rejected");
    let res = resolve(&bank, "ARRT", &candidate(-1, "B2"), Some("T")).await;
    assert_eq!(
        res,
        Resolution::Revert {
            bank_status: "Rejected".to_string()
        }
    );
}

#[tokio::test]
async fn test_errored_on_inquiry_failure() {
    let bank = MockBank::with_inquiry_failure();
    let res = resolve(&bank, "ARRT", &candidate(-1, "B2"), Some("T")).await;
    assert_eq!(res, Resolution::Errored);
}

#[tokio::test]
async fn test_errored_without_token() {
    // 认证失败整批无 token：依赖查询的候选记 err，不发查询
    let bank = MockBank::with_inquiry_status("Success");
    let res = resolve(&bank, "ARRT", &candidate(-1, "B2"), None).await;
    assert_eq!(res, Resolution::Errored);
    assert_eq!(bank.inquiry_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_settled_both_sides() {
    let bank = MockBank::with_inquiry_status("Success");
    let res = resolve(&bank, "ARRT", &candidate(5, "B3"), Some("T")).await;
    assert_eq!(res, Resolution::Settled);
    assert_eq!(bank.inquiry_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_revert_event_carries_reversal_flag() {
    let c = candidate(-1, "");
    let event = build_event(&c, true);
    assert_eq!(event["ToRevert"], true);
    // 原始支付字段与转账上下文随路透传
    assert_eq!(event["ChannelCode"], "CH01");
    assert_eq!(event["FundTransferTransaction"]["channelCode"], "CH01");
}

#[test]
fn test_final_event_is_unflagged() {
    let c = candidate(-1, "B2");
    let event = build_event(&c, false);
    assert_eq!(event["ToRevert"], false);
}

#[tokio::test]
async fn test_locally_resolved_without_partner_id() {
    let bank = MockBank::with_inquiry_status("Success");
    let res = resolve(&bank, "ARRT", &candidate(5, ""), Some("T")).await;
    assert_eq!(res, Resolution::Settled);
}
