use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use reconcile_batch::app_config::settings::{BankConfig, ToggleConfig};
use reconcile_batch::recon::bank::dto::InquiryStatusRequest;
use reconcile_batch::recon::bank::{BankApi, BankClient};

fn unreachable_config(retry_max: u32) -> BankConfig {
    BankConfig {
        // 端口 1 直接拒连，传输错误立即返回
        oauth_url: "http://127.0.0.1:1/oauth/token".to_string(),
        fund_transfer_url: "http://127.0.0.1:1/fundtransfer".to_string(),
        inquiry_status_url: "http://127.0.0.1:1/inqtxnstatus".to_string(),
        merchant_id: "ARRT".to_string(),
        auth: "dGVzdDp0ZXN0".to_string(),
        retry_max,
        retry_wait: Duration::from_millis(0),
        http_timeout: Duration::from_secs(2),
        toggle: ToggleConfig::default(),
    }
}

/// 本地桩：按连接序号回放固定 JSON body，超出脚本后重复最后一条，
/// 返回 base url 和已接受的连接计数
async fn spawn_stub(bodies: Vec<&'static str>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(v) => v,
                Err(_) => return,
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let body = *bodies.get(n).unwrap_or_else(|| bodies.last().unwrap());

            // 读到请求头结束即可，不解析
            let mut buf = vec![0u8; 4096];
            let mut seen = Vec::new();
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(read) => {
                        seen.extend_from_slice(&buf[..read]);
                        if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    (format!("http://{}", addr), hits)
}

fn inquiry_request() -> InquiryStatusRequest {
    InquiryStatusRequest {
        merchant_id: "ARRT".to_string(),
        request_date_time: "2026-08-29T00:00:00+07:00".to_string(),
        merchant_trans_id: "B2".to_string(),
        rs_trans_id: "RS9".to_string(),
    }
}

#[tokio::test]
async fn test_authenticate_terminates_within_retry_budget() {
    let client = BankClient::new(unreachable_config(3)).unwrap();
    let start = Instant::now();
    let res = client.authenticate().await;
    // 全失败的传输：预算内终止并返回显式错误，而不是 nil 结果
    assert!(res.is_err());
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_inquire_status_terminates_within_retry_budget() {
    let client = BankClient::new(unreachable_config(3)).unwrap();
    let res = client.inquire_status(inquiry_request(), "T").await;
    assert!(res.is_err());
}

#[tokio::test]
async fn test_inquire_status_retries_past_non_terminal_status() {
    // 第一次回 In Process（非终态），第二次回 Success：第二次就该拿到终态
    let (base, hits) = spawn_stub(vec![
        r#"{"txnStatus":"In Process"}"#,
        r#"{"txnStatus":"Success"}"#,
    ])
    .await;
    let mut cfg = unreachable_config(3);
    cfg.inquiry_status_url = format!("{}/inqtxnstatus", base);
    let client = BankClient::new(cfg).unwrap();

    let res = client.inquire_status(inquiry_request(), "T").await.unwrap();
    assert_eq!(res.txn_status, "Success");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_inquire_status_exhausts_budget_on_persistent_non_terminal() {
    // 一直 In Process：恰好 retry_max 次请求后返回显式错误
    let (base, hits) = spawn_stub(vec![r#"{"txnStatus":"In Process"}"#]).await;
    let mut cfg = unreachable_config(3);
    cfg.inquiry_status_url = format!("{}/inqtxnstatus", base);
    let client = BankClient::new(cfg).unwrap();

    let res = client.inquire_status(inquiry_request(), "T").await;
    assert!(res.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_budget_of_one_attempts_once() {
    let client = BankClient::new(unreachable_config(1)).unwrap();
    let start = Instant::now();
    assert!(client.authenticate().await.is_err());
    // 预算 1 不会 sleep 等下一轮
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_toggle_p_bypasses_network() {
    let mut cfg = unreachable_config(3);
    cfg.toggle = ToggleConfig {
        is_test: true,
        case: "P".to_string(),
    };
    let client = BankClient::new(cfg).unwrap();

    let token = client.authenticate().await.unwrap();
    assert_eq!(token.status, "approved");
    assert!(!token.access_token.is_empty());

    let req = InquiryStatusRequest::default();
    let inquiry = client.inquire_status(req, "T").await.unwrap();
    assert_eq!(inquiry.txn_status, "Success");
}

#[tokio::test]
async fn test_toggle_f_short_circuits_to_failure() {
    let mut cfg = unreachable_config(3);
    cfg.toggle = ToggleConfig {
        is_test: true,
        case: "F".to_string(),
    };
    let client = BankClient::new(cfg).unwrap();
    assert!(client.authenticate().await.is_err());
    assert!(client
        .inquire_status(InquiryStatusRequest::default(), "T")
        .await
        .is_err());
}
