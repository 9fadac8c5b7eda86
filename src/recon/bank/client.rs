use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::app_config::settings::BankConfig;
use crate::recon::bank::dto::{
    AccessTokenRequest, AccessTokenResponse, FundTransferRequest, FundTransferResponse,
    InquiryStatusRequest, InquiryStatusResponse,
};
use crate::recon::bank::{is_non_terminal_status, BankApi, OAUTH_SUCCESS, SUCCESS_FUND_TRANSFER};
use crate::time_util;

/// 银行 HTTP 客户端。重试预算与间隔来自配置，循环有界：
/// `for attempt in 1..=retry_max`，每个失败分支都会计入预算。
pub struct BankClient {
    http: Client,
    cfg: BankConfig,
}

impl BankClient {
    pub fn new(cfg: BankConfig) -> Result<Self> {
        let http = Client::builder().timeout(cfg.http_timeout).build()?;
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(BankConfig::from_env()?)
    }

    pub fn config(&self) -> &BankConfig {
        &self.cfg
    }

    /// 一次认证尝试：传输错误、非 2xx、解码失败、body status 非 approved 都算失败
    async fn try_authenticate(&self) -> Result<AccessTokenResponse> {
        let req = AccessTokenRequest {
            grant_type: "client_credentials".to_string(),
        };
        let res = self
            .http
            .post(&self.cfg.oauth_url)
            .header("Authorization", format!("Basic {}", self.cfg.auth))
            .header("env-id", "OAUTH2")
            .form(&req)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(anyhow!("HTTP status code out of range ({}), body: {}", status, body));
        }

        let response: AccessTokenResponse = serde_json::from_str(&body)
            .with_context(|| format!("unable to decode oauth response: {}", body))?;
        if response.status != OAUTH_SUCCESS {
            return Err(anyhow!("oauth status is not approved ({})", response.status));
        }
        Ok(response)
    }

    async fn try_inquire_status(
        &self,
        req: &InquiryStatusRequest,
        bearer: &str,
    ) -> Result<InquiryStatusResponse> {
        let res = self
            .http
            .post(&self.cfg.inquiry_status_url)
            .header("Authorization", bearer)
            .header("Content-Type", "application/json")
            .header("env-id", "OAUTH2")
            .body(serde_json::to_string(req)?)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(anyhow!("HTTP status code out of range ({}), body: {}", status, body));
        }

        let response: InquiryStatusResponse = serde_json::from_str(&body)
            .with_context(|| format!("unable to decode inquiry response: {}", body))?;
        Ok(response)
    }
}

#[async_trait]
impl BankApi for BankClient {
    async fn authenticate(&self) -> Result<AccessTokenResponse> {
        if self.cfg.toggle.is_test {
            match self.cfg.toggle.case.as_str() {
                "P" => {
                    return Ok(AccessTokenResponse {
                        developer_email: "FreedomX-10@hotmail.com".to_string(),
                        token_type: "Bearer".to_string(),
                        client_id: "t3rrPWnrt2jsOdjFrliIJcPslE76q09B".to_string(),
                        access_token: "AccessToken".to_string(),
                        scope: "Any".to_string(),
                        expires_in: "1799".to_string(),
                        status: OAUTH_SUCCESS.to_string(),
                    })
                }
                "F" => return Err(anyhow!("error on oauth fund transfer (toggle)")),
                _ => {}
            }
        }

        let mut last_err: Option<anyhow::Error> = None;
        for attempt in 1..=self.cfg.retry_max {
            match self.try_authenticate().await {
                Ok(res) => return Ok(res),
                Err(e) => {
                    warn!("oauth attempt {}/{} failed: {:?}", attempt, self.cfg.retry_max, e);
                    last_err = Some(e);
                    if attempt < self.cfg.retry_max {
                        tokio::time::sleep(self.cfg.retry_wait).await;
                    }
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| anyhow!("retry budget is zero"))
            .context(format!("unable to request {}", self.cfg.oauth_url)))
    }

    async fn inquire_status(
        &self,
        req: InquiryStatusRequest,
        access_token: &str,
    ) -> Result<InquiryStatusResponse> {
        if self.cfg.toggle.is_test {
            match self.cfg.toggle.case.as_str() {
                "P" => {
                    return Ok(InquiryStatusResponse {
                        merchant_id: req.merchant_id.clone(),
                        merchant_trans_id: req.merchant_trans_id.clone(),
                        rs_trans_id: uuid::Uuid::new_v4().to_string(),
                        response_date_time: time_util::request_date_time(),
                        response_code: SUCCESS_FUND_TRANSFER.to_string(),
                        response_msg: "Success".to_string(),
                        txn_status: "Success".to_string(),
                        settlement_date: time_util::compact_date(time_util::today()),
                        fail_msg: "FailMsg".to_string(),
                    })
                }
                "F" => return Err(anyhow!("error on inquiry status (toggle)")),
                _ => {}
            }
        }

        let bearer = format!("Bearer {}", access_token);
        let mut last_err: Option<anyhow::Error> = None;
        for attempt in 1..=self.cfg.retry_max {
            match self.try_inquire_status(&req, &bearer).await {
                Ok(res) => {
                    // 终态立即返回；非终态算一次失败，占用重试预算
                    if !is_non_terminal_status(&res.txn_status) {
                        return Ok(res);
                    }
                    warn!(
                        "inquiry attempt {}/{}: transaction is ({})",
                        attempt, self.cfg.retry_max, res.txn_status
                    );
                    last_err = Some(anyhow!("transaction status is non-terminal ({})", res.txn_status));
                }
                Err(e) => {
                    warn!("inquiry attempt {}/{} failed: {:?}", attempt, self.cfg.retry_max, e);
                    last_err = Some(e);
                }
            }
            if attempt < self.cfg.retry_max {
                tokio::time::sleep(self.cfg.retry_wait).await;
            }
        }
        Err(last_err
            .unwrap_or_else(|| anyhow!("retry budget is zero"))
            .context(format!("unable to request {}", self.cfg.inquiry_status_url)))
    }

    async fn fund_transfer(
        &self,
        req: FundTransferRequest,
        access_token: &str,
    ) -> Result<FundTransferResponse> {
        if self.cfg.toggle.is_test {
            match self.cfg.toggle.case.as_str() {
                "P" => {
                    return Ok(FundTransferResponse {
                        merchant_id: req.merchant_id.clone(),
                        merchant_trans_id: req.merchant_trans_id.clone(),
                        rs_trans_id: uuid::Uuid::new_v4().to_string(),
                        response_date_time: time_util::request_date_time(),
                        response_code: SUCCESS_FUND_TRANSFER.to_string(),
                        response_msg: "Success".to_string(),
                        settlement_date: time_util::compact_date(time_util::today()),
                    })
                }
                "F" => return Err(anyhow!("error on fund transfer (toggle)")),
                _ => {}
            }
        }

        let res = self
            .http
            .post(&self.cfg.fund_transfer_url)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Content-Type", "application/json")
            .header("env-id", "OAUTH2")
            .body(serde_json::to_string(&req)?)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(anyhow!(
                "error call {} status: {} body: {}",
                self.cfg.fund_transfer_url,
                status,
                body
            ));
        }
        let response: FundTransferResponse = serde_json::from_str(&body)
            .with_context(|| format!("unable to decode fund transfer response: {}", body))?;
        info!("fund transfer response_code: {}", response.response_code);
        Ok(response)
    }
}
