use anyhow::Result;
use async_trait::async_trait;

use crate::recon::bank::dto::{
    AccessTokenResponse, FundTransferRequest, FundTransferResponse, InquiryStatusRequest,
    InquiryStatusResponse,
};

/// 银行接口抽象，引擎和测试 mock 都走这一层
#[async_trait]
pub trait BankApi: Send + Sync {
    /// client-credentials 认证，重试耗尽返回错误
    async fn authenticate(&self) -> Result<AccessTokenResponse>;

    /// 交易状态查询，非终态会在重试预算内继续轮询
    async fn inquire_status(
        &self,
        req: InquiryStatusRequest,
        access_token: &str,
    ) -> Result<InquiryStatusResponse>;

    /// 发起转账（补偿路径的银行侧变体）
    async fn fund_transfer(
        &self,
        req: FundTransferRequest,
        access_token: &str,
    ) -> Result<FundTransferResponse>;
}
