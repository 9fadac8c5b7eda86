extern crate rbatis;

use anyhow::{Context, Result};
use rbatis::executor::Executor;
use serde::{Deserialize, Serialize};

/// 补偿记录：从候选行携带的 fundTransfer 透传报文解码得到，
/// 每个被冲正的候选写一条反向账务行
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct FundTransferCompensationEntity {
    pub channel_code: String,
    pub ref_no1: String,
    pub ref_no2: String,
    pub ref_no3: String,
    pub ref_no4: String,
    pub transaction_id: String,
    pub transaction_type: String,
    pub amount: String,
    pub request_body: String,
    pub response_body: String,
    pub response_code: String,
    pub response_message: String,
}

crud!(FundTransferCompensationEntity {}, "tbl_fund_transfer_compensation");

/// 银行转账上下文在支付报文里的原始形状，只取补偿需要的字段
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FundTransferTransactionModel {
    pub channel_code: String,
    pub ref_no1: String,
    pub ref_no2: String,
    pub ref_no3: String,
    pub ref_no4: String,
    pub transaction_id: String,
    pub transaction_type: String,
    pub amount: String,
    pub request_body: String,
    pub response_body: String,
    pub response_code: String,
    pub response_message: String,
}

impl FundTransferTransactionModel {
    /// 解码候选行携带的原始 fundTransfer JSON
    pub fn from_raw(raw: &str) -> Result<Self> {
        serde_json::from_str::<Self>(raw).context("unable to decode fund transfer payload")
    }

    /// 转成反向账务行
    pub fn to_compensation(&self) -> FundTransferCompensationEntity {
        FundTransferCompensationEntity {
            channel_code: self.channel_code.clone(),
            ref_no1: self.ref_no1.clone(),
            ref_no2: self.ref_no2.clone(),
            ref_no3: self.ref_no3.clone(),
            ref_no4: self.ref_no4.clone(),
            transaction_id: self.transaction_id.clone(),
            transaction_type: self.transaction_type.clone(),
            amount: self.amount.clone(),
            request_body: self.request_body.clone(),
            response_body: self.response_body.clone(),
            response_code: self.response_code.clone(),
            response_message: self.response_message.clone(),
        }
    }
}

/// 在补偿事务内写入反向账务行
pub async fn write_compensation(
    executor: &dyn Executor,
    record: &FundTransferCompensationEntity,
) -> Result<u64> {
    let data = FundTransferCompensationEntity::insert(executor, record).await?;
    Ok(data.rows_affected)
}
