use serde::{Deserialize, Serialize};

/// 银行侧报文，字段名与对方 JSON 契约逐字段对应，视为不可变值类型

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccessTokenRequest {
    pub grant_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AccessTokenResponse {
    #[serde(rename = "developer.email", default)]
    pub developer_email: String,
    #[serde(rename = "token_type", default)]
    pub token_type: String,
    #[serde(rename = "client_id", default)]
    pub client_id: String,
    #[serde(rename = "access_token", default)]
    pub access_token: String,
    #[serde(default)]
    pub scope: String,
    #[serde(rename = "expires_in", default)]
    pub expires_in: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FundTransferRequest {
    #[serde(rename = "merchantID")]
    pub merchant_id: String,
    pub request_date_time: String,
    #[serde(rename = "merchantTransID")]
    pub merchant_trans_id: String,
    #[serde(rename = "rsTransID")]
    pub rs_trans_id: String,
    pub customer_mobile_no: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FundTransferResponse {
    #[serde(rename = "merchantID", default)]
    pub merchant_id: String,
    #[serde(rename = "merchantTransID", default)]
    pub merchant_trans_id: String,
    #[serde(rename = "rsTransID", default)]
    pub rs_trans_id: String,
    #[serde(default)]
    pub response_date_time: String,
    #[serde(default)]
    pub response_code: String,
    #[serde(default)]
    pub response_msg: String,
    #[serde(default)]
    pub settlement_date: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InquiryStatusRequest {
    #[serde(rename = "merchantID")]
    pub merchant_id: String,
    pub request_date_time: String,
    #[serde(rename = "merchantTransID")]
    pub merchant_trans_id: String,
    #[serde(rename = "rsTransID")]
    pub rs_trans_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InquiryStatusResponse {
    #[serde(rename = "merchantID", default)]
    pub merchant_id: String,
    #[serde(rename = "merchantTransID", default)]
    pub merchant_trans_id: String,
    #[serde(rename = "rsTransID", default)]
    pub rs_trans_id: String,
    #[serde(default)]
    pub response_date_time: String,
    #[serde(default)]
    pub response_code: String,
    #[serde(default)]
    pub response_msg: String,
    #[serde(default)]
    pub txn_status: String,
    #[serde(default)]
    pub settlement_date: String,
    #[serde(default)]
    pub fail_msg: String,
}
