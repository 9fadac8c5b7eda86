use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 支付上下文消息。只把引擎真正读写的字段建模出来（冲正标记、
/// 随路的转账上下文），其余字段通过 flatten 原样透传，避免有损重序列化。
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PaymentMessage {
    #[serde(rename = "TransactionId", default)]
    pub transaction_id: Value,
    #[serde(rename = "ChannelCode", default)]
    pub channel_code: String,
    #[serde(rename = "ToRevert", default)]
    pub to_revert: bool,
    #[serde(rename = "FundTransferTransaction", default)]
    pub fund_transfer_transaction: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentMessage {
    /// 从候选行携带的原始 JSON 解出支付消息；空串按空消息处理
    pub fn from_raw(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str::<Self>(raw)?)
    }
}
