use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};
use base64::Engine;

use crate::app_config::env::{env_is_true, env_or_default, env_parse_or};

/// 银行接口测试开关：is_test 时 "P" 返回固定成功报文，"F" 返回固定失败
#[derive(Debug, Clone, Default)]
pub struct ToggleConfig {
    pub is_test: bool,
    pub case: String,
}

impl ToggleConfig {
    pub fn from_env(prefix: &str) -> Self {
        Self {
            is_test: env_is_true(&format!("{}_TOGGLE_IS_TEST", prefix), false),
            case: env_or_default(&format!("{}_TOGGLE_CASE", prefix), ""),
        }
    }
}

/// 银行（外部结算对手方）接口配置
#[derive(Debug, Clone)]
pub struct BankConfig {
    pub oauth_url: String,
    pub fund_transfer_url: String,
    pub inquiry_status_url: String,
    pub merchant_id: String,
    /// HTTP Basic 认证串（不含 "Basic " 前缀）
    pub auth: String,
    pub retry_max: u32,
    pub retry_wait: Duration,
    pub http_timeout: Duration,
    pub toggle: ToggleConfig,
}

impl BankConfig {
    pub fn from_env() -> Result<Self> {
        let auth = match env::var("BANK_AUTH") {
            Ok(v) => v,
            Err(_) => {
                // 未提供现成的 Basic 串时，用 client id/secret 现场编码
                let client_id = env::var("BANK_CLIENT_ID")
                    .map_err(|_| anyhow!("BANK_AUTH or BANK_CLIENT_ID config is none"))?;
                let client_secret = env::var("BANK_CLIENT_SECRET")
                    .map_err(|_| anyhow!("BANK_CLIENT_SECRET config is none"))?;
                base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", client_id, client_secret))
            }
        };

        Ok(Self {
            oauth_url: env::var("BANK_OAUTH_URL")
                .map_err(|_| anyhow!("BANK_OAUTH_URL config is none"))?,
            fund_transfer_url: env::var("BANK_FUND_TRANSFER_URL")
                .map_err(|_| anyhow!("BANK_FUND_TRANSFER_URL config is none"))?,
            inquiry_status_url: env::var("BANK_INQUIRY_STATUS_URL")
                .map_err(|_| anyhow!("BANK_INQUIRY_STATUS_URL config is none"))?,
            merchant_id: env_or_default("BANK_MERCHANT_ID", "ARRT"),
            auth,
            retry_max: env_parse_or::<u32>("BANK_RETRY_MAX", 3),
            retry_wait: Duration::from_secs(env_parse_or::<u64>("BANK_RETRY_WAIT_SECS", 45)),
            http_timeout: Duration::from_secs(env_parse_or::<u64>("BANK_HTTP_TIMEOUT_SECS", 30)),
            toggle: ToggleConfig::from_env("BANK"),
        })
    }
}

/// 下游消息主题配置
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// 正常结清（final settlement）主题
    pub final_topic: String,
    /// 冲正（reversal）主题
    pub revert_topic: String,
}

impl ProducerConfig {
    pub fn from_env() -> Self {
        Self {
            final_topic: env_or_default("PRODUCER_FINAL_TOPIC", "internal.settlement.final"),
            revert_topic: env_or_default("PRODUCER_REVERT_TOPIC", "internal.settlement.revert"),
        }
    }
}

/// run 总时长上限（秒），超时中断剩余候选处理
pub fn run_deadline() -> Duration {
    Duration::from_secs(env_parse_or::<u64>("RUN_DEADLINE_SECS", 1800))
}
