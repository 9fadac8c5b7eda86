pub mod api_trait;
pub mod client;
pub mod dto;

pub use api_trait::BankApi;
pub use client::BankClient;

/// OAuth 响应 body 里的成功标记
pub const OAUTH_SUCCESS: &str = "approved";
/// 银行响应码：成功
pub const SUCCESS_FUND_TRANSFER: &str = "0000";
/// 查询结果里的终态成功状态
pub const TXN_STATUS_SUCCESS: &str = "Success";

/// 仍可能变化的非终态状态，命中则在重试预算内继续轮询
pub const NON_TERMINAL_TXN_STATUS: [&str; 2] = ["Fail", "In Process"];

pub fn is_non_terminal_status(status: &str) -> bool {
    NON_TERMINAL_TXN_STATUS.iter().any(|s| *s == status)
}

pub fn is_success_status(status: &str) -> bool {
    status.eq_ignore_ascii_case(TXN_STATUS_SUCCESS)
}
