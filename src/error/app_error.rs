use thiserror::Error;

/// 应用错误
#[derive(Error, Debug)]
pub enum AppError {
    /// 业务错误
    #[error("业务错误: {0}")]
    BizError(String),

    /// 数据库错误
    #[error("数据库错误: {0}")]
    DbError(String),

    /// 缓存不可用（调用方按 miss 处理，不致命）
    #[error("缓存错误: {0}")]
    CacheError(String),

    #[error("银行接口错误: {0}")]
    BankApiError(String),

    #[error("消息发送错误: {0}")]
    OutletError(String),

    /// 未知错误
    #[error("未知错误: {0}")]
    Unknown(String),
}

impl From<rbatis::Error> for AppError {
    fn from(err: rbatis::Error) -> Self {
        AppError::DbError(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::BankApiError(err.to_string())
    }
}

/// 把任何错误转换为AppError类型
pub fn to_err<E: std::error::Error + Send + Sync + 'static>(err: E) -> AppError {
    AppError::Unknown(err.to_string())
}
