use std::env;

use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, FmtSubscriber, Layer, Registry};

// non_blocking writer 的 guard 需要活到进程结束，否则日志会丢
static LOG_GUARDS: OnceCell<Vec<WorkerGuard>> = OnceCell::new();

/// 设置日志
pub async fn setup_logging() -> anyhow::Result<()> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "LOCAL".to_string());

    if app_env == "LOCAL" {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_ansi(true)
            .with_target(false)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .finish();
        // 测试里会重复初始化，忽略已设置的情况
        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        let info_appender =
            RollingFileAppender::new(Rotation::DAILY, &log_dir, "reconcile_batch.info.log");
        let error_appender =
            RollingFileAppender::new(Rotation::DAILY, &log_dir, "reconcile_batch.error.log");
        let (info_non_blocking, info_guard) = tracing_appender::non_blocking(info_appender);
        let (error_non_blocking, error_guard) = tracing_appender::non_blocking(error_appender);

        let subscriber = Registry::default()
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_level(true)
                    .with_writer(info_non_blocking)
                    .with_filter(EnvFilter::new("info")),
            )
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_level(true)
                    .with_writer(error_non_blocking)
                    .with_filter(EnvFilter::new("error")),
            );

        tracing::subscriber::set_global_default(subscriber)?;
        let _ = LOG_GUARDS.set(vec![info_guard, error_guard]);
    }

    Ok(())
}
