use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use dotenv::dotenv;
use tracing::error;

use reconcile_batch::app_config::db::init_db;
use reconcile_batch::app_config::log::setup_logging;
use reconcile_batch::app_config::redis::get_redis_connection;
use reconcile_batch::app_config::settings::ProducerConfig;
use reconcile_batch::job::reconcile_job::ReconcileJob;
use reconcile_batch::recon::bank::BankClient;
use reconcile_batch::recon::outlet::RedisStreamOutlet;
use reconcile_batch::time_util;

#[derive(Parser, Debug)]
#[command(name = "reconcile_batch", about = "日终结算对账批处理")]
struct Args {
    /// run 日期（YYYY-MM-DD），缺省为今天；候选窗口是它的前一天
    #[arg(long)]
    date: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("reconcile batch aborted: {:?}", e);
        eprintln!("reconcile batch aborted: {:?}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    setup_logging().await?;
    init_db().await;

    let as_of = match &args.date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")?,
        None => time_util::today(),
    };

    let bank = BankClient::from_env()?;
    let merchant_id = bank.config().merchant_id.clone();

    let outlet_conn = get_redis_connection().await?;
    let outlet = RedisStreamOutlet::new(outlet_conn);

    let job = ReconcileJob::new(
        Arc::new(bank),
        Arc::new(outlet),
        ProducerConfig::from_env(),
        merchant_id,
    );
    job.run(as_of).await
}
