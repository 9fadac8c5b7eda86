use std::time::Duration;

use anyhow::Result;
use dotenv::dotenv;
use rbatis::rbdc::DateTime;

use reconcile_batch::app_config::db::{get_db_client, init_db};
use reconcile_batch::app_config::log::setup_logging;
use reconcile_batch::recon::model::unmatched_detail::{
    BankUnmatchedDetailEntity, UnmatchedDetailModel, REASON_SUCCESS,
};
use reconcile_batch::recon::model::unmatched_header::UnmatchedHeaderModel;
use reconcile_batch::time_util;

// 需要 .env 里的 DB_HOST 指向可用的 MySQL
#[tokio::test]
#[ignore]
async fn test_open_and_close_run() -> Result<()> {
    dotenv().ok();
    setup_logging().await?;
    init_db().await;

    let model = UnmatchedHeaderModel::new();
    let id = model.open_run(time_util::today()).await?;
    assert!(id > 0);

    model.close_run(id).await?;
    // 对已 SUCCESS 的 run 重复收尾是幂等的
    model.close_run(id).await?;
    Ok(())
}

// 需要 .env 里的 DB_HOST 指向可用的 MySQL
#[tokio::test]
#[ignore]
async fn test_uncommitted_transaction_rolls_back_on_drop() -> Result<()> {
    dotenv().ok();
    setup_logging().await?;
    init_db().await;
    let db = get_db_client();

    // 不会与真实 run 撞上的锚点 id
    let run_id = 987_654_321i64;
    {
        let tx = db.acquire_begin().await?;
        let tx = tx.defer_async(|mut tx| async move {
            if !tx.done() {
                let _ = tx.rollback().await;
            }
        });
        let detail = BankUnmatchedDetailEntity {
            unmatched_header_id: run_id,
            channel_code: "CH01".to_string(),
            transaction_bank_id: "B2".to_string(),
            bank_status: String::new(),
            asp_status: "PENDING".to_string(),
            reason: REASON_SUCCESS.to_string(),
            created_date: DateTime::now(),
        };
        UnmatchedDetailModel::add_on(&tx, &detail).await?;
        // 不 commit，guard 离开作用域触发回滚
    }
    // 回滚在 drop 后异步执行，给它一点时间
    tokio::time::sleep(Duration::from_millis(300)).await;

    let count: u64 = db
        .query_decode(
            "select count(1) as count from tbl_bank_unmatched_detail where unmatched_header_id = ?",
            vec![run_id.into()],
        )
        .await?;
    assert_eq!(count, 0);
    Ok(())
}
