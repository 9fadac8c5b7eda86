use std::env;

use once_cell::sync::OnceCell;
use rbatis::RBatis;
use rbdc_mysql::MysqlDriver;

use crate::app_config::env::env_parse_or;

static DB_CLIENT: OnceCell<RBatis> = OnceCell::new();

pub async fn init_db() -> &'static RBatis {
    let rb = RBatis::new();
    rb.link(MysqlDriver {}, &env::var("DB_HOST").expect("DB_HOST config is none"))
        .await
        .expect("Failed to connect db");
    //批处理进程，连接数不需要太大
    let max_open = env_parse_or::<u64>("DB_MAX_OPEN_CONNS", 20);
    rb.get_pool().unwrap().set_max_open_conns(max_open).await;

    DB_CLIENT.set(rb).expect("Failed to set DB_CLIENT");
    DB_CLIENT.get().expect("DB_CLIENT is not initialized")
}

pub fn get_db_client() -> &'static RBatis {
    DB_CLIENT.get().expect("DB_CLIENT is not initialized")
}
