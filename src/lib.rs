#[macro_use]
extern crate rbatis;

pub mod app_config;
pub mod error;
pub mod job;
pub mod recon;
pub mod time_util;
