pub mod bank;
pub mod cache;
pub mod engine;
pub mod model;
pub mod outlet;
pub mod payment;
