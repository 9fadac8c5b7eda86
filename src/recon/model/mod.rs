pub mod candidate;
pub mod fund_transfer;
pub mod unmatched_detail;
pub mod unmatched_header;
