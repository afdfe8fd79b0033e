//! # Domain Models
//!
//! Pure LotteryVision types with minimal dependencies (`serde`, `strum`, `utoipa` schemas).
//! No I/O or networking lives here, only data and the rules that travel with it.

pub mod config;
pub mod constants;
pub mod credits;
pub mod lottery;
pub mod registry;
pub mod strategy;
