pub const APP_NAME: &str = "LotteryVision";
pub const API_PREFIX: &str = "/api/v1";

// OpenAPI tags
pub const SYSTEM_TAG: &str = "System";
pub const AUTH_TAG: &str = "Auth";
pub const LOTTERY_TAG: &str = "Lottery";
pub const CREDITS_TAG: &str = "Credits";
pub const RECOMMENDATION_TAG: &str = "Recommendations";

// Tables
pub const USER: &str = "user";
pub const LOTTERY_DRAW: &str = "lottery_draw";
pub const LOTTERY_STATISTICS: &str = "lottery_statistics";
pub const RECOMMENDATION: &str = "recommendation";
pub const CREDIT_TRANSACTION: &str = "credit_transaction";
pub const CREDIT_PACKAGE: &str = "credit_package";

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
