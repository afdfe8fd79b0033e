//! Everything a slice handler module usually imports.

pub use crate::error::{ApiError, ApiResult, ErrorCode};
pub use crate::extract::{ApiJson, ApiPath, ApiQuery, Validate};
pub use crate::pagination::{Envelope, PageRequest, Paginated};
pub use crate::server::state::ApiState;
pub use crate::time::{from_millis, now_millis};
pub use lvai_derive::{api_handler, api_model};
