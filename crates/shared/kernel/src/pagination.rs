use crate::error::ApiError;
use lvai_domain::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::Serialize;
use std::borrow::Cow;
use utoipa::ToSchema;

/// Validated `page`/`page_size` pair taken from a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Pages start at 1; `page_size` defaults to 20 and is capped at 100.
    ///
    /// # Errors
    ///
    /// Returns a validation error when either value is out of range.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, ApiError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(ApiError::validation("page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ApiError::validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        Ok(Self { page, page_size })
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.page_size as u64
    }
}

/// One page of a listing plus the total count across all pages.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            success: true,
            data,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages: total.div_ceil(u64::from(request.page_size)),
        }
    }
}

/// Success envelope: `{"success": true, "message": ..., "data": ...}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Cow<'static, str>>,
    pub data: T,
}

impl<T> Envelope<T> {
    pub const fn ok(data: T) -> Self {
        Self { success: true, message: None, data }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_bounds() {
        let page = PageRequest::new(None, None).unwrap();
        assert_eq!((page.page, page.page_size, page.offset()), (1, 20, 0));

        let page = PageRequest::new(Some(3), Some(100)).unwrap();
        assert_eq!(page.offset(), 200);
        assert_eq!(page.limit(), 100);

        assert!(PageRequest::new(Some(0), None).is_err());
        assert!(PageRequest::new(None, Some(0)).is_err());
        assert!(PageRequest::new(None, Some(101)).is_err());
    }

    #[test]
    fn total_pages_rounds_up() {
        let request = PageRequest::new(Some(1), Some(20)).unwrap();
        assert_eq!(Paginated::<u8>::new(vec![], 41, request).total_pages, 3);
        assert_eq!(Paginated::<u8>::new(vec![], 40, request).total_pages, 2);
        assert_eq!(Paginated::<u8>::new(vec![], 0, request).total_pages, 0);
    }

    #[test]
    fn envelope_omits_missing_message() {
        let value = serde_json::to_value(Envelope::ok(5)).unwrap();
        assert_eq!(value, serde_json::json!({ "success": true, "data": 5 }));

        let value = serde_json::to_value(Envelope::ok(()).with_message("done")).unwrap();
        assert_eq!(value["message"], "done");
    }
}
