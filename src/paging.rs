//! Page number handling for listing queries.

use crate::error::{ApiError, ApiResult};

/// Row offset of a 1-based page. Page 0 reads as page 1; offsets the
/// database cannot represent are rejected.
pub fn page_offset(page: u64, page_size: u64) -> ApiResult<u64> {
    (page.max(1) - 1)
        .checked_mul(page_size)
        .filter(|offset| *offset <= i64::MAX as u64)
        .ok_or_else(|| ApiError::bad_request("Page number is too large"))
}

#[cfg(test)]
mod tests {
    use super::page_offset;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(0, 20).unwrap(), 0);
        assert_eq!(page_offset(1, 20).unwrap(), 0);
        assert_eq!(page_offset(3, 20).unwrap(), 40);
        assert!(page_offset(u64::MAX, 20).is_err());
        assert!(page_offset(u64::MAX / 2, 4).is_err());
    }
}
