use super::ApiError;

const MAX_ID_LEN: usize = 64;

/// Catalog ids are short codes like `ABP-123` or `okq`; anything with a
/// path separator or control character is rejected outright.
pub fn validate_catalog_id(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::validation("Id cannot be empty"));
    }

    if id.len() > MAX_ID_LEN {
        return Err(ApiError::validation(format!(
            "Id must be {MAX_ID_LEN} characters or less"
        )));
    }

    if id.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(ApiError::validation(format!("Invalid id: {id}")));
    }

    Ok(id)
}

pub fn validate_keyword(keyword: &str) -> Result<&str, ApiError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(ApiError::validation("Search keyword cannot be empty"));
    }

    if keyword.chars().count() > 100 {
        return Err(ApiError::validation(
            "Search keyword must be 100 characters or less",
        ));
    }

    Ok(keyword)
}

pub fn validate_max_pages(pages: u32) -> Result<u32, ApiError> {
    const MAX_PAGES: u32 = 50;

    if !(1..=MAX_PAGES).contains(&pages) {
        return Err(ApiError::validation(format!(
            "Invalid max_pages: {pages}. Must be between 1 and {MAX_PAGES}"
        )));
    }
    Ok(pages)
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MAX_LIMIT: u64 = 1000;
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_LIMIT}"
        )));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_catalog_id() {
        assert_eq!(validate_catalog_id(" ABP-123 ").unwrap(), "ABP-123");
        assert!(validate_catalog_id("").is_err());
        assert!(validate_catalog_id("   ").is_err());
        assert!(validate_catalog_id("../etc").is_err());
        assert!(validate_catalog_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_keyword() {
        assert_eq!(validate_keyword(" 三上 ").unwrap(), "三上");
        assert!(validate_keyword(" ").is_err());
        assert!(validate_keyword(&"あ".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_max_pages() {
        assert!(validate_max_pages(0).is_err());
        assert!(validate_max_pages(1).is_ok());
        assert!(validate_max_pages(50).is_ok());
        assert!(validate_max_pages(51).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(1000).is_ok());
        assert!(validate_limit(1001).is_err());
    }
}
