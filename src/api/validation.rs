use super::ApiError;

pub const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

pub fn validate_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "מזהה לא תקין: {id}. המזהה חייב להיות מספר חיובי"
        )));
    }
    Ok(id)
}

/// Pages are 1-based.
pub fn validate_page(page: Option<u64>) -> Result<u64, ApiError> {
    match page {
        None => Ok(1),
        Some(0) => Err(ApiError::validation("מספר העמוד חייב להיות 1 ומעלה")),
        Some(page) => Ok(page),
    }
}

pub fn validate_page_size(page_size: Option<u64>) -> Result<u64, ApiError> {
    let size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(ApiError::validation(format!(
            "גודל עמוד חייב להיות בין 1 ל-{MAX_PAGE_SIZE}"
        )));
    }
    Ok(size)
}

pub fn validate_required<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} הוא שדה חובה")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1).is_ok());
        assert!(validate_id(12345).is_ok());
        assert!(validate_id(0).is_err());
        assert!(validate_id(-1).is_err());
    }

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page(None).unwrap(), 1);
        assert_eq!(validate_page(Some(3)).unwrap(), 3);
        assert!(validate_page(Some(0)).is_err());
    }

    #[test]
    fn test_validate_page_size() {
        assert_eq!(validate_page_size(None).unwrap(), DEFAULT_PAGE_SIZE);
        assert_eq!(validate_page_size(Some(200)).unwrap(), 200);
        assert!(validate_page_size(Some(0)).is_err());
        assert!(validate_page_size(Some(201)).is_err());
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("  name ", "שם").unwrap(), "name");
        assert!(validate_required("   ", "שם").is_err());
    }
}
