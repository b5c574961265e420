//! Request validation helpers shared by the CRUD modules. Invalid input is
//! rejected here, at the boundary, and never reaches the store.

use folio_http::error::AppError;
use serde_json::json;

/// Trim `raw` and require it to be non-empty and within `max_len`.
pub fn require_text(field: &str, raw: &str, max_len: usize) -> Result<String, AppError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::validation(
            vec![json!({"field": field, "error": "required"})],
            format!("{field} must not be empty"),
        ));
    }
    if value.len() > max_len {
        return Err(AppError::validation(
            vec![json!({"field": field, "error": "too_long", "max": max_len})],
            format!("{field} must be at most {max_len} characters"),
        ));
    }
    Ok(value.to_string())
}

pub fn require_non_negative(field: &str, value: f32) -> Result<(), AppError> {
    if value < 0.0 || !value.is_finite() {
        return Err(AppError::validation(
            vec![json!({"field": field, "error": "negative"})],
            format!("{field} must be a non-negative number"),
        ));
    }
    Ok(())
}

/// Allowed review ratings are 1 through 5 inclusive.
pub fn require_rating(rating: u8) -> Result<(), AppError> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::validation(
            vec![json!({"field": "rating", "error": "out_of_range", "min": 1, "max": 5})],
            "rating must be between 1 and 5",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed() {
        assert_eq!(require_text("title", "  Dune ", 200).unwrap(), "Dune");
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("title", "   ", 200).is_err());
    }

    #[test]
    fn overlong_text_is_rejected() {
        let raw = "x".repeat(201);
        assert!(require_text("title", &raw, 200).is_err());
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(require_rating(1).is_ok());
        assert!(require_rating(5).is_ok());
        assert!(require_rating(0).is_err());
        assert!(require_rating(6).is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(require_non_negative("price", -0.01).is_err());
        assert!(require_non_negative("price", 0.0).is_ok());
    }
}
