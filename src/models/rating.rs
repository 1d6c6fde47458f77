// src/models/rating.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Aggregated rating for one place
/// DOCUMENTATION: Absent data resolves to 0 on both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub place_id: String,
    pub average: f64,
    pub external: f64,
}

/// Body of POST /ratings?placeId=<id>
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RatingSubmission {
    #[validate(range(min = 1, max = 5))]
    pub value: u8,
}

/// Request DTO for the session rating endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateRequest {
    #[validate(length(min = 1))]
    pub place_id: String,
    #[validate(range(min = 1, max = 5))]
    pub value: u8,
}

/// Coerce a loosely typed rating field into a number
/// DOCUMENTATION: The backend sends numbers or numeric strings; anything else is 0
pub fn coerce_rating(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_rating() {
        assert_eq!(coerce_rating(Some(&json!(4.5))), 4.5);
        assert_eq!(coerce_rating(Some(&json!("3.25"))), 3.25);
        assert_eq!(coerce_rating(Some(&json!("n/a"))), 0.0);
        assert_eq!(coerce_rating(Some(&json!(null))), 0.0);
        assert_eq!(coerce_rating(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_rating(None), 0.0);
    }

    #[test]
    fn test_submission_range() {
        assert!(RatingSubmission { value: 5 }.validate().is_ok());
        assert!(RatingSubmission { value: 0 }.validate().is_err());
        assert!(RatingSubmission { value: 6 }.validate().is_err());
    }
}
