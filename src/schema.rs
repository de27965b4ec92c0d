// Request body validation for the expense endpoints.
// Rejects bad payloads at the boundary instead of letting the store's
// NOT NULL constraints surface as opaque SQL errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::NewExpense;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn error(field: &str, message: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Raw JSON body of a create/update request. All fields optional so a
/// missing field produces a structured error instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpensePayload {
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub description: Option<String>,
}

impl ExpensePayload {
    /// Check required fields and formats, returning the validated row
    /// values or every problem found.
    pub fn validate(self) -> Result<NewExpense, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let category = match self.category {
            Some(ref c) if !c.trim().is_empty() => Some(c.trim().to_string()),
            Some(_) => {
                errors.push(error("category", "Must not be empty"));
                None
            }
            None => {
                errors.push(error("category", "Required field is missing"));
                None
            }
        };

        let amount = match self.amount {
            Some(a) if a.is_finite() => Some(a),
            Some(_) => {
                errors.push(error("amount", "Must be a finite number"));
                None
            }
            None => {
                errors.push(error("amount", "Required field is missing"));
                None
            }
        };

        let date = match self.date {
            Some(ref d) => {
                if NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok() {
                    Some(d.clone())
                } else {
                    errors.push(error("date", "Must be a valid YYYY-MM-DD date"));
                    None
                }
            }
            None => {
                errors.push(error("date", "Required field is missing"));
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        // All three are Some when errors is empty
        Ok(NewExpense {
            category: category.unwrap(),
            amount: amount.unwrap(),
            date: date.unwrap(),
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(category: &str, amount: f64, date: &str) -> ExpensePayload {
        ExpensePayload {
            category: Some(category.to_string()),
            amount: Some(amount),
            date: Some(date.to_string()),
            description: None,
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        let validated = payload("Food", 12.5, "2024-11-15").validate().unwrap();
        assert_eq!(validated.category, "Food");
        assert_eq!(validated.amount, 12.5);
        assert_eq!(validated.date, "2024-11-15");
        assert_eq!(validated.description, None);
    }

    #[test]
    fn test_category_is_trimmed() {
        let validated = payload("  Food  ", 12.5, "2024-11-15").validate().unwrap();
        assert_eq!(validated.category, "Food");
    }

    #[test]
    fn test_empty_payload_reports_all_missing_fields() {
        let errors = ExpensePayload::default().validate().unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["category", "amount", "date"]);
        assert!(errors
            .iter()
            .all(|e| e.message == "Required field is missing"));
    }

    #[test]
    fn test_blank_category_rejected() {
        let errors = payload("   ", 12.5, "2024-11-15").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "category");
    }

    #[test]
    fn test_non_finite_amount_rejected() {
        let errors = payload("Food", f64::NAN, "2024-11-15").validate().unwrap_err();
        assert_eq!(errors[0].field, "amount");

        let errors = payload("Food", f64::INFINITY, "2024-11-15")
            .validate()
            .unwrap_err();
        assert_eq!(errors[0].field, "amount");
    }

    #[test]
    fn test_bad_dates_rejected() {
        for bad in ["2024-13-01", "2024-02-30", "11/15/2024", "yesterday", ""] {
            let errors = payload("Food", 12.5, bad).validate().unwrap_err();
            assert_eq!(errors[0].field, "date", "date {:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_negative_and_zero_amounts_accepted() {
        // The schema intentionally allows refunds and zero-value rows
        assert!(payload("Food", -5.0, "2024-11-15").validate().is_ok());
        assert!(payload("Food", 0.0, "2024-11-15").validate().is_ok());
    }

    #[test]
    fn test_decodes_json_body_with_missing_fields() {
        // A request body that omits fields must still decode, so the
        // validator can report them instead of the JSON layer failing
        let payload: ExpensePayload =
            serde_json::from_str(r#"{"category": "Food", "description": null}"#).unwrap();

        let errors = payload.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["amount", "date"]);
    }

    #[test]
    fn test_decodes_full_json_body() {
        let payload: ExpensePayload = serde_json::from_str(
            r#"{"category": "Food", "amount": 12.5, "date": "2024-11-15", "description": "Lunch"}"#,
        )
        .unwrap();

        let validated = payload.validate().unwrap();
        assert_eq!(validated.category, "Food");
        assert_eq!(validated.amount, 12.5);
        assert_eq!(validated.description, Some("Lunch".to_string()));
    }

    #[test]
    fn test_description_passes_through() {
        let mut p = payload("Food", 12.5, "2024-11-15");
        p.description = Some("Grocery shopping".to_string());
        let validated = p.validate().unwrap();
        assert_eq!(validated.description, Some("Grocery shopping".to_string()));
    }
}
