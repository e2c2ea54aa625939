// 💳 Account Entity
//
// "Account id is IDENTITY (never changes), name and budget are VALUES"
//
// The id is assigned by the store at insert time and is immutable afterwards.
// Updates replace name/budget only; the raw wire payload never reaches the
// store — it passes through the validation pipeline first and arrives here
// as an `AccountDraft`.

use serde::{Deserialize, Serialize};

/// A budget account as persisted and served over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identity - assigned by the store, NEVER changes
    pub id: i64,

    /// Account name (unique across all accounts, stored trimmed)
    pub name: String,

    /// Budget amount (always finite and within policy bounds)
    pub budget: f64,
}

/// Validated, normalized account fields ready for a store write.
///
/// Produced exclusively by the payload validator: `name` is already trimmed
/// and `budget` already coerced to a finite number, so store implementations
/// persist it as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDraft {
    pub name: String,
    pub budget: f64,
}

impl AccountDraft {
    pub fn new(name: impl Into<String>, budget: f64) -> Self {
        AccountDraft {
            name: name.into(),
            budget,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_serializes_wire_fields() {
        let account = Account {
            id: 1,
            name: "Bob".to_string(),
            budget: 500.0,
        };

        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "name": "Bob", "budget": 500.0}));
    }

    #[test]
    fn test_account_round_trips_through_json() {
        let account = Account {
            id: 7,
            name: "Groceries".to_string(),
            budget: 1250.5,
        };

        let json = serde_json::to_string(&account).unwrap();
        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back, account);
    }
}
