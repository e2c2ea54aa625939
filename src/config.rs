// Configuration - validation bounds and server settings
// Bounds are deployment policy, not domain logic: the pipeline reads them
// from `Limits` and never hardcodes them.

use std::env;

/// Validation bounds for account fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Minimum name length after trimming
    pub name_min: usize,
    /// Maximum name length after trimming
    pub name_max: usize,
    /// Minimum budget (inclusive)
    pub budget_min: f64,
    /// Maximum budget (inclusive)
    pub budget_max: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            name_min: 3,
            name_max: 20,
            budget_min: 0.0,
            budget_max: 1_500_000.0,
        }
    }
}

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: String,
    /// When false, error responses omit the diagnostic `stack` field
    pub expose_stack: bool,
}

impl ServerConfig {
    /// Build config from environment variables, falling back to defaults:
    /// `PORT` (3000), `DATABASE_PATH` ("accounts.db"),
    /// `EXPOSE_ERROR_STACK` ("1"/"true" by default).
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "accounts.db".to_string());

        let expose_stack = env::var("EXPOSE_ERROR_STACK")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        ServerConfig {
            port,
            database_path,
            expose_stack,
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
    fn test_default_limits_match_policy() {
        let limits = Limits::default();

        assert_eq!(limits.name_min, 3);
        assert_eq!(limits.name_max, 20);
        assert_eq!(limits.budget_min, 0.0);
        assert_eq!(limits.budget_max, 1_500_000.0);
    }
}
