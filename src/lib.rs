// Budget Accounts API - Core Library
// Exposes all modules for use in the server binary and tests

pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use api::{router, AppState};
pub use config::{Limits, ServerConfig};
pub use db::{setup_database, AccountStore, SqliteStore, StoreError};
pub use entities::{Account, AccountDraft};
pub use error::{set_expose_stack, ApiError};
pub use pipeline::{
    check_name_unique, check_payload, resolve_account, run_stages, RequestContext, Stage,
    CREATE_STAGES, FETCH_STAGES, UPDATE_STAGES,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
