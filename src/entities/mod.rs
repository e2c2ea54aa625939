// Entity Models

pub mod account;

pub use account::{Account, AccountDraft};
