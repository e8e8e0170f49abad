//! Neon Storage crate - SQLite persistence for user accounts.
//!
//! Provides a WAL-mode SQLite database with migrations and an account
//! repository covering registration, login, and wake word updates.

pub mod account;
pub mod db;
pub mod migrations;
pub mod password;
pub mod repository;

pub use account::{Account, NewAccount, Occupation, Registration};
pub use db::Database;
pub use repository::AccountRepository;
