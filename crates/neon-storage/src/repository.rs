//! Account repository backed by the `users` table.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rusqlite::{ErrorCode, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use neon_core::error::NeonError;

use crate::account::{Account, NewAccount, Occupation, Registration};
use crate::db::Database;
use crate::password::{hash_password, verify_password};

const ACCOUNT_COLUMNS: &str =
    "id, email, first_name, last_name, age, occupation, organization, wake_word, created_at";

/// Repository for user accounts.
pub struct AccountRepository {
    db: Arc<Database>,
}

impl AccountRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create an account. An email that is already registered yields
    /// `Registration::DuplicateEmail` rather than an error.
    pub fn register(&self, form: NewAccount) -> Result<Registration, NeonError> {
        let (form, occupation) = form.validate()?;
        let id = Uuid::new_v4();
        let hash = hash_password(&form.password)?;

        self.db.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, email, password_hash, first_name,
                                    last_name, age, occupation, organization)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    id.to_string(),
                    form.email,
                    hash,
                    form.first_name,
                    form.last_name,
                    form.age,
                    occupation.as_str(),
                    form.organization,
                ],
            );

            match inserted {
                Ok(_) => {
                    info!(user_id = %id, "Account registered");
                    Ok(Registration::Created(id))
                }
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(Registration::DuplicateEmail)
                }
                Err(e) => Err(NeonError::Storage(format!("Failed to register: {}", e))),
            }
        })
    }

    /// Return the account when the email and password match.
    pub fn login(&self, email: &str, password: &str) -> Result<Option<Account>, NeonError> {
        let email = email.trim();
        let credentials: Option<(String, String)> = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, password_hash FROM users WHERE email = ?1",
                rusqlite::params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| NeonError::Storage(format!("Failed to look up account: {}", e)))
        })?;

        let Some((id, hash)) = credentials else {
            return Ok(None);
        };
        if !verify_password(password, &hash) {
            return Ok(None);
        }

        let id = Uuid::parse_str(&id)
            .map_err(|e| NeonError::Storage(format!("Invalid UUID: {}", e)))?;
        self.find_by_id(id)
    }

    /// Find an account by ID.
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, NeonError> {
        self.db.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE id = ?1", ACCOUNT_COLUMNS);
            let row = conn
                .query_row(&sql, rusqlite::params![id.to_string()], |row| {
                    Ok(AccountRow {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        first_name: row.get(2)?,
                        last_name: row.get(3)?,
                        age: row.get(4)?,
                        occupation: row.get(5)?,
                        organization: row.get(6)?,
                        wake_word: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                })
                .optional()
                .map_err(|e| NeonError::Storage(e.to_string()))?;
            row.map(AccountRow::into_account).transpose()
        })
    }

    /// Replace the account's wake word. The word is stored trimmed and
    /// lowercased.
    pub fn update_wake_word(&self, id: Uuid, wake_word: &str) -> Result<String, NeonError> {
        let word = normalize_wake_word(wake_word)?;
        let updated = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET wake_word = ?1 WHERE id = ?2",
                rusqlite::params![word, id.to_string()],
            )
            .map_err(|e| NeonError::Storage(format!("Failed to update wake word: {}", e)))
        })?;

        if updated == 0 {
            return Err(NeonError::Storage(format!("No account with id {}", id)));
        }
        info!(user_id = %id, wake_word = %word, "Wake word updated");
        Ok(word)
    }
}

/// Trim, collapse inner whitespace, and lowercase a wake word.
pub fn normalize_wake_word(wake_word: &str) -> Result<String, NeonError> {
    let word = wake_word
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if word.is_empty() {
        return Err(NeonError::InvalidInput(
            "Wake word must not be empty".to_string(),
        ));
    }
    Ok(word)
}

struct AccountRow {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
    age: Option<u32>,
    occupation: String,
    organization: String,
    wake_word: String,
    created_at: i64,
}

impl AccountRow {
    fn into_account(self) -> Result<Account, NeonError> {
        Ok(Account {
            id: Uuid::parse_str(&self.id)
                .map_err(|e| NeonError::Storage(format!("Invalid UUID: {}", e)))?,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            occupation: self.occupation.parse::<Occupation>()?,
            organization: self.organization,
            wake_word: self.wake_word,
            created_at: Utc
                .timestamp_opt(self.created_at, 0)
                .single()
                .unwrap_or_default(),
        })
    }
}
