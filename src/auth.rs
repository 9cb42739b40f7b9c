use crate::store::StoreError;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use sha2::{Digest, Sha256};
use uuid::Uuid;

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn check_credentials(username: &str, password: &str) -> Result<(), StoreError> {
    if username.is_empty() {
        return Err(StoreError::Invalid("username must not be empty".to_string()));
    }
    if password.is_empty() {
        return Err(StoreError::Invalid("password must not be empty".to_string()));
    }
    Ok(())
}

pub fn register(conn: &Connection, username: &str, password: &str) -> Result<(), StoreError> {
    let username = username.trim();
    let password = password.trim();
    check_credentials(username, password)?;

    let salt = Uuid::new_v4().to_string();
    let inserted = conn.execute(
        "INSERT INTO users(username, salt, password_hash, created_at) VALUES(?, ?, ?, ?)",
        params![
            username,
            salt,
            hash_password(&salt, password),
            chrono::Local::now().to_rfc3339()
        ],
    );
    match inserted {
        Ok(_) => {}
        // Uniqueness rests on the primary key alone.
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            return Err(StoreError::Conflict(format!("username {}", username)));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// True when the user exists and the password matches.
pub fn verify_login(conn: &Connection, username: &str, password: &str) -> Result<bool, StoreError> {
    let username = username.trim();
    let password = password.trim();
    check_credentials(username, password)?;

    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT salt, password_hash FROM users WHERE username = ?",
            [username],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    Ok(match row {
        Some((salt, stored)) => hash_password(&salt, password) == stored,
        None => false,
    })
}
