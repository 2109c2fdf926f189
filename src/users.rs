//! Identity-store operations: user creation and credential hashing live
//! here so the HTTP layer and management tooling share one code path.

use crate::auth::hash_password;
use crate::models::{NewUser, User};
use crate::schema::users;
use chrono::Utc;
use diesel::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CreateUserError {
    #[error("Email must not be empty")]
    EmptyEmail,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Failed to hash password")]
    PasswordHash,

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
}

/// Creates a regular user. The email is normalized to lowercase before
/// storage and the password is hashed; the plaintext never hits the database.
pub fn create_user(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
) -> Result<User, CreateUserError> {
    insert_user(conn, email, password, false, false)
}

/// Creates a staff superuser. Same normalization and hashing as
/// `create_user`, with both privilege flags set.
pub fn create_superuser(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
) -> Result<User, CreateUserError> {
    insert_user(conn, email, password, true, true)
}

fn insert_user(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
    is_staff: bool,
    is_superuser: bool,
) -> Result<User, CreateUserError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(CreateUserError::EmptyEmail);
    }

    let password_hash = hash_password(password).map_err(|_| CreateUserError::PasswordHash)?;

    let new_user = NewUser {
        email: &email,
        password_hash: &password_hash,
        is_staff,
        is_superuser,
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => CreateUserError::DuplicateEmail,
            other => CreateUserError::Database(other),
        })
}

/// Case-insensitive lookup by email.
pub fn find_by_email(conn: &mut SqliteConnection, email: &str) -> Option<User> {
    users::table
        .filter(users::email.eq(email.trim().to_lowercase()))
        .select(User::as_select())
        .first(conn)
        .ok()
}
