use crate::db::DbPool;
use crate::models::{NewSession, User};
use crate::schema::{sessions, users};
use chrono::{Duration, Utc};
use diesel::prelude::*;

use super::crypto::{generate_token, hash_token};

/// How long an issued bearer token stays valid.
const SESSION_LIFETIME_DAYS: i64 = 30;

/// Issues a fresh bearer token for the user and persists its digest.
/// Only the SHA-256 digest is stored; the plaintext token goes to the caller.
pub fn create_session(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> Result<String, diesel::result::Error> {
    let token = generate_token();
    let token_hash = hash_token(&token);
    let now = Utc::now().naive_utc();

    let new_session = NewSession {
        user_id,
        token_hash: &token_hash,
        expires_at: now + Duration::days(SESSION_LIFETIME_DAYS),
        created_at: now,
    };

    diesel::insert_into(sessions::table)
        .values(&new_session)
        .execute(conn)?;

    Ok(token)
}

/// Resolves a bearer token to its user. Unknown and expired tokens both
/// come back as None.
pub async fn get_user_from_token(pool: &DbPool, token: &str) -> Option<User> {
    let mut conn = pool.get().ok()?;
    let token_hash = hash_token(token);

    sessions::table
        .inner_join(users::table)
        .filter(sessions::token_hash.eq(&token_hash))
        .filter(sessions::expires_at.gt(Utc::now().naive_utc()))
        .select(User::as_select())
        .first(&mut conn)
        .ok()
}
