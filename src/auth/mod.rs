mod crypto;
pub mod db;
mod extractor;
mod middleware;

pub use crypto::{generate_token, hash_password, hash_token, verify_password};
pub use db::create_session;
pub use extractor::AuthUser;
pub use middleware::require_auth;
