//! Authentication module for Slopeline

pub mod blacklist;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use blacklist::{BlacklistError, TokenBlacklist};
pub use jwt::{Claims, JwtError, JwtManager};
pub use middleware::{bearer_token, require_auth, AuthUser};
pub use password::{hash_password, verify_password};
