//! Caller identity for mutating endpoints.
//!
//! Controllers ask an `IdentityCheck` to turn a bearer token into a known
//! user before touching the store. The bundled `TokenAuthority` is a toy
//! scheme: tokens are the username with a fixed prefix and passwords are
//! "hashed" by prefixing them. It authenticates nothing for real.

pub mod registry;

pub use registry::UserRegistry;

use crate::models::{User, UserInDb};

/// Prefix every issued token carries
pub const TOKEN_PREFIX: &str = "tokenized";

const HASH_PREFIX: &str = "hashed";

/// Capability check the HTTP layer runs before mutations
pub trait IdentityCheck: Send + Sync {
    /// Resolve a bearer token to a user in the registry
    fn resolve(&self, token: &str) -> Option<User>;

    /// Verify a username/password pair and issue a token for it
    fn login(&self, username: &str, password: &str) -> Option<String>;
}

pub fn hash_password(password: &str) -> String {
    format!("{}{}", HASH_PREFIX, password)
}

pub fn token_for(user: &UserInDb) -> String {
    format!("{}{}", TOKEN_PREFIX, user.username)
}

/// Token authority over a fixed user registry
pub struct TokenAuthority {
    registry: UserRegistry,
}

impl TokenAuthority {
    pub fn new(registry: UserRegistry) -> Self {
        Self { registry }
    }
}

impl IdentityCheck for TokenAuthority {
    fn resolve(&self, token: &str) -> Option<User> {
        let username = token.strip_prefix(TOKEN_PREFIX)?;
        let user = self.registry.get(username);
        if user.is_none() {
            log::warn!("[AUTH] Token names unknown user {:?}", username);
        }
        user.map(User::from)
    }

    fn login(&self, username: &str, password: &str) -> Option<String> {
        let user = self.registry.get(username)?;
        if user.hashed_password != hash_password(password) {
            log::warn!("[AUTH] Wrong password for {:?}", username);
            return None;
        }
        Some(token_for(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> TokenAuthority {
        TokenAuthority::new(UserRegistry::demo())
    }

    #[test]
    fn test_resolve_known_user() {
        let user = authority().resolve("tokenizedjohndoe").expect("johndoe is known");
        assert_eq!(user.username, "johndoe");
    }

    #[test]
    fn test_resolve_rejects_bad_tokens() {
        let auth = authority();
        assert!(auth.resolve("johndoe").is_none());
        assert!(auth.resolve("tokenizedmallory").is_none());
        assert!(auth.resolve("").is_none());
    }

    #[test]
    fn test_login_issues_token_that_resolves() {
        let auth = authority();
        let token = auth.login("janedoe", "secret2").expect("valid credentials");
        assert_eq!(token, "tokenizedjanedoe");
        assert_eq!(auth.resolve(&token).map(|u| u.username), Some("janedoe".to_string()));
    }

    #[test]
    fn test_login_rejects_wrong_password_and_unknown_user() {
        let auth = authority();
        assert!(auth.login("johndoe", "secret2").is_none());
        assert!(auth.login("nobody", "secret").is_none());
    }
}
