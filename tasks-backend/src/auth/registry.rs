//! Known-identities registry, optionally loaded from a RON file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::hash_password;
use crate::models::UserInDb;

/// On-disk shape of the users file, e.g.
/// `(users: [(username: "johndoe", hashed_password: "hashedsecret")])`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersFile {
    #[serde(default)]
    pub users: Vec<UserInDb>,
}

#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    users: HashMap<String, UserInDb>,
}

impl UserRegistry {
    pub fn from_users(users: impl IntoIterator<Item = UserInDb>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|u| (u.username.clone(), u))
                .collect(),
        }
    }

    /// The two built-in demo accounts
    pub fn demo() -> Self {
        Self::from_users([
            UserInDb {
                username: "johndoe".to_string(),
                hashed_password: hash_password("secret"),
            },
            UserInDb {
                username: "janedoe".to_string(),
                hashed_password: hash_password("secret2"),
            },
        ])
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read users file {:?}: {}", path, e))?;
        let file: UsersFile = ron::from_str(&content)
            .map_err(|e| format!("Failed to parse users file {:?}: {}", path, e))?;
        Ok(Self::from_users(file.users))
    }

    /// Load from `path` when given, falling back to the demo accounts on any error
    pub fn load_or_demo(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("[AUTH] No users file configured, using demo accounts");
            return Self::demo();
        };
        match Self::load(path) {
            Ok(registry) => {
                log::info!("[AUTH] Loaded {} users from {:?}", registry.len(), path);
                registry
            }
            Err(e) => {
                log::warn!("[AUTH] {}, using demo accounts", e);
                Self::demo()
            }
        }
    }

    pub fn get(&self, username: &str) -> Option<&UserInDb> {
        self.users.get(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}
