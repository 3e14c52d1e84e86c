use serde::{Deserialize, Serialize};

/// Public view of a known identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

/// A known identity as held in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInDb {
    pub username: String,
    pub hashed_password: String,
}

impl From<&UserInDb> for User {
    fn from(user: &UserInDb) -> Self {
        Self {
            username: user.username.clone(),
        }
    }
}

/// Body returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}
