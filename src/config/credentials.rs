use crate::utils::error::{EtlError, Result};
use std::fmt;

pub const LOGIN_VAR: &str = "AVALARA_LOGIN";
pub const PASSWORD_VAR: &str = "AVALARA_PASSWORD";

/// Tax service account credentials.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Reads both credentials from the environment. Either one missing is fatal.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| EtlError::MissingCredential {
                    name: name.to_string(),
                })
        };

        Ok(Self {
            username: require(LOGIN_VAR)?,
            password: require(PASSWORD_VAR)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
