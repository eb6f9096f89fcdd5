use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{PasswordHashConfig, SecurityConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account resolved from the request credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Hashing failures at startup. Verification failures are just `None`.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid password hash parameters: {0}")]
    InvalidParams(String),

    #[error("password hashing failed: {0}")]
    HashingFailed(String),
}

struct StoredAccount {
    /// PHC string, e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`
    hash: String,
    roles: Vec<Role>,
}

/// Fixed set of accounts built at startup. Only Argon2id hashes are kept.
pub struct CredentialStore {
    hasher: Argon2<'static>,
    accounts: HashMap<String, StoredAccount>,
    /// Verified against for unknown usernames so both paths cost one hash.
    decoy: String,
}

impl CredentialStore {
    pub fn new(params: &PasswordHashConfig) -> Result<Self, CredentialError> {
        let params = Params::new(params.memory_kib, params.iterations, 1, None)
            .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;
        let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy = hash_password(&hasher, &Uuid::new_v4().to_string())?;

        Ok(Self {
            hasher,
            accounts: HashMap::new(),
            decoy,
        })
    }

    /// Admin gets ADMIN and USER, the user account gets USER. Accounts
    /// without a password are skipped; config validation rejects those first.
    pub fn from_config(security: &SecurityConfig) -> Result<Self, CredentialError> {
        let mut store = Self::new(&security.password_hash)?;
        if let Some(password) = security.admin.password.as_deref() {
            store.add_account(&security.admin.username, password, &[Role::Admin, Role::User])?;
        }
        if let Some(password) = security.user.password.as_deref() {
            store.add_account(&security.user.username, password, &[Role::User])?;
        }
        Ok(store)
    }

    pub fn add_account(&mut self, username: &str, password: &str, roles: &[Role]) -> Result<(), CredentialError> {
        let account = StoredAccount {
            hash: hash_password(&self.hasher, password)?,
            roles: roles.to_vec(),
        };
        self.accounts.insert(username.to_string(), account);
        Ok(())
    }

    /// Returns the principal when the username exists and the password matches.
    pub fn verify(&self, username: &str, password: &str) -> Option<Principal> {
        match self.accounts.get(username) {
            Some(account) if self.password_matches(password, &account.hash) => Some(Principal {
                username: username.to_string(),
                roles: account.roles.clone(),
            }),
            Some(_) => None,
            None => {
                self.password_matches(password, &self.decoy);
                None
            }
        }
    }

    fn password_matches(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self.hasher.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::error!("Stored password hash is unreadable: {}", e);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

fn hash_password(hasher: &Argon2<'_>, password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::HashingFailed(e.to_string()))
}
