pub mod credentials;
pub mod sanitizer;

pub use credentials::{CredentialError, CredentialStore, Principal, Role};
pub use sanitizer::InvalidInput;
