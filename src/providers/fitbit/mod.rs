mod callback;
mod client;
mod credential;
mod endpoints;
mod manager;
mod store;

pub use callback::CallbackListener;
pub use client::FitbitClient;
pub use credential::Credential;
pub use manager::{CredentialManager, CredentialState, initial_state};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

pub const SERVICE: &str = "fitbit";
