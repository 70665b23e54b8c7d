mod dash;
mod oauth;

pub use dash::{ApiErrorBody, ApiErrorObject, DashError};
pub use oauth::OauthError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
