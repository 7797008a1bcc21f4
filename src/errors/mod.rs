pub mod types;
pub mod classification;
pub mod retry;

pub use types::RemediationError;
pub use classification::ErrorClassification;
pub use retry::{RetryConfig, with_retry};

pub type Result<T, E = RemediationError> = std::result::Result<T, E>;
