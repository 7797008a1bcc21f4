pub mod credentials;
pub mod parser;
pub mod types;

pub use credentials::Credentials;
pub use types::*;
pub use parser::{load_config, parse_config, parse_config_str};
