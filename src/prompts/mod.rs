pub mod builder;

pub use builder::{fix_request, orchestrator_request};
