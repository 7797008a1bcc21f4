pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod flow;
pub mod models;
pub mod notify;
pub mod poll;
pub mod prompts;
pub mod reporting;
pub mod scheduler;
pub mod source;
