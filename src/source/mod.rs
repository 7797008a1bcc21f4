pub mod file;
pub mod mock;
pub mod provider;

pub use file::FileFindingSource;
pub use mock::MockScanner;
pub use provider::FindingSource;

use std::sync::Arc;
use std::time::Duration;
use crate::config::FlowConfig;

/// Pick the finding source named by the flow config: a findings file when one
/// is configured, otherwise the built-in mock scanner.
pub fn create_source(config: &FlowConfig) -> Arc<dyn FindingSource> {
    match &config.findings_file {
        Some(path) => Arc::new(FileFindingSource::new(path.clone())),
        None => Arc::new(
            MockScanner::sample().with_latency(Duration::from_millis(config.scan_latency_ms)),
        ),
    }
}
