#![allow(dead_code)]

use restwire::dispatcher::Dispatcher;
use restwire::runtime_config::RuntimeConfig;
use std::io::Write;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary and size coroutine stacks.
pub fn setup() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
        may::config().set_stack_size(0x10000);
    });
}

pub fn dispatcher() -> Dispatcher {
    setup();
    Dispatcher::new(RuntimeConfig::default())
}

pub mod temp_files {
    use super::Write;
    use tempfile::NamedTempFile;

    /// A manifest file with the given extension that lives as long as the handle.
    pub fn manifest(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("restwire_manifest_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}
