use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Output goes to stderr: the MCP server uses
/// stdout as its protocol channel and the chat client uses it for replies.
///
/// `RUST_LOG` takes precedence over `default_directive`. Calling this twice is
/// harmless; the second call is ignored.
pub fn init(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
