//! Logging setup

use tracing_subscriber::EnvFilter;

/// Where log lines end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// A terminal or container log collector
    Terminal,
    /// CloudWatch via the Lambda runtime, which stamps lines itself
    Lambda,
}

/// Installs the global `tracing` subscriber.
///
/// Invalid filter directives fall back to `info`. Calling this more than once
/// leaves the first subscriber in place.
pub fn init(directives: &str, target: LogTarget) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match target {
        LogTarget::Terminal => builder.try_init(),
        LogTarget::Lambda => builder.with_ansi(false).without_time().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
