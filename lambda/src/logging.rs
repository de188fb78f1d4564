//! Logging setup and the per-invocation level override.
//!
//! The override is request-scoped: an invocation whose stage variables set `LEVEL` runs
//! under its own thread-local `tracing` dispatcher. Nothing process-wide is swapped, so
//! concurrent invocations on other threads keep their own levels, and the previous
//! dispatcher comes back on every exit path, including panics.

use tracing::level_filters::LevelFilter;
use tracing::{warn, Dispatch, Subscriber};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Parses a level name (`debug`, `WARNING`, ...) or a number on the 10–50 scale used by
/// the `LEVEL` variable.
///
/// ```
/// use lambda_adapter::logging::parse_level;
/// use tracing::level_filters::LevelFilter;
///
/// assert_eq!(parse_level("Warning"), Some(LevelFilter::WARN));
/// assert_eq!(parse_level("10"), Some(LevelFilter::DEBUG));
/// assert_eq!(parse_level("loud"), None);
/// ```
pub fn parse_level(raw: &str) -> Option<LevelFilter> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return Some(match n {
            0..=9 => LevelFilter::TRACE,
            10..=19 => LevelFilter::DEBUG,
            20..=29 => LevelFilter::INFO,
            30..=39 => LevelFilter::WARN,
            _ => LevelFilter::ERROR,
        });
    }
    match raw.to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "error" | "critical" | "fatal" => Some(LevelFilter::ERROR),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

/// Installs the process-wide subscriber at the configured ambient level.
///
/// `RUST_LOG`, when set, takes precedence. Lines carry no timestamp because the Lambda
/// log sink adds one. Does nothing if a global subscriber is already installed.
pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(config.ambient_level().into()));
    let _ = subscriber(filter).try_init();
}

// Global and per-invocation output share one format.
fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .finish()
}

/// The log level in force for one invocation.
///
/// Created at invocation entry from the event's override, consumed when the invocation
/// returns.
#[derive(Debug)]
pub struct LogScope {
    saved_level: Option<LevelFilter>,
    dispatch: Option<(LevelFilter, Dispatch)>,
}

impl LogScope {
    /// A scope that leaves the ambient level alone.
    pub fn ambient() -> Self {
        LogScope {
            saved_level: None,
            dispatch: None,
        }
    }

    /// A scope applying `override_level` on top of `ambient`. Unparsable overrides are
    /// logged and ignored.
    ///
    /// The override replaces the default level only: per-target directives from
    /// `RUST_LOG` still apply to their targets.
    pub fn new(ambient: LevelFilter, override_level: Option<&str>) -> Self {
        LogScope::with_filter(ambient, override_level, || {
            EnvFilter::try_from_default_env().unwrap_or_default()
        })
    }

    fn with_filter(
        ambient: LevelFilter,
        override_level: Option<&str>,
        base: impl FnOnce() -> EnvFilter,
    ) -> Self {
        let Some(raw) = override_level else {
            return LogScope::ambient();
        };
        let Some(level) = parse_level(raw) else {
            warn!(override_level = raw, "ignoring unrecognized LEVEL override");
            return LogScope::ambient();
        };
        let filter = base().add_directive(level.into());
        LogScope {
            saved_level: Some(ambient),
            dispatch: Some((level, Dispatch::new(subscriber(filter)))),
        }
    }

    /// The ambient level that the override replaced, if there is an override.
    pub fn saved_level(&self) -> Option<LevelFilter> {
        self.saved_level
    }

    /// The overriding level, if any.
    pub fn level(&self) -> Option<LevelFilter> {
        self.dispatch.as_ref().map(|(level, _)| *level)
    }

    /// Runs `f` with this scope's level in force on the current thread.
    pub fn run<T>(self, f: impl FnOnce() -> T) -> T {
        match self.dispatch {
            Some((_, dispatch)) => tracing::dispatcher::with_default(&dispatch, f),
            None => f(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn numeric_levels() {
        assert_eq!(parse_level("5"), Some(LevelFilter::TRACE));
        assert_eq!(parse_level("20"), Some(LevelFilter::INFO));
        assert_eq!(parse_level("30"), Some(LevelFilter::WARN));
        assert_eq!(parse_level("50"), Some(LevelFilter::ERROR));
    }

    #[test]
    fn named_levels() {
        assert_eq!(parse_level(" DEBUG "), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level("critical"), Some(LevelFilter::ERROR));
        assert_eq!(parse_level("off"), Some(LevelFilter::OFF));
        assert_eq!(parse_level(""), None);
    }

    #[test]
    fn no_override_saves_nothing() {
        let scope = LogScope::new(LevelFilter::DEBUG, None);
        assert_eq!(scope.saved_level(), None);
        assert_eq!(scope.level(), None);
        assert_eq!(scope.run(|| 7), 7);
    }

    #[test]
    fn bad_override_is_ignored() {
        let scope = LogScope::new(LevelFilter::DEBUG, Some("chatty"));
        assert_eq!(scope.saved_level(), None);
        assert_eq!(scope.level(), None);
    }

    #[test]
    fn override_applies_inside_the_scope_only() {
        let scope = LogScope::new(LevelFilter::DEBUG, Some("ERROR"));
        assert_eq!(scope.saved_level(), Some(LevelFilter::DEBUG));
        assert_eq!(scope.level(), Some(LevelFilter::ERROR));

        let (info, error) =
            scope.run(|| (tracing::enabled!(Level::INFO), tracing::enabled!(Level::ERROR)));
        assert!(!info);
        assert!(error);
    }

    #[test]
    fn raised_override_enables_debug() {
        let scope = LogScope::new(LevelFilter::ERROR, Some("debug"));
        assert!(scope.run(|| tracing::enabled!(Level::DEBUG)));
    }

    #[test]
    fn override_keeps_target_directives() {
        let scope = LogScope::with_filter(LevelFilter::INFO, Some("debug"), || {
            EnvFilter::new("noisy_dependency=off")
        });
        let (debug, noisy) = scope.run(|| {
            (
                tracing::enabled!(Level::DEBUG),
                tracing::enabled!(target: "noisy_dependency", Level::ERROR),
            )
        });
        assert!(debug);
        assert!(!noisy);
    }

    #[test]
    fn dispatcher_is_restored_after_a_panic() {
        let scope = LogScope::new(LevelFilter::ERROR, Some("debug"));
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scope.run(|| panic!("handler blew up"))
        }));
        assert!(outcome.is_err());
        // Back on the thread's no-op default.
        assert!(!tracing::enabled!(Level::DEBUG));
    }
}
