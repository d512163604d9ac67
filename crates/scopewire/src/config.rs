//! Options held by a root scope and shared with all of its descendants

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::naming::NamingStrategy;

/// What happens to the previous slot when a service is overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverridePolicy {
    /// Drop the previous slot without calling any hook.
    #[default]
    Replace,
    /// Run the shutdown hook of the previous instance, if it was built and
    /// declared one, then replace it. Hook failures are logged.
    ShutdownPrevious,
}

/// Receives one human-readable line per container event.
#[derive(Clone)]
pub struct LogSink(Arc<dyn Fn(&str) + Send + Sync>);

impl LogSink {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn log(&self, line: &str) {
        (self.0)(line)
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogSink(..)")
    }
}

/// Options of a scope tree.
///
/// ```toml
/// naming = "fully_qualified"
/// override_policy = "shutdown_previous"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorOptions {
    pub naming: NamingStrategy,
    pub override_policy: OverridePolicy,
    #[serde(skip)]
    pub log_sink: Option<LogSink>,
}

impl InjectorOptions {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_override_policy(mut self, policy: OverridePolicy) -> Self {
        self.override_policy = policy;
        self
    }

    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub(crate) fn logf(&self, line: impl FnOnce() -> String) {
        if let Some(sink) = &self.log_sink {
            sink.log(&line());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let opts = InjectorOptions::default();
        assert_eq!(opts.naming, NamingStrategy::FullyQualified);
        assert_eq!(opts.override_policy, OverridePolicy::Replace);
        assert!(opts.log_sink.is_none());
    }

    #[test]
    fn test_from_toml() {
        let opts = InjectorOptions::from_toml_str(
            "naming = \"short\"\noverride_policy = \"shutdown_previous\"\n",
        )
        .unwrap();
        assert_eq!(opts.naming, NamingStrategy::Short);
        assert_eq!(opts.override_policy, OverridePolicy::ShutdownPrevious);

        let partial = InjectorOptions::from_toml_str("naming = \"short\"").unwrap();
        assert_eq!(partial.override_policy, OverridePolicy::Replace);
    }

    #[test]
    fn test_from_toml_rejects_unknown_variant() {
        let result = InjectorOptions::from_toml_str("naming = \"bogus\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "override_policy = \"shutdown_previous\"").unwrap();

        let opts = InjectorOptions::from_file(file.path()).unwrap();
        assert_eq!(opts.override_policy, OverridePolicy::ShutdownPrevious);

        let missing = InjectorOptions::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_log_sink_receives_lines() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let opts = InjectorOptions::default()
            .with_log_sink(LogSink::new(move |line| captured.lock().push(line.to_string())));

        opts.logf(|| "hello".to_string());

        assert_eq!(lines.lock().as_slice(), ["hello".to_string()]);
    }
}
