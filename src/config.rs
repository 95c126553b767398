use derive_ex::derive_ex;
use parse_display::Display;
use serde::Deserialize;

#[cfg(test)]
mod tests;

/// Settings for a [`Hookstores`](crate::Hookstores) instance.
///
/// Missing fields take their default values when deserialized.
#[derive_ex(Default)]
#[default(Self::new())]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name used in log lines.
    pub label: String,

    /// Install a [`LoggingMiddleware`](crate::LoggingMiddleware) as the outermost middleware.
    pub log_actions: bool,
    pub log_level: LogLevel,
}

impl Config {
    pub fn new() -> Self {
        Self {
            label: "hookstores".to_owned(),
            log_actions: false,
            log_level: LogLevel::Debug,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Deserialize)]
#[display(style = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
}
