//! Coordinator configuration.

use bgdl_core::{DEFAULT_TEMP_SUFFIX, StatusMask};

/// Title attached to every transfer request.
pub const DEFAULT_REQUEST_TITLE: &str = "bgdl background download";

/// Configuration for creating a lifecycle coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Suffix appended to the final path to form the engine's write target.
    pub temp_suffix: String,
    /// Title given to engine requests.
    pub request_title: String,
    /// Engine statuses swept when a start replaces downloads of the same URI.
    pub sweep_mask: StatusMask,
    /// Drop the completion subscription whenever the registry becomes empty.
    pub release_listener_when_idle: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            temp_suffix: DEFAULT_TEMP_SUFFIX.to_string(),
            request_title: DEFAULT_REQUEST_TITLE.to_string(),
            sweep_mask: StatusMask::SWEEP,
            release_listener_when_idle: true,
        }
    }
}

impl CoordinatorConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the temp-file suffix.
    #[must_use]
    pub fn with_temp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.temp_suffix = suffix.into();
        self
    }

    /// Set the request title.
    #[must_use]
    pub fn with_request_title(mut self, title: impl Into<String>) -> Self {
        self.request_title = title.into();
        self
    }

    /// Set the statuses swept on start.
    #[must_use]
    pub const fn with_sweep_mask(mut self, mask: StatusMask) -> Self {
        self.sweep_mask = mask;
        self
    }

    /// Keep or drop the completion subscription while idle.
    #[must_use]
    pub const fn with_release_listener_when_idle(mut self, release: bool) -> Self {
        self.release_listener_when_idle = release;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.temp_suffix, ".temp");
        assert_eq!(config.sweep_mask, StatusMask::SWEEP);
        assert!(config.release_listener_when_idle);
    }

    #[test]
    fn builder_overrides() {
        let config = CoordinatorConfig::new()
            .with_temp_suffix(".part")
            .with_request_title("host app")
            .with_sweep_mask(StatusMask::all())
            .with_release_listener_when_idle(false);

        assert_eq!(config.temp_suffix, ".part");
        assert_eq!(config.request_title, "host app");
        assert!(config.sweep_mask.contains(StatusMask::FAILED));
        assert!(!config.release_listener_when_idle);
    }
}
