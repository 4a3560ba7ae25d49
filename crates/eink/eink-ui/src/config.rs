//! Frame loop configuration.

use std::time::Duration;

use eink_input::GestureConfig;

/// Tuning for [`crate::App`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use eink_ui::AppConfig;
///
/// let config = AppConfig::default().with_max_wait(Duration::from_secs(5));
/// assert_eq!(config.max_wait, Some(Duration::from_secs(5)));
/// assert_eq!(config.gestures.start_threshold, 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppConfig {
    /// Gesture recognition tuning, used once a gesture handler is installed.
    pub gestures: GestureConfig,

    /// Longest the loop blocks on input when no timer is due sooner.
    /// `None` waits until input arrives.
    pub max_wait: Option<Duration>,
}

impl AppConfig {
    /// Default gesture tuning, unbounded wait.
    pub const DEFAULT: Self = Self {
        gestures: GestureConfig::DEFAULT,
        max_wait: None,
    };

    /// Override the gesture tuning.
    #[must_use]
    pub const fn with_gestures(mut self, gestures: GestureConfig) -> Self {
        self.gestures = gestures;
        self
    }

    /// Cap the input wait.
    #[must_use]
    pub const fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Input wait for a loop whose next timer is `next_timer` away.
    pub fn wait_timeout(&self, next_timer: Option<Duration>) -> Option<Duration> {
        match (next_timer, self.max_wait) {
            (Some(timer), Some(max)) => Some(timer.min(max)),
            (timer, max) => timer.or(max),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
