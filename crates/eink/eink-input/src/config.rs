//! Gesture recognition tuning.

/// Tuning for [`crate::GestureController`].
///
/// # Example
///
/// ```
/// use eink_input::GestureConfig;
///
/// let config = GestureConfig::default().with_start_threshold(80);
/// assert_eq!(config.start_threshold, 80);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureConfig {
    /// Pixels any finger must travel on one axis before a multi-finger
    /// gesture starts. Reaching the threshold exactly counts.
    pub start_threshold: u32,

    /// Fewest simultaneous fingers that can start a swipe or pinch.
    pub min_fingers: usize,
}

impl GestureConfig {
    /// Default tuning: 50 px threshold, two fingers.
    pub const DEFAULT: Self = Self {
        start_threshold: 50,
        min_fingers: 2,
    };

    /// Override the start threshold.
    #[must_use]
    pub const fn with_start_threshold(mut self, threshold: u32) -> Self {
        self.start_threshold = threshold;
        self
    }

    /// Override the minimum finger count.
    #[must_use]
    pub const fn with_min_fingers(mut self, fingers: usize) -> Self {
        self.min_fingers = fingers;
        self
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
