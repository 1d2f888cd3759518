//! Timing configuration of the gesture classifier.
use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Timing thresholds used to disambiguate gestures.
///
/// In TOML, durations are specified in milliseconds and every field is optional:
///
/// ```toml
/// click_window_ms = 250
/// repeat_interval_ms = 50
/// drag_pause_ms = 250
/// wheel_reset_ms = 200
/// any_click_on_release = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    /// How long a press has to be held before it becomes a drag. After a release, how long to
    /// wait for a second press before a single click is reported.
    #[serde(rename = "click_window_ms", with = "millis")]
    pub click_window: Duration,
    /// The period of [`crate::Gesture::MouseRepeat`] while the pointer is held.
    #[serde(rename = "repeat_interval_ms", with = "millis")]
    pub repeat_interval: Duration,
    /// The stillness needed during a drag to report a [`crate::Gesture::DragPause`].
    #[serde(rename = "drag_pause_ms", with = "millis")]
    pub drag_pause: Duration,
    /// Without wheel input for this long, the wheel normalization factor is reset.
    #[serde(rename = "wheel_reset_ms", with = "millis")]
    pub wheel_reset: Duration,
    /// Report [`crate::Gesture::AnyClick`] immediately on the first release instead of waiting
    /// for [`crate::Gesture::SingleClick`].
    pub any_click_on_release: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_window: Self::DEFAULT_CLICK_WINDOW,
            repeat_interval: Self::DEFAULT_REPEAT_INTERVAL,
            drag_pause: Self::DEFAULT_DRAG_PAUSE,
            wheel_reset: Self::DEFAULT_WHEEL_RESET,
            any_click_on_release: false,
        }
    }
}

impl GestureConfig {
    pub const DEFAULT_CLICK_WINDOW: Duration = Duration::from_millis(250);
    pub const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_millis(50);
    pub const DEFAULT_DRAG_PAUSE: Duration = Duration::from_millis(250);
    pub const DEFAULT_WHEEL_RESET: Duration = Duration::from_millis(200);

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml).context("Failed to parse gesture configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read gesture configuration `{}`", path.display()))?;
        Self::from_toml_str(&toml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.click_window.is_zero() {
            bail!("`click_window_ms` must be greater than zero");
        }
        // A zero interval would repeat forever without time advancing.
        if self.repeat_interval.is_zero() {
            bail!("`repeat_interval_ms` must be greater than zero");
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
