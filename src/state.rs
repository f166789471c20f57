// state.rs: Display state, theme colors and the response handed to the bar

use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// What the bar should convey about the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    /// Paused, stopped, or reachable without a usable track.
    Paused,
    /// Player not on the bus.
    Offline,
}

/// Status colors. The specific colors fall back to the generic
/// good/degraded/bad tiers when the theme leaves them unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub playing: Option<String>,
    pub paused: Option<String>,
    pub offline: Option<String>,
    pub good: String,
    pub degraded: String,
    pub bad: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            playing: None,
            paused: None,
            offline: None,
            good: "#00FF00".to_string(),
            degraded: "#FFFF00".to_string(),
            bad: "#FF0000".to_string(),
        }
    }
}

impl Theme {
    pub fn color_for(&self, state: PlayerState) -> &str {
        match state {
            PlayerState::Playing => self.playing.as_deref().unwrap_or(&self.good),
            PlayerState::Paused => self.paused.as_deref().unwrap_or(&self.degraded),
            PlayerState::Offline => self.offline.as_deref().unwrap_or(&self.bad),
        }
    }
}

/// One poll result as the bar consumes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub full_text: String,
    pub color: String,
    /// Unix timestamp (seconds) before which the bar should not poll again.
    pub cached_until: u64,
}

impl Response {
    pub fn new(full_text: String, color: String, cache_timeout: Duration) -> Self {
        Self {
            full_text,
            color,
            cached_until: time_in(cache_timeout),
        }
    }
}

/// Unix time `after` from now, in whole seconds.
pub fn time_in(after: Duration) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now + after).as_secs()
}
