//! Turns one snapshot of the player into the text and color shown in the bar.

use crate::mpris::{self, MprisError, PlayerBus, PlayerObject, TrackMetadata};
use crate::sanitize::Sanitizer;
use crate::state::{PlayerState, Response, Theme};
use crate::text_utils::{format_duration, render_template};
use std::time::Duration;

pub const DEFAULT_SERVICE: &str = "org.mpris.MediaPlayer2.MellowPlayer";

/// Static formatter settings, fixed once the configuration is validated.
#[derive(Debug, Clone)]
pub struct MetadataFormatter {
    pub service: String,
    pub format: String,
    pub format_down: String,
    pub format_stopped: String,
    /// `None` when title sanitization is disabled.
    pub sanitizer: Option<Sanitizer>,
    pub theme: Theme,
    pub cache_timeout: Duration,
}

struct Snapshot {
    track: TrackMetadata,
    status: String,
}

impl MetadataFormatter {
    /// Poll the player once and return the display text with its state.
    ///
    /// Never fails: a missing player yields the down text, a reachable player
    /// without a usable track yields the stopped text.
    pub async fn poll_state<B: PlayerBus>(&self, bus: &B) -> (String, PlayerState) {
        let player = match bus.lookup(&self.service).await {
            Ok(player) => player,
            Err(e) => {
                tracing::debug!(service = %self.service, error = %e, "Player not reachable");
                return (self.format_down.clone(), PlayerState::Offline);
            }
        };

        match read_snapshot(&player).await {
            Ok(snap) => {
                let state = if mpris::is_playing(&snap.status) {
                    PlayerState::Playing
                } else {
                    PlayerState::Paused
                };
                (self.render(&snap.track), state)
            }
            Err(e) => {
                tracing::debug!(service = %self.service, error = %e, "No usable track");
                (self.format_stopped.clone(), PlayerState::Paused)
            }
        }
    }

    /// Poll the player once and return `(text, color)`.
    pub async fn poll<B: PlayerBus>(&self, bus: &B) -> (String, String) {
        let (text, state) = self.poll_state(bus).await;
        (text, self.theme.color_for(state).to_string())
    }

    /// Poll and package the result with the next allowed poll time.
    pub async fn response<B: PlayerBus>(&self, bus: &B) -> Response {
        let (text, color) = self.poll(bus).await;
        Response::new(text, color, self.cache_timeout)
    }

    fn clean(&self, text: &str) -> String {
        match &self.sanitizer {
            Some(s) => s.sanitize(text),
            None => text.to_string(),
        }
    }

    /// Fill the normal format template from track metadata.
    pub fn render(&self, track: &TrackMetadata) -> String {
        let title = self.clean(&track.title);
        let album = track.album.as_deref().map(|a| self.clean(a));
        let time = format_duration(track.length);

        render_template(&self.format, |name: &str| match name {
            "artist" => Some(Some(track.artist.as_str())),
            "title" => Some(Some(title.as_str())),
            "album" => Some(album.as_deref()),
            "time" => Some(Some(time.as_str())),
            _ => None,
        })
    }
}

async fn read_snapshot<P: PlayerObject>(player: &P) -> Result<Snapshot, MprisError> {
    let track = mpris::get_metadata(player).await?;
    let status = mpris::get_playback_status(player).await?;
    Ok(Snapshot { track, status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpris::testing::{FakeBus, rick_astley};
    use crate::sanitize::DEFAULT_SANITIZE_WORDS;
    use std::collections::HashMap;

    fn formatter() -> MetadataFormatter {
        MetadataFormatter {
            service: DEFAULT_SERVICE.to_string(),
            format: "{artist} : {title}".to_string(),
            format_down: "MellowPlayer not running".to_string(),
            format_stopped: "MellowPlayer stopped".to_string(),
            sanitizer: Some(Sanitizer::new(DEFAULT_SANITIZE_WORDS).unwrap()),
            theme: Theme::default(),
            cache_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn playing_track_renders_sanitized_text() {
        let bus = FakeBus::up(Some(rick_astley()), Some("Playing"));
        let (text, color) = formatter().poll(&bus).await;
        assert_eq!(text, "Rick Astley : Never Gonna Give You Up");
        assert_eq!(color, "#00FF00");
    }

    #[tokio::test]
    async fn any_other_status_is_paused() {
        for status in ["Paused", "Stopped", "playing", "Buffering"] {
            let bus = FakeBus::up(Some(rick_astley()), Some(status));
            let (text, state) = formatter().poll_state(&bus).await;
            assert_eq!(text, "Rick Astley : Never Gonna Give You Up");
            assert_eq!(state, PlayerState::Paused, "status {status:?}");
        }
    }

    #[tokio::test]
    async fn unreachable_player_is_down() {
        let mut fmt = formatter();
        fmt.format = "{title}".to_string();
        fmt.sanitizer = None;
        let (text, color) = fmt.poll(&FakeBus::down()).await;
        assert_eq!(text, "MellowPlayer not running");
        assert_eq!(color, "#FF0000");
    }

    #[tokio::test]
    async fn reachable_player_without_track_is_stopped() {
        let cases = [
            FakeBus::up(None, Some("Playing")),
            FakeBus::up(Some(HashMap::new()), Some("Stopped")),
            FakeBus::up(Some(rick_astley()), None),
        ];
        for bus in cases {
            let (text, color) = formatter().poll(&bus).await;
            assert_eq!(text, "MellowPlayer stopped");
            assert_eq!(color, "#FFFF00");
        }
    }

    #[tokio::test]
    async fn renders_every_placeholder() {
        let mut fmt = formatter();
        fmt.format = "{title} by {artist} on {album} [{time}]".to_string();
        let bus = FakeBus::up(Some(rick_astley()), Some("Playing"));
        let (text, _) = fmt.poll(&bus).await;
        assert_eq!(
            text,
            "Never Gonna Give You Up by Rick Astley on Whenever You Need Somebody [0:03:33]"
        );
    }

    #[tokio::test]
    async fn sanitization_can_be_disabled() {
        let mut fmt = formatter();
        fmt.sanitizer = None;
        let bus = FakeBus::up(Some(rick_astley()), Some("Playing"));
        let (text, _) = fmt.poll(&bus).await;
        assert_eq!(text, "Rick Astley : Never Gonna Give You Up (Remastered 2017)");
    }

    #[tokio::test]
    async fn missing_album_renders_empty() {
        let mut md = rick_astley();
        md.remove("xesam:album");
        let mut fmt = formatter();
        fmt.format = "{artist} - {album}".to_string();
        let (text, _) = fmt.poll(&FakeBus::up(Some(md), Some("Playing"))).await;
        assert_eq!(text, "Rick Astley - ");
    }

    #[tokio::test]
    async fn themed_colors_override_tiers() {
        let mut fmt = formatter();
        fmt.theme.playing = Some("#1DB954".to_string());
        fmt.theme.paused = Some("#888888".to_string());
        fmt.theme.offline = Some("#444444".to_string());

        let bus = FakeBus::up(Some(rick_astley()), Some("Playing"));
        assert_eq!(fmt.poll(&bus).await.1, "#1DB954");
        let bus = FakeBus::up(None, Some("Playing"));
        assert_eq!(fmt.poll(&bus).await.1, "#888888");
        assert_eq!(fmt.poll(&FakeBus::down()).await.1, "#444444");
    }

    #[tokio::test]
    async fn response_carries_deadline() {
        let bus = FakeBus::up(Some(rick_astley()), Some("Playing"));
        let before = crate::state::time_in(Duration::ZERO);
        let resp = formatter().response(&bus).await;
        assert_eq!(resp.full_text, "Rick Astley : Never Gonna Give You Up");
        assert_eq!(resp.color, "#00FF00");
        assert!(resp.cached_until >= before + 5);
    }
}
