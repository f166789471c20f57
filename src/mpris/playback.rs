//! Playback status querying for MPRIS.

use crate::mpris::connection::{MPRIS_PLAYER_INTERFACE, MprisError, PlayerObject};

/// Query the playback status for a player.
pub async fn get_playback_status<P: PlayerObject>(player: &P) -> Result<String, MprisError> {
    let val = player
        .get_property(MPRIS_PLAYER_INTERFACE, "PlaybackStatus")
        .await?;
    String::try_from(val).map_err(|e| MprisError::Decode {
        property: "PlaybackStatus".to_string(),
        reason: e.to_string(),
    })
}

/// Only an exact `Playing` counts; `Paused`, `Stopped` and anything else do not.
pub fn is_playing(status: &str) -> bool {
    status.trim() == "Playing"
}
