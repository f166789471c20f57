//! Typed track metadata read from the player's `Metadata` property.

use crate::mpris::connection::{MPRIS_PLAYER_INTERFACE, MprisError, PlayerObject};
use std::collections::HashMap;
use std::time::Duration;
use zvariant::OwnedValue;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    pub title: String,
    /// First entry of `xesam:artist`.
    pub artist: String,
    /// Absent for streams and some players.
    pub album: Option<String>,
    pub length: Duration,
}

fn decode_err(property: &str, reason: impl ToString) -> MprisError {
    MprisError::Decode {
        property: property.to_string(),
        reason: reason.to_string(),
    }
}

fn dup(property: &str, val: &OwnedValue) -> Result<OwnedValue, MprisError> {
    val.try_clone().map_err(|e| decode_err(property, e))
}

/// Accept either `s` or the first element of `as`; players disagree on which to send.
fn first_string(key: &str, val: &OwnedValue) -> Result<Option<String>, MprisError> {
    if let Ok(s) = String::try_from(dup(key, val)?) {
        return Ok(Some(s));
    }
    Vec::<String>::try_from(dup(key, val)?)
        .map(|v| v.into_iter().next())
        .map_err(|e| decode_err(key, e))
}

fn length_micros(val: &OwnedValue) -> Result<Duration, MprisError> {
    if let Ok(i) = i64::try_from(dup("mpris:length", val)?) {
        return u64::try_from(i)
            .map(Duration::from_micros)
            .map_err(|_| decode_err("mpris:length", format!("negative length {i}")));
    }
    u64::try_from(dup("mpris:length", val)?)
        .map(Duration::from_micros)
        .map_err(|e| decode_err("mpris:length", e))
}

/// Extract metadata fields from a D-Bus property map.
///
/// Title, artist and length are required; a player that has no track loaded
/// usually reports an empty map, which fails here.
pub fn extract_metadata(map: &HashMap<String, OwnedValue>) -> Result<TrackMetadata, MprisError> {
    let title = match map.get("xesam:title") {
        Some(v) => {
            String::try_from(dup("xesam:title", v)?).map_err(|e| decode_err("xesam:title", e))?
        }
        None => return Err(MprisError::MissingField("xesam:title")),
    };
    let artist = map
        .get("xesam:artist")
        .map(|v| first_string("xesam:artist", v))
        .transpose()?
        .flatten()
        .ok_or(MprisError::MissingField("xesam:artist"))?;
    let album = map
        .get("xesam:album")
        .map(|v| first_string("xesam:album", v))
        .transpose()?
        .flatten();
    let length = map
        .get("mpris:length")
        .map(length_micros)
        .transpose()?
        .ok_or(MprisError::MissingField("mpris:length"))?;

    Ok(TrackMetadata {
        title,
        artist,
        album,
        length,
    })
}

/// Query the `Metadata` property of a player.
pub async fn get_metadata<P: PlayerObject>(player: &P) -> Result<TrackMetadata, MprisError> {
    let val = player.get_property(MPRIS_PLAYER_INTERFACE, "Metadata").await?;
    let map = HashMap::<String, OwnedValue>::try_from(val).map_err(|e| decode_err("Metadata", e))?;
    extract_metadata(&map)
}
