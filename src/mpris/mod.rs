//! MPRIS module: re-exports and module declarations for submodules.

pub mod connection;
pub mod metadata;
pub mod playback;
#[cfg(test)]
pub mod testing;

pub use connection::{MprisError, PlayerBus, PlayerObject, SessionBus};
pub use metadata::{TrackMetadata, get_metadata};
pub use playback::{get_playback_status, is_playing};
