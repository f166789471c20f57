//! In-memory stand-ins for the session bus.

use crate::mpris::connection::{MPRIS_PLAYER_INTERFACE, MprisError, PlayerBus, PlayerObject};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use zvariant::{OwnedValue, Value};

pub fn owned<'a>(v: impl Into<Value<'a>>) -> OwnedValue {
    OwnedValue::try_from(v.into()).unwrap()
}

fn copy_map(map: &HashMap<String, OwnedValue>) -> HashMap<String, OwnedValue> {
    map.iter()
        .map(|(k, v)| (k.clone(), v.try_clone().unwrap()))
        .collect()
}

pub fn rick_astley() -> HashMap<String, OwnedValue> {
    HashMap::from([
        ("xesam:title".to_string(), owned("Never Gonna Give You Up (Remastered 2017)")),
        (
            "xesam:artist".to_string(),
            owned(vec!["Rick Astley".to_string(), "Someone Else".to_string()]),
        ),
        ("xesam:album".to_string(), owned("Whenever You Need Somebody - 2022 Remaster")),
        ("mpris:length".to_string(), owned(213_000_000i64)),
    ])
}

pub struct FakePlayer {
    metadata: Option<HashMap<String, OwnedValue>>,
    status: Option<&'static str>,
}

impl PlayerObject for FakePlayer {
    async fn get_property(&self, interface: &str, property: &str) -> Result<OwnedValue, MprisError> {
        assert_eq!(interface, MPRIS_PLAYER_INTERFACE);
        let missing = || MprisError::Fdo(zbus::fdo::Error::UnknownProperty(property.to_string()));
        match property {
            "Metadata" => {
                let map = self.metadata.as_ref().ok_or_else(missing)?;
                let dict: HashMap<&str, Value<'_>> = map
                    .iter()
                    .map(|(k, v)| (k.as_str(), Value::from(v.try_clone().unwrap())))
                    .collect();
                Ok(owned(dict))
            }
            "PlaybackStatus" => self.status.map(|s| owned(s)).ok_or_else(missing),
            _ => Err(missing()),
        }
    }
}

/// Bus with at most one registered player. Counts lookups.
pub struct FakeBus {
    player: Option<(Option<HashMap<String, OwnedValue>>, Option<&'static str>)>,
    pub lookups: Arc<AtomicUsize>,
}

impl FakeBus {
    pub fn down() -> Self {
        Self {
            player: None,
            lookups: Arc::default(),
        }
    }

    pub fn up(metadata: Option<HashMap<String, OwnedValue>>, status: Option<&'static str>) -> Self {
        Self {
            player: Some((metadata, status)),
            lookups: Arc::default(),
        }
    }
}

impl PlayerBus for FakeBus {
    type Player = FakePlayer;

    async fn lookup(&self, service: &str) -> Result<FakePlayer, MprisError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let (metadata, status) = self
            .player
            .as_ref()
            .ok_or_else(|| MprisError::ServiceNotFound(service.to_string()))?;
        Ok(FakePlayer {
            metadata: metadata.as_ref().map(copy_map),
            status: *status,
        })
    }
}
