//! D-Bus connection management and player lookup for MPRIS.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use zbus::Proxy;
use zbus::names::BusName;
use zvariant::OwnedValue;

pub const MPRIS_OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
pub const MPRIS_PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";
const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// Errors that can occur during MPRIS operations
#[derive(thiserror::Error, Debug)]
pub enum MprisError {
    #[error("D-Bus error: {0}")]
    ZBus(#[from] zbus::Error),
    #[error("D-Bus daemon error: {0}")]
    Fdo(#[from] zbus::fdo::Error),
    #[error("Failed to establish D-Bus connection")]
    NoConnection,
    #[error("Invalid bus name: {0}")]
    InvalidServiceName(String),
    #[error("Service {0} is not registered on the bus")]
    ServiceNotFound(String),
    #[error("D-Bus call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Property {property} has unexpected type: {reason}")]
    Decode { property: String, reason: String },
    #[error("Metadata field {0} is missing")]
    MissingField(&'static str),
}

/// Something that can locate a player object by its well-known bus name.
///
/// A failed lookup means the player is down; failures on the returned object
/// mean the player is up but has nothing usable to show.
#[allow(async_fn_in_trait)]
pub trait PlayerBus {
    type Player: PlayerObject;

    async fn lookup(&self, service: &str) -> Result<Self::Player, MprisError>;
}

/// A remote player object exposing `org.freedesktop.DBus.Properties.Get`.
#[allow(async_fn_in_trait)]
pub trait PlayerObject {
    async fn get_property(&self, interface: &str, property: &str) -> Result<OwnedValue, MprisError>;
}

/// Global D-Bus connection singleton
static DBUS_CONNECTION: OnceCell<Arc<zbus::Connection>> = OnceCell::const_new();

/// Get or create a shared D-Bus session connection
pub async fn get_dbus_conn() -> Result<Arc<zbus::Connection>, MprisError> {
    DBUS_CONNECTION
        .get_or_try_init(|| async {
            let conn = zbus::Connection::session()
                .await
                .map_err(|_| MprisError::NoConnection)?;
            Ok(Arc::new(conn))
        })
        .await
        .cloned()
}

async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, MprisError>
where
    F: Future<Output = Result<T, MprisError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| MprisError::Timeout(limit))?
}

/// The session bus, with every remote call bounded by `call_timeout`.
#[derive(Debug, Clone)]
pub struct SessionBus {
    call_timeout: Duration,
}

impl SessionBus {
    pub fn new(call_timeout: Duration) -> Self {
        Self { call_timeout }
    }

    async fn open_player(&self, name: BusName<'static>) -> Result<DbusPlayer, MprisError> {
        let conn = get_dbus_conn().await?;
        let dbus = zbus::fdo::DBusProxy::new(&conn).await?;
        if !dbus.name_has_owner(name.clone()).await? {
            return Err(MprisError::ServiceNotFound(name.to_string()));
        }
        // Use targeted Properties.Get to avoid triggering GetAll
        let props = Proxy::new(&conn, name, MPRIS_OBJECT_PATH, PROPERTIES_INTERFACE).await?;
        Ok(DbusPlayer {
            props,
            call_timeout: self.call_timeout,
        })
    }
}

impl PlayerBus for SessionBus {
    type Player = DbusPlayer;

    async fn lookup(&self, service: &str) -> Result<DbusPlayer, MprisError> {
        let name = BusName::try_from(service.to_string())
            .map_err(|e| MprisError::InvalidServiceName(format!("{service}: {e}")))?;
        with_timeout(self.call_timeout, self.open_player(name)).await
    }
}

/// Properties proxy for one player's `/org/mpris/MediaPlayer2` object.
#[derive(Clone)]
pub struct DbusPlayer {
    props: Proxy<'static>,
    call_timeout: Duration,
}

impl DbusPlayer {
    async fn get(&self, interface: &str, property: &str) -> Result<OwnedValue, MprisError> {
        let reply = self.props.call_method("Get", &(interface, property)).await?;
        Ok(reply.body().deserialize::<OwnedValue>()?)
    }
}

impl PlayerObject for DbusPlayer {
    async fn get_property(&self, interface: &str, property: &str) -> Result<OwnedValue, MprisError> {
        with_timeout(self.call_timeout, self.get(interface, property)).await
    }
}
