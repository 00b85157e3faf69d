//! MPRIS notification surface.
//!
//! Publishes the mixer's [`NowPlaying`] summary on the session bus and turns
//! media-key calls into [`ControlCmd`]s for the event loop. The service runs
//! on its own thread; the mixer never waits on it.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use async_io::block_on;
use tracing::{debug, info, warn};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::mixer::{NowPlaying, PlaybackStatus};

const BUS_NAME: &str = "org.mpris.MediaPlayer2.escape";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";
const ARTIST: &str = "Ambient Sound Mixer";
const ALBUM: &str = "Nature's Calm, Anywhere";

/// How often the service thread checks for updates while idle.
const POLL: Duration = Duration::from_millis(250);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
}

#[derive(Debug, Default)]
struct SharedState {
    now_playing: NowPlaying,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl MprisHandle {
    /// Store `now_playing` and announce it if it differs from the last one.
    pub fn publish(&self, now_playing: &NowPlaying) {
        let changed = match self.state.lock() {
            Ok(mut s) if s.now_playing != *now_playing => {
                s.now_playing = now_playing.clone();
                true
            }
            _ => false,
        };
        if changed {
            if let Some(notify) = &self.notify {
                let _ = notify.send(());
            }
        }
    }

    /// Stop the service and release the bus name.
    pub fn dispose(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender wakes the service thread with a disconnect.
        self.notify.take();
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl Drop for MprisHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "Escape"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {}

    fn previous(&self) {}

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.now_playing.status {
            PlaybackStatus::None => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let title = self
            .state
            .lock()
            .map(|s| s.now_playing.title.clone())
            .unwrap_or_default();

        let mut map = HashMap::new();
        let mut put = |key: &str, value: Value<'_>| {
            if let Ok(v) = OwnedValue::try_from(value) {
                map.insert(key.to_string(), v);
            }
        };
        if let Ok(path) = ObjectPath::try_from(NO_TRACK) {
            put("mpris:trackid", Value::from(path));
        }
        put("xesam:title", Value::from(title));
        put("xesam:artist", Value::from(vec![ARTIST.to_string()]));
        put("xesam:album", Value::from(ALBUM));
        map
    }
}

/// Start the MPRIS service. Failing to reach the session bus is logged and
/// the returned handle simply publishes into nothing.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify, notified) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    let join = std::thread::spawn(move || {
        let Some((_connection, player)) = block_on(register(tx, state_for_thread)) else {
            return;
        };
        info!("MPRIS service registered as {BUS_NAME}");
        serve(&player, &notified);
        debug!("MPRIS service stopped");
    });

    MprisHandle {
        state,
        notify: Some(notify),
        join: Some(join),
    }
}

async fn register(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
) -> Option<(Connection, InterfaceRef<PlayerIface>)> {
    let connection = match Connection::session().await {
        Ok(c) => c,
        Err(e) => {
            warn!("MPRIS: failed to connect to session bus: {e}");
            return None;
        }
    };

    if let Err(e) = connection.request_name(BUS_NAME).await {
        warn!("MPRIS: failed to acquire name: {e}");
        return None;
    }

    let object_server = connection.object_server();

    if let Err(e) = object_server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await {
        warn!("MPRIS: failed to register root iface: {e}");
        return None;
    }

    if let Err(e) = object_server.at(OBJECT_PATH, PlayerIface { tx, state }).await {
        warn!("MPRIS: failed to register player iface: {e}");
        return None;
    }

    match object_server.interface::<_, PlayerIface>(OBJECT_PATH).await {
        Ok(player) => Some((connection, player)),
        Err(e) => {
            warn!("MPRIS: player iface missing after registration: {e}");
            None
        }
    }
}

/// Emit PropertiesChanged for every update until the handle goes away.
fn serve(player: &InterfaceRef<PlayerIface>, notified: &Receiver<()>) {
    loop {
        match notified.recv_timeout(POLL) {
            Ok(()) => {
                // Coalesce bursts into one signal.
                while notified.try_recv().is_ok() {}
                if let Err(e) = block_on(emit_changes(player)) {
                    debug!("MPRIS: failed to emit PropertiesChanged: {e}");
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

async fn emit_changes(player: &InterfaceRef<PlayerIface>) -> zbus::Result<()> {
    let iface = player.get().await;
    let emitter = player.signal_emitter();
    iface.playback_status_changed(emitter).await?;
    iface.metadata_changed(emitter).await?;
    Ok(())
}
