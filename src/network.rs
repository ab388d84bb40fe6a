//! LAN co-op contract
//!
//! Outbound state goes through a [`PeerLink`] once per frame. Inbound updates
//! may arrive at any time; they land in a last-value [`RemoteInbox`] and are
//! applied at the start of the next frame.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::state::{EnemyKind, GameState, RemotePlayer};

/// The host only shares enemies within this distance on both axes
pub const ENEMY_BROADCAST_RANGE: f32 = 2000.0;

/// Enemy as shared with the peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub pos: Vec2,
    pub kind: EnemyKind,
}

/// Wire message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetMessage {
    Player(RemotePlayer),
    Enemies { enemies: Vec<EnemySnapshot> },
}

impl NetMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Transport to the other player
pub trait PeerLink {
    fn send_player_state(&mut self, player: &RemotePlayer);
    fn send_enemy_state(&mut self, enemies: &[EnemySnapshot]);
    fn disconnect(&mut self);
}

#[derive(Debug, Default)]
struct Pending {
    latest: Option<RemotePlayer>,
    disconnected: bool,
}

/// Cloneable handle the transport pushes inbound updates into
#[derive(Debug, Clone, Default)]
pub struct RemoteInbox {
    pending: Rc<RefCell<Pending>>,
}

impl RemoteInbox {
    /// Newer updates overwrite older ones that were never applied
    pub fn on_remote_update(&self, player: RemotePlayer) {
        let mut pending = self.pending.borrow_mut();
        if !pending.disconnected {
            pending.latest = Some(player);
        }
    }

    pub fn on_disconnect(&self) {
        let mut pending = self.pending.borrow_mut();
        pending.latest = None;
        pending.disconnected = true;
    }

    /// Feed a raw wire message; enemy broadcasts are ignored on this side
    pub fn on_message(&self, text: &str) {
        match NetMessage::from_json(text) {
            Ok(NetMessage::Player(player)) => self.on_remote_update(player),
            Ok(NetMessage::Enemies { .. }) => {}
            Err(e) => log::warn!("Dropping malformed peer message: {}", e),
        }
    }
}

/// Per-session co-op driver
pub struct NetSync {
    link: Box<dyn PeerLink>,
    is_host: bool,
    connected: bool,
    inbox: RemoteInbox,
}

impl NetSync {
    pub fn new(link: Box<dyn PeerLink>, is_host: bool) -> Self {
        log::info!("LAN session started ({})", if is_host { "host" } else { "guest" });
        Self {
            link,
            is_host,
            connected: true,
            inbox: RemoteInbox::default(),
        }
    }

    pub fn inbox(&self) -> RemoteInbox {
        self.inbox.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// Apply whatever arrived since the previous frame.
    ///
    /// A disconnect is final: the remote player is cleared and nothing that
    /// arrives afterwards is applied.
    pub fn apply_pending(&mut self, state: &mut GameState) {
        let mut pending = self.inbox.pending.borrow_mut();
        if pending.disconnected && self.connected {
            log::info!("Remote player disconnected");
            self.connected = false;
        }
        if !self.connected {
            state.remote = None;
            pending.latest = None;
            return;
        }
        if let Some(player) = pending.latest.take() {
            state.remote = Some(player);
        }
    }

    /// Send this frame's state to the peer
    pub fn sync(&mut self, state: &GameState) {
        if !self.connected {
            return;
        }
        let player = &state.player;
        self.link.send_player_state(&RemotePlayer {
            pos: player.pos,
            size: player.size,
            lives: player.lives,
        });

        if self.is_host {
            let nearby = nearby_enemies(state, player.pos);
            self.link.send_enemy_state(&nearby);
        }
    }

    /// Close the link and the inbox; later calls are no-ops
    pub fn disconnect(&mut self) {
        self.inbox.on_disconnect();
        if self.connected {
            self.link.disconnect();
            self.connected = false;
            log::info!("LAN session closed");
        }
    }
}

/// Enemies within broadcast range of `origin`, in iteration order
pub fn nearby_enemies(state: &GameState, origin: Vec2) -> Vec<EnemySnapshot> {
    state
        .enemies()
        .filter(|e| {
            let d = e.pos - origin;
            d.x.abs() < ENEMY_BROADCAST_RANGE && d.y.abs() < ENEMY_BROADCAST_RANGE
        })
        .map(|e| EnemySnapshot {
            pos: e.pos,
            kind: e.kind,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::SpawnBias;
    use crate::sim::state::{Enemy, MovePattern, WorldMode};

    #[derive(Debug, Default)]
    struct Wire {
        players: Vec<RemotePlayer>,
        enemy_batches: Vec<Vec<EnemySnapshot>>,
        disconnects: u32,
    }

    #[derive(Clone, Default)]
    struct TestLink(Rc<RefCell<Wire>>);

    impl PeerLink for TestLink {
        fn send_player_state(&mut self, player: &RemotePlayer) {
            self.0.borrow_mut().players.push(player.clone());
        }
        fn send_enemy_state(&mut self, enemies: &[EnemySnapshot]) {
            self.0.borrow_mut().enemy_batches.push(enemies.to_vec());
        }
        fn disconnect(&mut self) {
            self.0.borrow_mut().disconnects += 1;
        }
    }

    fn remote(x: f32) -> RemotePlayer {
        RemotePlayer {
            pos: Vec2::new(x, 100.0),
            size: Vec2::splat(50.0),
            lives: 2,
        }
    }

    #[test]
    fn test_last_value_wins() {
        let mut state = GameState::new(WorldMode::Arena, SpawnBias::default(), 1);
        let mut net = NetSync::new(Box::new(TestLink::default()), false);
        let inbox = net.inbox();
        inbox.on_remote_update(remote(1.0));
        inbox.on_remote_update(remote(2.0));
        net.apply_pending(&mut state);
        assert_eq!(state.remote, Some(remote(2.0)));

        // Nothing new: remote stays where it was
        net.apply_pending(&mut state);
        assert_eq!(state.remote, Some(remote(2.0)));
    }

    #[test]
    fn test_disconnect_clears_remote() {
        let mut state = GameState::new(WorldMode::Arena, SpawnBias::default(), 1);
        let link = TestLink::default();
        let mut net = NetSync::new(Box::new(link.clone()), false);
        let inbox = net.inbox();
        inbox.on_remote_update(remote(1.0));
        net.apply_pending(&mut state);

        inbox.on_disconnect();
        inbox.on_remote_update(remote(3.0));
        net.apply_pending(&mut state);
        assert!(state.remote.is_none());
        assert!(!net.is_connected());

        net.sync(&state);
        assert!(link.0.borrow().players.is_empty());
    }

    #[test]
    fn test_updates_after_disconnect_ignored() {
        let mut state = GameState::new(WorldMode::Arena, SpawnBias::default(), 1);
        let mut net = NetSync::new(Box::new(TestLink::default()), false);
        let inbox = net.inbox();

        inbox.on_disconnect();
        net.apply_pending(&mut state);
        inbox.on_remote_update(remote(9.0));
        net.apply_pending(&mut state);
        assert!(!net.is_connected());
        assert!(state.remote.is_none());

        // Later frames stay empty as well
        inbox.on_remote_update(remote(10.0));
        net.apply_pending(&mut state);
        assert!(state.remote.is_none());
    }

    #[test]
    fn test_local_disconnect_closes_inbox() {
        let mut state = GameState::new(WorldMode::Arena, SpawnBias::default(), 1);
        let mut net = NetSync::new(Box::new(TestLink::default()), true);
        let inbox = net.inbox();
        inbox.on_remote_update(remote(1.0));
        net.apply_pending(&mut state);
        assert!(state.remote.is_some());

        net.disconnect();
        inbox.on_remote_update(remote(2.0));
        net.apply_pending(&mut state);
        assert!(state.remote.is_none());
    }

    #[test]
    fn test_host_broadcasts_nearby_enemies_only() {
        let mut state = GameState::new(WorldMode::Arena, SpawnBias::default(), 1);
        let origin = state.player.pos;
        state.enemies.push(Enemy::new(1, origin + Vec2::new(100.0, -300.0), EnemyKind::Heavy, MovePattern::Linear));
        state.enemies.push(Enemy::new(2, origin + Vec2::new(2500.0, 0.0), EnemyKind::Light, MovePattern::Linear));

        let link = TestLink::default();
        let mut net = NetSync::new(Box::new(link.clone()), true);
        net.sync(&state);

        let wire = link.0.borrow();
        assert_eq!(wire.players.len(), 1);
        assert_eq!(wire.players[0].lives, state.player.lives);
        assert_eq!(wire.enemy_batches.len(), 1);
        assert_eq!(wire.enemy_batches[0].len(), 1);
        assert_eq!(wire.enemy_batches[0][0].kind, EnemyKind::Heavy);
    }

    #[test]
    fn test_guest_sends_no_enemies() {
        let state = GameState::new(WorldMode::Arena, SpawnBias::default(), 1);
        let link = TestLink::default();
        let mut net = NetSync::new(Box::new(link.clone()), false);
        net.sync(&state);
        assert_eq!(link.0.borrow().players.len(), 1);
        assert!(link.0.borrow().enemy_batches.is_empty());
    }

    #[test]
    fn test_disconnect_once() {
        let link = TestLink::default();
        let mut net = NetSync::new(Box::new(link.clone()), true);
        net.disconnect();
        net.disconnect();
        assert_eq!(link.0.borrow().disconnects, 1);
    }

    #[test]
    fn test_wire_message_parsing() {
        let inbox = RemoteInbox::default();
        let text = NetMessage::Player(remote(7.0)).to_json().unwrap();
        inbox.on_message(&text);
        inbox.on_message("{not json");
        assert_eq!(inbox.pending.borrow().latest, Some(remote(7.0)));
    }
}
