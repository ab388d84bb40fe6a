//! One play session: the simulation wired to its collaborators
//!
//! The session owns the game state, the learning profile and the profile
//! store. Audio, cheats and the LAN link are optional; a missing one simply
//! disables that feature.

use crate::audio::AudioBus;
use crate::cheats::{CheatEffect, CheatFlags, CheatSource};
use crate::consts::{FRAME_DT, MAX_SUBSTEPS};
use crate::learning::LearningProfile;
use crate::network::{NetSync, PeerLink};
use crate::persistence::{self, ProfileStore};
use crate::settings::Settings;
use crate::sim::state::{FrameSnapshot, GameEvent, GameState, WorldMode};
use crate::sim::tick::{TickInput, TickOutcome, tick};

pub struct Session {
    state: GameState,
    profile: LearningProfile,
    store: Box<dyn ProfileStore>,
    audio: AudioBus,
    net: Option<NetSync>,
    cheats: Option<Box<dyn CheatSource>>,
    /// Role taken when a peer link is attached with `connect`
    lan_host: bool,
    /// Events produced by the most recent step
    events: Vec<GameEvent>,
    /// Profile already updated for this session
    finished: bool,
    /// Real time not yet simulated (seconds)
    accumulator: f32,
}

impl Session {
    /// Load the profile and start wave 1
    pub fn new(mode: WorldMode, seed: u64, store: Box<dyn ProfileStore>) -> Self {
        let profile = persistence::load_or_default(&*store);
        let bias = profile.spawn_bias();
        log::info!(
            "New {:?} session (seed {}, left bias {:.2}, up bias {:.2}, shots/frame {:.3})",
            mode,
            seed,
            bias.left_bias,
            bias.up_bias,
            bias.shots_per_frame
        );
        Self {
            state: GameState::new(mode, bias, seed),
            profile,
            store,
            audio: AudioBus::silent(),
            net: None,
            cheats: None,
            lan_host: false,
            events: Vec::new(),
            finished: false,
            accumulator: 0.0,
        }
    }

    /// Mode, seed and LAN role from the settings
    pub fn from_settings(settings: &Settings, store: Box<dyn ProfileStore>) -> Self {
        let mut session = Self::new(settings.mode, settings.resolve_seed(), store);
        session.lan_host = settings.lan_host;
        session
    }

    pub fn with_audio(mut self, audio: AudioBus) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_network(mut self, net: NetSync) -> Self {
        self.net = Some(net);
        self
    }

    /// Attach a peer link in the configured LAN role
    pub fn connect(&mut self, link: Box<dyn PeerLink>) {
        self.net = Some(NetSync::new(link, self.lan_host));
    }

    pub fn with_cheats(mut self, cheats: Box<dyn CheatSource>) -> Self {
        self.cheats = Some(cheats);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for hosts and tests
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn profile(&self) -> &LearningProfile {
        &self.profile
    }

    pub fn audio_mut(&mut self) -> &mut AudioBus {
        &mut self.audio
    }

    pub fn network(&self) -> Option<&NetSync> {
        self.net.as_ref()
    }

    /// Events from the most recent step
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        self.state.snapshot()
    }

    /// Apply a one-shot cheat effect immediately
    pub fn apply_cheat_effect(&mut self, effect: CheatEffect) {
        match effect {
            CheatEffect::ExtraLife => self.state.grant_extra_life(),
        }
    }

    /// Simulate exactly one frame
    pub fn step(&mut self, input: &TickInput) -> TickOutcome {
        if let Some(net) = self.net.as_mut() {
            net.apply_pending(&mut self.state);
        }

        let flags = match self.cheats.as_mut() {
            Some(source) => {
                for effect in source.take_effects() {
                    match effect {
                        CheatEffect::ExtraLife => self.state.grant_extra_life(),
                    }
                }
                CheatFlags::from_source(&**source)
            }
            None => CheatFlags::default(),
        };

        let outcome = tick(&mut self.state, input, &flags);

        self.events = self.state.drain_events();
        for event in &self.events {
            match event {
                GameEvent::Sound { effect, volume } => self.audio.play(*effect, *volume),
                GameEvent::WaveStarted { wave } => {
                    if let Some(source) = self.cheats.as_mut() {
                        source.update_unlocks(*wave);
                    }
                }
                _ => {}
            }
        }

        if matches!(outcome, TickOutcome::Advanced | TickOutcome::EnteredGameOver) {
            if let Some(net) = self.net.as_mut() {
                net.sync(&self.state);
            }
        }

        if outcome == TickOutcome::EnteredGameOver {
            self.finish();
        }
        outcome
    }

    /// Feed elapsed real time and run as many fixed frames as fit.
    ///
    /// One-shot inputs (menu toggle) are consumed by the first frame. Returns
    /// the number of frames simulated.
    pub fn advance(&mut self, dt: f32, input: &TickInput) -> u32 {
        self.accumulator += dt.min(0.1);

        let mut input = input.clone();
        let mut substeps = 0;
        while self.accumulator >= FRAME_DT && substeps < MAX_SUBSTEPS {
            let outcome = self.step(&input);
            self.accumulator -= FRAME_DT;
            substeps += 1;
            input.toggle_menu = false;
            if outcome == TickOutcome::EnteredGameOver {
                self.accumulator = 0.0;
                break;
            }
        }
        substeps
    }

    /// Fold this session into the profile, save it and close the link. Runs once.
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        self.profile.absorb(&self.state.stats);
        persistence::save_best_effort(&mut *self.store, &self.profile);

        if let Some(net) = self.net.as_mut() {
            net.disconnect();
        }
    }
}
