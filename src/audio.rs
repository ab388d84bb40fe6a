//! Audio event routing
//!
//! The simulation only names sounds and a relative volume; the bus applies
//! the player's volume settings and forwards to whatever backend is plugged in.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player volley fired
    Laser,
    /// Enemy destroyed, player hit, pickup collected
    Explosion,
}

impl SoundEffect {
    /// Asset name the backend looks the sound up by
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Laser => "laser",
            SoundEffect::Explosion => "explosion",
        }
    }
}

/// Playback backend. Fire-and-forget; failures stay inside the backend.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Backend that only logs, used headless and when no device is available
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("sound {} at {:.2}", effect.name(), volume);
    }
}

/// Volume control in front of an [`AudioSink`]
pub struct AudioBus {
    sink: Option<Box<dyn AudioSink>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioBus {
    fn default() -> Self {
        Self::silent()
    }
}

impl AudioBus {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink: Some(sink),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Bus with no backend; every event is dropped
    pub fn silent() -> Self {
        Self {
            sink: None,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound at a volume relative to the bus settings
    pub fn play(&mut self, effect: SoundEffect, relative: f32) {
        let vol = self.effective_volume() * relative.clamp(0.0, 1.0);
        if vol <= 0.0 {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.play(effect, vol);
        }
    }
}
