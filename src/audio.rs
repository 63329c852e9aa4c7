//! Sound effects with a round-robin channel pool
//!
//! Gameplay only ever asks for a sound by name. The pool picks the first idle
//! channel; when every channel is still playing the request is dropped rather
//! than queued. Audio never affects simulation results.

use std::collections::{BTreeMap, HashMap};

use crate::error::EngineError;

/// Sound names the game plays
pub mod sounds {
    pub const FIRE: &str = "fire";
    pub const DIE: &str = "die";
}

/// Default sound files, relative to the page
pub fn default_sound_files() -> BTreeMap<String, String> {
    BTreeMap::from([
        (sounds::FIRE.to_string(), "media/laser.ogg".to_string()),
        (sounds::DIE.to_string(), "media/explosion.ogg".to_string()),
    ])
}

/// What the simulation needs from audio
pub trait AudioPort {
    /// Play a named sound; unknown names are a logged no-op
    fn play(&mut self, name: &str);
}

/// Platform side of the pool: a clock, clip durations and playback
pub trait AudioBackend {
    type Clip;

    /// Monotonic time in milliseconds
    fn now_ms(&self) -> f64;
    fn duration_secs(&self, clip: &Self::Clip) -> f64;
    /// Start `clip` on `channel`, replacing whatever it played before
    fn start(&mut self, channel: usize, clip: &Self::Clip);
}

/// A playback channel and when it frees up
#[derive(Debug, Clone, Copy)]
struct Channel {
    finished_at: f64,
}

/// Fixed-size pool of channels over a backend
pub struct ChannelPool<B: AudioBackend> {
    backend: B,
    clips: HashMap<String, B::Clip>,
    channels: Vec<Channel>,
}

impl<B: AudioBackend> ChannelPool<B> {
    pub fn new(backend: B, channel_count: usize) -> Self {
        Self {
            backend,
            clips: HashMap::new(),
            channels: vec![Channel { finished_at: -1.0 }; channel_count],
        }
    }

    /// Load every `name -> path` entry with `loader`.
    ///
    /// All-or-nothing: if any file fails, nothing is registered and the
    /// failure is returned.
    pub fn load_with<F>(&mut self, files: &BTreeMap<String, String>, mut loader: F) -> Result<(), EngineError>
    where
        F: FnMut(&str) -> Result<B::Clip, String>,
    {
        let mut loaded = Vec::with_capacity(files.len());
        for (name, path) in files {
            let clip = loader(path).map_err(|reason| EngineError::asset_load(path.as_str(), reason))?;
            loaded.push((name.clone(), clip));
        }
        log::info!("Loaded {} sounds", loaded.len());
        self.clips.extend(loaded);
        Ok(())
    }

    /// Register an already decoded clip
    pub fn insert(&mut self, name: impl Into<String>, clip: B::Clip) {
        self.clips.insert(name.into(), clip);
    }

    pub fn has_sound(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Channels still playing at the backend's current time
    pub fn busy_channels(&self) -> usize {
        let now = self.backend.now_ms();
        self.channels.iter().filter(|c| c.finished_at >= now).count()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: AudioBackend> AudioPort for ChannelPool<B> {
    fn play(&mut self, name: &str) {
        let Some(clip) = self.clips.get(name) else {
            log::warn!("Sound not found: {}", name);
            return;
        };

        let now = self.backend.now_ms();
        let Some(idx) = self.channels.iter().position(|c| c.finished_at < now) else {
            log::debug!("All {} channels busy, dropping {}", self.channels.len(), name);
            return;
        };

        self.channels[idx].finished_at = now + self.backend.duration_secs(clip) * 1000.0;
        self.backend.start(idx, clip);
    }
}

/// Backend that plays nothing; clips are plain durations and time is manual
#[derive(Debug, Clone, Default)]
pub struct SilentBackend {
    pub now_ms: f64,
    /// `(channel, duration)` for every started clip
    pub started: Vec<(usize, f64)>,
}

impl SilentBackend {
    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }
}

impl AudioBackend for SilentBackend {
    /// Clip length in seconds
    type Clip = f64;

    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn duration_secs(&self, clip: &f64) -> f64 {
        *clip
    }

    fn start(&mut self, channel: usize, clip: &f64) {
        self.started.push((channel, *clip));
    }
}

/// Audio port that remembers what was requested
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub played: Vec<String>,
}

impl RecordingAudio {
    pub fn count(&self, name: &str) -> usize {
        self.played.iter().filter(|p| p.as_str() == name).count()
    }
}

impl AudioPort for RecordingAudio {
    fn play(&mut self, name: &str) {
        self.played.push(name.to_string());
    }
}
