//! Sound effects.
//!
//! Short synthesised tones for flapping, scoring and crashing. Playback needs
//! the `sound` feature and an output device; otherwise every call is silent.

use std::fmt;
use std::time::Duration;

use tracing::debug;
#[cfg(feature = "sound")]
use tracing::warn;

use crate::config::AudioConfig;

/// Game moments that make a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Flap,
    Score,
    Crash,
}

/// One sine segment; segments of a cue play back to back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    pub duration: Duration,
    pub gain: f32,
}

impl Tone {
    const fn new(freq: f32, millis: u64, gain: f32) -> Self {
        Self {
            freq,
            duration: Duration::from_millis(millis),
            gain,
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

impl Cue {
    pub fn tones(self) -> Vec<Tone> {
        match self {
            Cue::Flap => vec![Tone::new(660.0, 40, 0.12), Tone::new(880.0, 30, 0.08)],
            Cue::Score => vec![Tone::new(988.0, 70, 0.12), Tone::new(1319.0, 140, 0.10)],
            // 400Hz to 80Hz over 0.4s while fading out
            Cue::Crash => {
                const STEPS: u32 = 8;
                (0..STEPS)
                    .map(|i| {
                        let t = i as f32 / (STEPS - 1) as f32;
                        let gain = lerp(0.15, 0.0, i as f32 / STEPS as f32);
                        Tone::new(lerp(400.0, 80.0, t), 50, gain)
                    })
                    .collect()
            }
        }
    }
}

#[cfg(feature = "sound")]
mod backend {
    use rodio::source::{SineWave, Source};
    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    use super::Tone;
    use crate::error::{Error, Result};

    pub struct Backend {
        // Dropping the stream stops all sound
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl Backend {
        pub fn open() -> Result<Self> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| Error::Audio(e.to_string()))?;
            Ok(Self {
                _stream: stream,
                handle,
            })
        }

        pub fn play(&self, tones: &[Tone], volume: f32) {
            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(e) => {
                    warn!(error = %e, "could not create audio sink");
                    return;
                }
            };
            for tone in tones {
                sink.append(
                    SineWave::new(tone.freq)
                        .take_duration(tone.duration)
                        .amplify(tone.gain * volume),
                );
            }
            sink.detach(); // Play in background
        }
    }
}

pub struct Audio {
    volume: f32,
    #[cfg(feature = "sound")]
    backend: Option<backend::Backend>,
}

impl fmt::Debug for Audio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Audio")
            .field("volume", &self.volume)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Audio {
    /// Audio that never plays anything.
    pub fn disabled() -> Self {
        Self {
            volume: 0.0,
            #[cfg(feature = "sound")]
            backend: None,
        }
    }

    /// Open the default output device. Failure is logged and yields silence.
    pub fn open(config: &AudioConfig, mute: bool) -> Self {
        if mute || !config.enabled || config.volume <= 0.0 {
            debug!("audio muted");
            return Self::disabled();
        }

        Self::open_device(config.volume)
    }

    #[cfg(feature = "sound")]
    fn open_device(volume: f32) -> Self {
        match backend::Backend::open() {
            Ok(backend) => {
                debug!(volume, "audio ready");
                Self {
                    volume,
                    backend: Some(backend),
                }
            }
            Err(e) => {
                warn!(error = %e, "continuing without sound");
                Self::disabled()
            }
        }
    }

    #[cfg(not(feature = "sound"))]
    fn open_device(_volume: f32) -> Self {
        debug!("built without the `sound` feature");
        Self::disabled()
    }

    #[cfg(feature = "sound")]
    pub fn is_active(&self) -> bool {
        self.backend.is_some()
    }

    #[cfg(not(feature = "sound"))]
    pub fn is_active(&self) -> bool {
        false
    }

    #[cfg(feature = "sound")]
    pub fn play(&self, cue: Cue) {
        if let Some(backend) = &self.backend {
            backend.play(&cue.tones(), self.volume);
        }
    }

    #[cfg(not(feature = "sound"))]
    pub fn play(&self, _cue: Cue) {}
}
