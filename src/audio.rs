//! Sound playback
//!
//! Sounds are loaded on first use and cached per path. Playing a sound that is
//! still playing restarts it from the beginning instead of layering a second
//! copy.

use crate::error::AssetError;
use std::path::Path;

/// A backend that plays short sound effects.
pub trait AudioPlayer {
    fn play(&mut self, path: &Path) -> Result<(), AssetError>;
}

#[cfg(feature = "sdl")]
pub use mixer::MixerAudio;

/// Whether a channel handed out for `ours` is still busy with it. Mixer
/// channels are reused, so a remembered channel may be playing another sound.
#[cfg_attr(not(feature = "sdl"), allow(dead_code))]
fn still_ours<T: PartialEq>(playing: bool, current: Option<T>, ours: T) -> bool {
    playing && current.is_some_and(|chunk| chunk == ours)
}

#[cfg(feature = "sdl")]
mod mixer {
    use super::{still_ours, AudioPlayer};
    use crate::error::AssetError;
    use sdl2::mixer::{
        self, Channel, Chunk, InitFlag, Sdl2MixerContext, AUDIO_S16LSB, DEFAULT_CHANNELS,
    };
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    const FREQUENCY: i32 = 44_100;
    const CHUNK_SIZE: i32 = 1_024;
    const CHANNELS: i32 = 16;

    struct CachedSound {
        chunk: Chunk,
        channel: Option<Channel>,
    }

    /// SDL_mixer playback. Keeps the mixer open for as long as it lives.
    pub struct MixerAudio {
        _context: Sdl2MixerContext,
        sounds: HashMap<PathBuf, CachedSound>,
    }

    impl MixerAudio {
        pub fn new() -> Result<Self, String> {
            mixer::open_audio(FREQUENCY, AUDIO_S16LSB, DEFAULT_CHANNELS, CHUNK_SIZE)?;
            let context = mixer::init(InitFlag::OGG | InitFlag::MP3)?;
            mixer::allocate_channels(CHANNELS);
            log::info!("Audio initialized ({} channels)", CHANNELS);
            Ok(MixerAudio {
                _context: context,
                sounds: HashMap::new(),
            })
        }
    }

    impl AudioPlayer for MixerAudio {
        fn play(&mut self, path: &Path) -> Result<(), AssetError> {
            if !self.sounds.contains_key(path) {
                let chunk = Chunk::from_file(path).map_err(|reason| AssetError::Load {
                    path: path.to_path_buf(),
                    reason,
                })?;
                self.sounds
                    .insert(path.to_path_buf(), CachedSound { chunk, channel: None });
            }

            let Some(sound) = self.sounds.get_mut(path) else {
                return Err(AssetError::NotFound(path.to_path_buf()));
            };
            if let Some(channel) = sound.channel.take() {
                let current = channel.get_chunk().map(|chunk| chunk.raw);
                if still_ours(channel.is_playing(), current, sound.chunk.raw) {
                    channel.halt();
                }
            }
            let channel = Channel::all()
                .play(&sound.chunk, 0)
                .map_err(|reason| AssetError::Playback {
                    path: path.to_path_buf(),
                    reason,
                })?;
            sound.channel = Some(channel);
            Ok(())
        }
    }

    impl Drop for MixerAudio {
        fn drop(&mut self) {
            self.sounds.clear();
            mixer::close_audio();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_only_halts_own_channel() {
        assert!(still_ours(true, Some(1), 1));
        // Channel was handed to another sound in the meantime
        assert!(!still_ours(true, Some(2), 1));
        // Finished playing
        assert!(!still_ours(false, Some(1), 1));
        assert!(!still_ours(true, None, 1));
    }
}
