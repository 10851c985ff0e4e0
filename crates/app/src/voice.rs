use sayo_audio::Player;
use sayo_tts::Synthesizer;

/// The shared speaking resource: synthesis plus blocking playback. Sits
/// behind one mutex so a scheduled announcement and a conversational reply
/// never play concurrently.
pub struct Voice {
    synthesizer: Box<dyn Synthesizer>,
    player: Player,
}

impl Voice {
    pub fn new(synthesizer: Box<dyn Synthesizer>, player: Player) -> Self {
        Self {
            synthesizer,
            player,
        }
    }

    /// Best effort: synthesis and playback failures are logged and
    /// swallowed. Blocks until playback finishes.
    pub fn say(&self, text: &str) {
        match self.synthesizer.synthesize(text) {
            Ok(Some(audio)) => {
                if let Err(e) = self.player.play_wav(&audio.wav) {
                    tracing::warn!("playback failed: {e}");
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("synthesis failed: {e}");
            }
        }
    }
}
