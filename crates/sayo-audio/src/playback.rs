use sayo_foundation::AudioError;
use std::io::Cursor;

/// Blocking WAV playback on the default output device.
///
/// The output stream is opened per call so the handle stays `Send` and can
/// sit behind the mutex shared by the conversation loop and the announcer
/// thread.
#[derive(Debug, Default)]
pub struct Player;

impl Player {
    pub fn new() -> Self {
        Self
    }

    /// Blocks until playback completes. Empty input is a no-op.
    pub fn play_wav(&self, wav: &[u8]) -> Result<(), AudioError> {
        if wav.is_empty() {
            return Ok(());
        }

        let (_stream, handle) = rodio::OutputStream::try_default()
            .map_err(|e| AudioError::Playback(format!("failed to open output device: {e}")))?;
        let sink = rodio::Sink::try_new(&handle)
            .map_err(|e| AudioError::Playback(format!("failed to create sink: {e}")))?;
        let source = rodio::Decoder::new_wav(Cursor::new(wav.to_vec()))
            .map_err(|e| AudioError::Playback(format!("failed to decode wav: {e}")))?;

        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}
