use crate::SttError;
use sayo_audio::Utterance;
use std::io::Cursor;

/// Encodes a captured utterance as 16-bit PCM WAV bytes for upload.
pub fn encode_wav(utterance: &Utterance) -> Result<Vec<u8>, SttError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: utterance.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &sample in &utterance.samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * 32767.0).round() as i16)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}
