use crate::frame::AudioFrame;
use std::time::Instant;

/// Re-chunks arbitrary-size interleaved callback buffers into fixed-size
/// mono frames. Lives inside the capture callback, so it must not allocate
/// per push beyond the frames it emits.
pub struct FrameChunker {
    pending: Vec<f32>,
    frame_size: usize,
    channels: u16,
    sample_rate: u32,
    next_seq: u64,
}

impl FrameChunker {
    pub fn new(frame_size: usize, channels: u16, sample_rate: u32) -> Self {
        Self {
            pending: Vec::with_capacity(frame_size * 2),
            frame_size,
            channels: channels.max(1),
            sample_rate,
            next_seq: 0,
        }
    }

    /// Downmixes `interleaved` to mono and emits every completed frame.
    /// Leftover samples carry over to the next push.
    pub fn push(
        &mut self,
        interleaved: &[f32],
        now: Instant,
        mut emit: impl FnMut(AudioFrame),
    ) {
        if self.channels == 1 {
            self.pending.extend_from_slice(interleaved);
        } else {
            let ch = self.channels as usize;
            for group in interleaved.chunks_exact(ch) {
                let sum: f32 = group.iter().sum();
                self.pending.push(sum / ch as f32);
            }
        }

        while self.pending.len() >= self.frame_size {
            let samples: Vec<f32> = self.pending.drain(..self.frame_size).collect();
            emit(AudioFrame {
                seq: self.next_seq,
                samples,
                sample_rate: self.sample_rate,
                captured_at: now,
            });
            self.next_seq += 1;
        }
    }
}
