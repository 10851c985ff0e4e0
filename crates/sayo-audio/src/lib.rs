pub mod capture;
pub mod chunker;
pub mod frame;
pub mod playback;

pub use capture::{CaptureStats, CaptureThread, StreamInfo};
pub use chunker::FrameChunker;
pub use frame::{AudioFrame, CaptureConfig, Utterance};
pub use playback::Player;
