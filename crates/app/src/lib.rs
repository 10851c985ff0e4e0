pub mod activation;
pub mod announce;
pub mod config;
pub mod conversation;
pub mod log_store;
pub mod reason;
pub mod session;
pub mod stdin_watch;
pub mod voice;

pub use activation::{decide, Action, ActivationRules, ActivationState};
pub use config::{AppConfig, SpeechConfig, StorageConfig};
pub use conversation::ConversationLoop;
pub use session::{SessionResult, SessionSource, UtteranceRecorder};
pub use voice::Voice;
