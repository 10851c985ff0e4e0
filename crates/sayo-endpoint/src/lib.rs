pub mod config;
pub mod endpointer;
pub mod energy;

pub use config::EndpointConfig;
pub use endpointer::{EndReason, Endpointer, EndpointEvent, VoiceActivityState};
pub use energy::{rms, rms_to_dbfs};
