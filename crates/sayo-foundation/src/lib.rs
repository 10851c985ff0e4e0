pub mod clock;
pub mod config;
pub mod error;

pub use clock::{real_clock, Clock, RealClock, SharedClock, TestClock};
pub use config::load_settings;
pub use error::{AppError, AudioError};
