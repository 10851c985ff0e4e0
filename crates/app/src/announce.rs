use crate::voice::Voice;
use chrono::Timelike;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnounceConfig {
    /// Hourly time announcements on/off.
    pub enabled: bool,
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

pub fn hour_announcement(hour: u32) -> String {
    format!("{hour}時です")
}

fn due(minute: u32, hour: u32, last_announced: Option<u32>) -> bool {
    minute == 0 && last_announced != Some(hour)
}

/// Background thread speaking the time at the top of every hour. Takes the
/// same voice mutex as the conversation loop, so an announcement waits for
/// an in-progress reply (and vice versa) instead of overlapping it.
pub fn spawn_announcer(
    voice: Arc<Mutex<Voice>>,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("announcer".to_string())
        .spawn(move || {
            let mut last_announced: Option<u32> = None;
            while running.load(Ordering::SeqCst) {
                let now = chrono::Local::now();
                if due(now.minute(), now.hour(), last_announced) {
                    last_announced = Some(now.hour());
                    let text = hour_announcement(now.hour());
                    tracing::info!(%text, "announcing the time");
                    voice.lock().say(&text);
                }
                thread::sleep(Duration::from_secs(1));
            }
            tracing::debug!("announcer thread shutting down");
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announcement_text_uses_24h_hour() {
        assert_eq!(hour_announcement(0), "0時です");
        assert_eq!(hour_announcement(15), "15時です");
    }

    #[test]
    fn due_only_at_the_top_of_an_unannounced_hour() {
        assert!(due(0, 9, None));
        assert!(due(0, 10, Some(9)));
        // Same hour never fires twice.
        assert!(!due(0, 9, Some(9)));
        // Mid-hour never fires.
        assert!(!due(30, 9, None));
    }
}
