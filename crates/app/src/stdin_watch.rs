use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Watches stdin for a typed `exit` and raises the shared exit flag. The
/// recorder observes the flag within one queue wait, so a typed exit
/// aborts even a mid-recording session promptly.
pub fn spawn_stdin_watcher(exit_flag: Arc<AtomicBool>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-watch".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) if line.trim().eq_ignore_ascii_case("exit") => {
                        tracing::info!("'exit' typed on stdin");
                        exit_flag.store(true, Ordering::SeqCst);
                        break;
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        })
}
