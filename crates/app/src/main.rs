use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

use sayo_app::announce::spawn_announcer;
use sayo_app::config::AppConfig;
use sayo_app::conversation::ConversationLoop;
use sayo_app::log_store::ConversationLog;
use sayo_app::reason::GeminiReasoner;
use sayo_app::session::UtteranceRecorder;
use sayo_app::stdin_watch::spawn_stdin_watcher;
use sayo_app::voice::Voice;
use sayo_audio::{CaptureThread, Player};
use sayo_foundation::real_clock;
use sayo_stt::{NoopTranscriber, Transcriber, WhisperHttpTranscriber};
use sayo_tts::VoicevoxSynthesizer;

fn init_logging() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "sayo.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    // The writer guard has to live as long as the process.
    std::mem::forget(guard);
    Ok(())
}

fn config_path_from_args() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next();
        }
    }
    None
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("initializing Sayo");

    let config_path = config_path_from_args();
    let config = AppConfig::load(config_path.as_deref())?;

    // --- capture pipeline ---
    let (frame_tx, frame_rx) = crossbeam_channel::bounded(config.audio.queue_capacity);
    let (capture, _stream_info) = CaptureThread::spawn(config.audio.clone(), frame_tx)?;

    let exit_flag = Arc::new(AtomicBool::new(false));
    let _stdin_watcher = spawn_stdin_watcher(exit_flag.clone())?;

    // --- collaborators ---
    let transcriber: Box<dyn Transcriber> = match &config.whisper {
        Some(whisper_cfg) => Box::new(WhisperHttpTranscriber::new(whisper_cfg.clone())?),
        None => {
            tracing::warn!("no transcription endpoint configured; nothing will be recognized");
            Box::new(NoopTranscriber)
        }
    };
    let synthesizer = VoicevoxSynthesizer::connect(config.voicevox.clone())?;
    let reasoner = GeminiReasoner::new(config.gemini.clone())?;
    let log = match ConversationLog::open(&config.storage.db_path) {
        Ok(log) => Some(log),
        Err(e) => {
            tracing::warn!("conversation log unavailable: {e}");
            None
        }
    };

    let voice = Arc::new(Mutex::new(Voice::new(Box::new(synthesizer), Player::new())));

    // --- hourly announcements ---
    let announcer_running = Arc::new(AtomicBool::new(true));
    let announcer = if config.announce.enabled {
        Some(spawn_announcer(voice.clone(), announcer_running.clone())?)
    } else {
        None
    };

    // --- conversation loop ---
    let recorder = UtteranceRecorder::new(
        frame_rx,
        config.endpoint.clone(),
        config.audio.queue_wait(),
        exit_flag.clone(),
        capture.failure_flag(),
        real_clock(),
    );
    let mut conversation = ConversationLoop::new(
        recorder,
        transcriber,
        Box::new(reasoner),
        voice,
        log,
        config.activation.clone(),
        config.speech.clone(),
    );
    let run_result = conversation.run();

    // --- graceful shutdown ---
    announcer_running.store(false, Ordering::SeqCst);
    if let Some(handle) = announcer {
        let _ = handle.join();
    }
    capture.stop();
    tracing::info!("Sayo is offline");

    run_result?;
    Ok(())
}
