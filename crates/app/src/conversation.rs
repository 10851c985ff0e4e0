use parking_lot::Mutex;
use std::sync::Arc;

use crate::activation::{decide, Action, ActivationRules, ActivationState};
use crate::config::SpeechConfig;
use crate::log_store::ConversationLog;
use crate::reason::Reasoner;
use crate::session::{SessionResult, SessionSource};
use crate::voice::Voice;
use sayo_foundation::AppError;
use sayo_stt::Transcriber;

/// The continuous record → transcribe → decide → dispatch cycle. Stateless
/// apart from the activation state it threads through `decide`.
pub struct ConversationLoop<S: SessionSource> {
    sessions: S,
    transcriber: Box<dyn Transcriber>,
    reasoner: Box<dyn Reasoner>,
    voice: Arc<Mutex<Voice>>,
    log: Option<ConversationLog>,
    rules: ActivationRules,
    speech: SpeechConfig,
    state: ActivationState,
}

impl<S: SessionSource> ConversationLoop<S> {
    pub fn new(
        sessions: S,
        transcriber: Box<dyn Transcriber>,
        reasoner: Box<dyn Reasoner>,
        voice: Arc<Mutex<Voice>>,
        log: Option<ConversationLog>,
        rules: ActivationRules,
        speech: SpeechConfig,
    ) -> Self {
        Self {
            sessions,
            transcriber,
            reasoner,
            voice,
            log,
            rules,
            speech,
            state: ActivationState::Dormant,
        }
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        tracing::info!("Sayo is ready. 話しかけてください。");

        loop {
            let result = match self.sessions.next_session() {
                Ok(result) => result,
                Err(e) if e.is_session_fatal_only() => {
                    // Fatal to the session only; try the next one.
                    tracing::error!("recording session aborted: {e}");
                    continue;
                }
                Err(e) => return Err(AppError::Audio(e)),
            };

            let utterance = match result {
                SessionResult::ExitRequested => {
                    tracing::info!("exit command received; shutting down");
                    break;
                }
                SessionResult::Timeout => continue,
                SessionResult::Utterance(utterance) => utterance,
            };

            let text = match self.transcriber.transcribe(&utterance) {
                Ok(text) => text,
                Err(e) => {
                    // Reported, not thrown: treated as nothing recognized.
                    tracing::warn!("transcription failed: {e}");
                    continue;
                }
            };
            if text.trim().is_empty() {
                tracing::debug!("no speech recognized");
                continue;
            }
            tracing::info!(%text, "utterance recognized");

            let (next_state, action) = decide(self.state, &text, &self.rules);
            self.state = next_state;

            match action {
                Action::Terminate => {
                    tracing::info!("spoken exit phrase recognized; shutting down");
                    self.voice.lock().say(&self.speech.farewell);
                    break;
                }
                Action::PromptForHotword => {
                    tracing::debug!("hotword not detected; prompting");
                    self.voice.lock().say(&self.speech.hotword_prompt);
                }
                Action::Respond(forwarded) => {
                    let reply = self.reasoner.respond(&forwarded);
                    tracing::info!(%reply, "reply ready");

                    if let Some(log) = &self.log {
                        if let Err(e) = log.record(&forwarded, &reply) {
                            tracing::warn!("failed to persist conversation: {e}");
                        }
                    }
                    self.voice.lock().say(&reply);
                }
            }
        }

        tracing::info!("conversation loop terminated");
        Ok(())
    }

    pub fn activation_state(&self) -> ActivationState {
        self.state
    }
}
