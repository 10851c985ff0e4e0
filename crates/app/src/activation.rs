//! Hotword-gated activation: a pure decision over (state, recognized text).

use serde::{Deserialize, Serialize};

/// Whether Sayo is passively listening for her name or in open
/// conversation. Dormant initially; Active once the hotword is heard.
/// There is no automatic return to Dormant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Dormant,
    Active,
}

/// What the conversation loop should do with an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Forward the text to the reasoner and speak the reply.
    Respond(String),
    /// Speak the fixed re-engagement phrase; no reasoner call.
    PromptForHotword,
    /// Shut the loop down.
    Terminate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationRules {
    /// Hotword and its aliases, matched as substrings.
    pub hotwords: Vec<String>,
    /// Phrases that terminate the loop, checked before anything else.
    pub exit_phrases: Vec<String>,
    /// Remove the first hotword occurrence from the forwarded text. Off by
    /// default: the full utterance, hotword included, goes downstream.
    pub strip_hotword: bool,
}

impl Default for ActivationRules {
    fn default() -> Self {
        Self {
            hotwords: vec!["さよ".to_string(), "さよち".to_string()],
            exit_phrases: vec![
                "exit".to_string(),
                "終了".to_string(),
                "しゅうりょう".to_string(),
                "エグジット".to_string(),
                "イグジット".to_string(),
            ],
            strip_hotword: false,
        }
    }
}

/// Decides the next activation state and action for one recognized
/// utterance. Pure: no I/O, no hidden state, same inputs same outputs.
///
/// Rule order: exit phrases first (regardless of state), then the hotword
/// gate when Dormant. Once Active, every utterance is forwarded without
/// re-checking the hotword. Matching is case-insensitive substring search,
/// which also covers Japanese text unchanged.
pub fn decide(
    current: ActivationState,
    text: &str,
    rules: &ActivationRules,
) -> (ActivationState, Action) {
    let lowered = text.to_lowercase();

    if rules
        .exit_phrases
        .iter()
        .any(|phrase| lowered.contains(&phrase.to_lowercase()))
    {
        return (current, Action::Terminate);
    }

    match current {
        ActivationState::Active => (ActivationState::Active, Action::Respond(text.to_string())),
        ActivationState::Dormant => {
            let hit = rules
                .hotwords
                .iter()
                .find(|hotword| lowered.contains(&hotword.to_lowercase()));
            match hit {
                Some(hotword) => {
                    let forwarded = if rules.strip_hotword {
                        strip_first_occurrence(text, hotword)
                    } else {
                        text.to_string()
                    };
                    (ActivationState::Active, Action::Respond(forwarded))
                }
                None => (ActivationState::Dormant, Action::PromptForHotword),
            }
        }
    }
}

/// Removes the first case-insensitive occurrence of `hotword` from `text`.
/// Matching mirrors the lowercased substring check in `decide`, so an ASCII
/// hotword heard in a different case is still stripped.
fn strip_first_occurrence(text: &str, hotword: &str) -> String {
    let target = hotword.to_lowercase();
    let len = hotword.chars().count();

    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    for window in boundaries.windows(len + 1) {
        let (start, end) = (window[0], window[len]);
        if text[start..end].to_lowercase() == target {
            let mut out = String::with_capacity(text.len() - (end - start));
            out.push_str(&text[..start]);
            out.push_str(&text[end..]);
            return out.trim().to_string();
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ActivationRules {
        ActivationRules::default()
    }

    #[test]
    fn hotword_activates_and_forwards_full_text() {
        let (state, action) = decide(ActivationState::Dormant, "さよ、こんにちは", &rules());
        assert_eq!(state, ActivationState::Active);
        assert_eq!(action, Action::Respond("さよ、こんにちは".to_string()));
    }

    #[test]
    fn no_hotword_while_dormant_prompts() {
        let (state, action) = decide(ActivationState::Dormant, "こんにちは", &rules());
        assert_eq!(state, ActivationState::Dormant);
        assert_eq!(action, Action::PromptForHotword);
    }

    #[test]
    fn active_state_forwards_everything() {
        let (state, action) = decide(ActivationState::Active, "anything", &rules());
        assert_eq!(state, ActivationState::Active);
        assert_eq!(action, Action::Respond("anything".to_string()));
    }

    #[test]
    fn exit_phrase_wins_regardless_of_state() {
        let (_, action) = decide(ActivationState::Active, "終了します", &rules());
        assert_eq!(action, Action::Terminate);

        let (_, action) = decide(ActivationState::Dormant, "さよ、終了して", &rules());
        assert_eq!(action, Action::Terminate);
    }

    #[test]
    fn ascii_exit_phrase_matches_case_insensitively() {
        let (_, action) = decide(ActivationState::Active, "EXIT please", &rules());
        assert_eq!(action, Action::Terminate);
    }

    #[test]
    fn alias_activates_too() {
        let (state, action) = decide(ActivationState::Dormant, "さよち、元気？", &rules());
        assert_eq!(state, ActivationState::Active);
        assert_eq!(action, Action::Respond("さよち、元気？".to_string()));
    }

    #[test]
    fn decide_is_idempotent() {
        let first = decide(ActivationState::Dormant, "hello", &rules());
        let second = decide(ActivationState::Dormant, "hello", &rules());
        assert_eq!(first, second);
    }

    #[test]
    fn strip_hotword_matches_case_insensitively() {
        let r = ActivationRules {
            hotwords: vec!["sayo".to_string()],
            strip_hotword: true,
            ..ActivationRules::default()
        };
        let (state, action) = decide(ActivationState::Dormant, "Sayo turn on the lights", &r);
        assert_eq!(state, ActivationState::Active);
        // The differently-cased hotword both activates and gets stripped.
        assert_eq!(action, Action::Respond("turn on the lights".to_string()));
    }

    #[test]
    fn strip_hotword_removes_first_occurrence_only() {
        let r = ActivationRules {
            strip_hotword: true,
            ..ActivationRules::default()
        };
        let (state, action) = decide(ActivationState::Dormant, "さよ お天気教えて", &r);
        assert_eq!(state, ActivationState::Active);
        assert_eq!(action, Action::Respond("お天気教えて".to_string()));
    }
}
