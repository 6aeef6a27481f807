// src/voice.rs
//! State machine of the voice client.
//!
//! The browser owns the microphone, the speech engines and the timers; this
//! type owns every decision about them. Each transition returns the
//! [`Effect`]s the host must carry out, in order.
//!
//! `static/index.html` carries a JavaScript copy of these transitions under
//! camelCase names. Change both together; `tests/client_page.rs` checks that
//! every state, transition and effect named here still exists in the page.

use rand::{distributions::Alphanumeric, Rng};
use std::time::Duration;

/// Quiet time after the last recognized word before the topic is sent.
pub const SILENCE_INTERVAL: Duration = Duration::from_millis(1000);

pub const CHAT_ID_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Listening,
    Submitting,
    Speaking,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartRecognition,
    StopRecognition,
    ArmSilenceTimer(Duration),
    CancelSilenceTimer,
    /// Clear the visible input buffer.
    ClearTopic,
    /// Send `topic`; the reply must be reported back with the same `turn`.
    Submit { turn: u64, topic: String },
    Speak(String),
    CancelSpeech,
    ClearTranscript,
    MintChatId(String),
}

#[derive(Debug, Clone)]
pub struct VoiceSession {
    state: VoiceState,
    topic: String,
    chat_id: String,
    /// Set by the stop button, cleared only by the start button.
    manual_stop: bool,
    /// Auto-send already fired for the current recognition session.
    auto_sent: bool,
    speech_supported: bool,
    turn: u64,
}

impl VoiceSession {
    pub fn new(speech_supported: bool) -> Self {
        Self {
            state: VoiceState::Idle,
            topic: String::new(),
            chat_id: new_chat_id(),
            manual_stop: false,
            auto_sent: false,
            speech_supported,
            turn: 0,
        }
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn is_listening(&self) -> bool {
        self.state == VoiceState::Listening
    }

    /// Mic button while not listening.
    pub fn start_listening(&mut self) -> Vec<Effect> {
        self.manual_stop = false;
        match self.state {
            VoiceState::Idle => self.listen(),
            // Resumes on its own once the reply is done.
            VoiceState::Listening | VoiceState::Submitting | VoiceState::Speaking => Vec::new(),
        }
    }

    /// Mic button while listening. Nothing restarts until `start_listening`.
    pub fn stop_listening(&mut self) -> Vec<Effect> {
        self.manual_stop = true;
        match self.state {
            VoiceState::Listening => {
                self.state = VoiceState::Idle;
                vec![Effect::CancelSilenceTimer, Effect::StopRecognition]
            }
            VoiceState::Speaking => {
                self.state = VoiceState::Idle;
                vec![Effect::CancelSpeech]
            }
            VoiceState::Idle | VoiceState::Submitting => Vec::new(),
        }
    }

    /// Live recognition result: the full transcript so far.
    pub fn transcript(&mut self, text: &str) -> Vec<Effect> {
        if self.state != VoiceState::Listening {
            return Vec::new();
        }
        self.topic = text.trim().to_string();
        vec![Effect::ArmSilenceTimer(SILENCE_INTERVAL)]
    }

    /// Keyboard edits to the input buffer.
    pub fn typed(&mut self, text: &str) {
        self.topic = text.to_string();
    }

    pub fn silence_elapsed(&mut self) -> Vec<Effect> {
        if self.state == VoiceState::Listening && !self.auto_sent {
            self.submit()
        } else {
            Vec::new()
        }
    }

    /// Enter key on typed input.
    pub fn submit_typed(&mut self) -> Vec<Effect> {
        match self.state {
            VoiceState::Idle | VoiceState::Listening => self.submit(),
            VoiceState::Submitting | VoiceState::Speaking => Vec::new(),
        }
    }

    /// The recognizer stopped without being asked to (browser timeout,
    /// audio error). Recognition we stopped ourselves never reaches here
    /// because the state has already moved on.
    pub fn recognition_ended(&mut self) -> Vec<Effect> {
        if self.state != VoiceState::Listening {
            return Vec::new();
        }
        if self.manual_stop {
            self.state = VoiceState::Idle;
            return vec![Effect::CancelSilenceTimer];
        }
        if self.auto_sent {
            return Vec::new();
        }
        if self.topic.trim().is_empty() {
            vec![Effect::StartRecognition]
        } else {
            self.submit()
        }
    }

    /// The full reply has arrived for `turn`.
    pub fn response_complete(&mut self, turn: u64, text: &str) -> Vec<Effect> {
        if self.state != VoiceState::Submitting || turn != self.turn {
            return Vec::new();
        }
        if self.speech_supported && !text.trim().is_empty() {
            self.state = VoiceState::Speaking;
            vec![Effect::Speak(text.to_string())]
        } else {
            self.resume()
        }
    }

    pub fn response_failed(&mut self, turn: u64) -> Vec<Effect> {
        if self.state != VoiceState::Submitting || turn != self.turn {
            return Vec::new();
        }
        self.resume()
    }

    /// Playback finished or errored.
    pub fn speech_ended(&mut self) -> Vec<Effect> {
        if self.state != VoiceState::Speaking {
            return Vec::new();
        }
        self.resume()
    }

    /// Fresh chat id and empty screen. Stored history is left alone, and a
    /// reply still in flight for the old chat is ignored.
    pub fn new_chat(&mut self) -> Vec<Effect> {
        let mut effects = match self.state {
            VoiceState::Listening => vec![Effect::CancelSilenceTimer, Effect::StopRecognition],
            VoiceState::Speaking => vec![Effect::CancelSpeech],
            VoiceState::Idle | VoiceState::Submitting => Vec::new(),
        };
        self.state = VoiceState::Idle;
        self.turn += 1;
        self.topic.clear();
        self.chat_id = new_chat_id();
        effects.extend([
            Effect::ClearTopic,
            Effect::ClearTranscript,
            Effect::MintChatId(self.chat_id.clone()),
        ]);
        effects
    }

    fn listen(&mut self) -> Vec<Effect> {
        self.state = VoiceState::Listening;
        self.auto_sent = false;
        vec![Effect::StartRecognition]
    }

    fn submit(&mut self) -> Vec<Effect> {
        let topic = self.topic.trim().to_string();
        if topic.is_empty() {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.state == VoiceState::Listening {
            effects.extend([Effect::CancelSilenceTimer, Effect::StopRecognition]);
        }

        self.auto_sent = true;
        self.state = VoiceState::Submitting;
        self.topic.clear();
        self.turn += 1;

        effects.extend([
            Effect::ClearTopic,
            Effect::ClearTranscript,
            Effect::Submit { turn: self.turn, topic },
        ]);
        effects
    }

    fn resume(&mut self) -> Vec<Effect> {
        if self.manual_stop {
            self.state = VoiceState::Idle;
            Vec::new()
        } else {
            self.listen()
        }
    }
}

/// Eight lowercase alphanumeric characters.
pub fn new_chat_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CHAT_ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted(effects: &[Effect]) -> Option<(u64, String)> {
        effects.iter().find_map(|e| match e {
            Effect::Submit { turn, topic } => Some((*turn, topic.clone())),
            _ => None,
        })
    }

    #[test]
    fn test_silence_submits_once_per_recognition_session() {
        let mut session = VoiceSession::new(true);
        assert_eq!(session.start_listening(), vec![Effect::StartRecognition]);

        assert_eq!(
            session.transcript("  I was in a car accident "),
            vec![Effect::ArmSilenceTimer(SILENCE_INTERVAL)]
        );
        let effects = session.silence_elapsed();
        let (turn, topic) = submitted(&effects).unwrap();
        assert_eq!(topic, "I was in a car accident");
        assert!(effects.contains(&Effect::StopRecognition));
        assert_eq!(session.state(), VoiceState::Submitting);
        assert_eq!(session.topic(), "");

        // Late timer and late end-of-recognition do not send again.
        assert!(session.silence_elapsed().is_empty());
        assert!(session.recognition_ended().is_empty());
        assert!(session.submit_typed().is_empty());

        assert_eq!(
            session.response_complete(turn, "I'm sorry to hear that."),
            vec![Effect::Speak("I'm sorry to hear that.".into())]
        );
        assert_eq!(session.state(), VoiceState::Speaking);

        assert_eq!(session.speech_ended(), vec![Effect::StartRecognition]);
        assert!(session.is_listening());
    }

    #[test]
    fn test_silence_with_empty_buffer_does_nothing() {
        let mut session = VoiceSession::new(true);
        session.start_listening();
        session.transcript("   ");
        assert!(session.silence_elapsed().is_empty());
        assert!(session.is_listening());
    }

    #[test]
    fn test_manual_stop_suppresses_auto_restart() {
        let mut session = VoiceSession::new(true);
        session.start_listening();
        session.transcript("my phone number is");
        let (turn, _) = submitted(&session.silence_elapsed()).unwrap();

        // Stop pressed while the reply is still streaming.
        assert!(session.stop_listening().is_empty());
        assert_eq!(
            session.response_complete(turn, "Thanks."),
            vec![Effect::Speak("Thanks.".into())]
        );
        assert!(session.speech_ended().is_empty());
        assert_eq!(session.state(), VoiceState::Idle);

        assert_eq!(session.start_listening(), vec![Effect::StartRecognition]);
    }

    #[test]
    fn test_stop_while_speaking_cancels_speech() {
        let mut session = VoiceSession::new(true);
        session.start_listening();
        session.transcript("hello");
        let (turn, _) = submitted(&session.silence_elapsed()).unwrap();
        session.response_complete(turn, "Hi there.");

        assert_eq!(session.stop_listening(), vec![Effect::CancelSpeech]);
        assert_eq!(session.state(), VoiceState::Idle);
        assert!(session.speech_ended().is_empty());
    }

    #[test]
    fn test_recognition_end_restarts_or_sends() {
        let mut session = VoiceSession::new(true);
        session.start_listening();
        assert_eq!(session.recognition_ended(), vec![Effect::StartRecognition]);
        assert!(session.is_listening());

        session.transcript("Do you take car accident cases?");
        let effects = session.recognition_ended();
        assert_eq!(
            submitted(&effects).map(|(_, topic)| topic),
            Some("Do you take car accident cases?".to_string())
        );
    }

    #[test]
    fn test_recognition_end_after_manual_stop_is_ignored() {
        let mut session = VoiceSession::new(true);
        session.start_listening();
        session.stop_listening();
        assert!(session.recognition_ended().is_empty());
        assert_eq!(session.state(), VoiceState::Idle);
    }

    #[test]
    fn test_without_speech_synthesis_listening_resumes() {
        let mut session = VoiceSession::new(false);
        session.start_listening();
        session.transcript("hello");
        let (turn, _) = submitted(&session.silence_elapsed()).unwrap();
        assert_eq!(session.response_complete(turn, "Hi."), vec![Effect::StartRecognition]);
        assert!(session.is_listening());
    }

    #[test]
    fn test_failed_response_resumes_listening() {
        let mut session = VoiceSession::new(true);
        session.start_listening();
        session.transcript("hello");
        let (turn, _) = submitted(&session.silence_elapsed()).unwrap();
        assert_eq!(session.response_failed(turn), vec![Effect::StartRecognition]);
    }

    #[test]
    fn test_typed_submit_from_idle() {
        let mut session = VoiceSession::new(true);
        session.typed("I signed an arbitration agreement");
        let effects = session.submit_typed();
        assert!(!effects.contains(&Effect::StopRecognition));
        let (turn, topic) = submitted(&effects).unwrap();
        assert_eq!(topic, "I signed an arbitration agreement");
        assert_eq!(turn, 1);

        session.typed("   ");
        assert!(session.submit_typed().is_empty());
    }

    #[test]
    fn test_new_chat_discards_in_flight_reply() {
        let mut session = VoiceSession::new(true);
        let old_id = session.chat_id().to_string();
        session.typed("hello");
        let (turn, _) = submitted(&session.submit_typed()).unwrap();

        let effects = session.new_chat();
        assert!(effects.contains(&Effect::ClearTranscript));
        assert!(matches!(effects.last(), Some(Effect::MintChatId(id)) if id == session.chat_id()));
        assert_ne!(session.chat_id(), old_id);
        assert_eq!(session.state(), VoiceState::Idle);

        assert!(session.response_complete(turn, "stale").is_empty());
        assert_eq!(session.state(), VoiceState::Idle);
    }

    #[test]
    fn test_transcript_ignored_unless_listening() {
        let mut session = VoiceSession::new(true);
        assert!(session.transcript("noise").is_empty());
        assert_eq!(session.topic(), "");
    }

    #[test]
    fn test_chat_id_shape() {
        let id = new_chat_id();
        assert_eq!(id.len(), CHAT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
