//! Speech capabilities and the voice chat controller built on them.
//!
//! Recognition and synthesis engines are injected as [`SpeechInput`] and
//! [`SpeechOutput`]. Engines report what happens through a [`SpeechEvents`]
//! sink handed to them at construction; the host drains the matching
//! receiver into [`VoiceChat::handle_event`].

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::chat::Conversation;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("speech capability unavailable: {0}")]
    Unavailable(String),

    #[error("speech engine failed: {0}")]
    Engine(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Recognised text so far; replaces any earlier transcript.
    Transcript { text: String, is_final: bool },
    /// Recognition stopped on its own.
    InputEnded,
    UtteranceStarted,
    UtteranceEnded,
    Error(SpeechError),
}

/// Sending half handed to speech engines.
#[derive(Debug, Clone)]
pub struct SpeechEvents {
    tx: mpsc::UnboundedSender<SpeechEvent>,
}

impl SpeechEvents {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SpeechEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns false once the receiving side is gone.
    pub fn emit(&self, event: SpeechEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Speech recognition.
pub trait SpeechInput: Send {
    fn start(&mut self) -> Result<(), SpeechError>;

    /// Stops listening; a final transcript may still be delivered.
    fn stop(&mut self);

    /// Stops listening and discards pending results.
    fn cancel(&mut self);
}

/// Speech synthesis.
pub trait SpeechOutput: Send {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;

    fn cancel(&mut self);
}

/// Push-to-talk voice conversation.
pub struct VoiceChat<I: SpeechInput, O: SpeechOutput> {
    input: I,
    output: O,
    conversation: Conversation,
    transcript: String,
    listening: bool,
    speaking: bool,
    closed: bool,
}

impl<I: SpeechInput, O: SpeechOutput> VoiceChat<I, O> {
    pub fn new(input: I, output: O, conversation: Conversation) -> Self {
        Self {
            input,
            output,
            conversation,
            transcript: String::new(),
            listening: false,
            speaking: false,
            closed: false,
        }
    }

    /// Starts listening, or stops and submits what was heard.
    ///
    /// Returns the submitted text, which has already been appended to the
    /// conversation as a user message.
    ///
    /// Does nothing after [`VoiceChat::shutdown`].
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if recognition cannot start.
    pub fn toggle_listening(&mut self) -> Result<Option<String>, SpeechError> {
        if self.closed {
            return Ok(None);
        }
        if !self.listening {
            self.input.start()?;
            self.listening = true;
            debug!("listening");
            return Ok(None);
        }

        self.input.stop();
        self.listening = false;

        let text = std::mem::take(&mut self.transcript);
        let text = text.trim();
        if text.is_empty() {
            debug!("stopped listening with nothing to submit");
            return Ok(None);
        }
        self.conversation.push_user(text);
        debug!(chars = text.len(), "submitted transcript");
        Ok(Some(text.to_string()))
    }

    /// # Errors
    ///
    /// Returns `SpeechError` if recognition cannot be restarted after it ended
    /// on its own.
    pub fn handle_event(&mut self, event: SpeechEvent) -> Result<(), SpeechError> {
        match event {
            SpeechEvent::Transcript { text, .. } => self.transcript = text,
            SpeechEvent::InputEnded => {
                if self.listening && !self.closed {
                    debug!("recognition ended while listening, restarting");
                    self.input.start()?;
                }
            }
            SpeechEvent::UtteranceStarted => self.speaking = true,
            SpeechEvent::UtteranceEnded => self.speaking = false,
            SpeechEvent::Error(err) => {
                warn!(error = %err, "speech engine reported an error");
                if self.listening {
                    self.input.cancel();
                }
                self.listening = false;
                self.speaking = false;
            }
        }
        Ok(())
    }

    /// Records a finished assistant reply and reads it out unless something
    /// is already being spoken.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    pub fn on_assistant_reply(&mut self, text: &str) -> Result<bool, SpeechError> {
        self.conversation.push_assistant(text);
        if self.speaking || self.closed {
            return Ok(false);
        }
        self.output.speak(text)?;
        self.speaking = true;
        Ok(true)
    }

    /// Reads out the last assistant message again, interrupting current
    /// speech.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    pub fn play_last_response(&mut self) -> Result<bool, SpeechError> {
        if self.closed {
            return Ok(false);
        }
        let Some(last) = self.conversation.last_assistant() else {
            return Ok(false);
        };
        if self.speaking {
            self.output.cancel();
        }
        self.output.speak(&last.content)?;
        self.speaking = true;
        Ok(true)
    }

    /// Stops recognition and silences synthesis. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.input.stop();
        self.output.cancel();
        self.listening = false;
        self.speaking = false;
        self.closed = true;
        debug!("voice chat shut down");
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

impl<I: SpeechInput, O: SpeechOutput> Drop for VoiceChat<I, O> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
