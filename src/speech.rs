//! Text-to-speech through an external command (espeak-ng by default).
//!
//! One utterance plays at a time. Starting a new one kills the previous
//! process; the UI polls on every tick to learn when playback ended.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("could not start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("speech command exited with {0}")]
    Exit(ExitStatus),
    #[error("speech process could not be polled: {0}")]
    Poll(#[from] io::Error),
    /// Our own cancellation; not worth showing to the user.
    #[error("utterance interrupted")]
    Interrupted,
}

#[derive(Clone, Debug)]
pub struct SpeechConfig {
    pub enabled: bool,
    pub command: String,
    /// `{lang}` is replaced with `lang`; the text is appended as the last argument.
    pub args: Vec<String>,
    pub lang: String,
    pub timeout: Duration,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "espeak-ng".to_string(),
            args: vec!["-v".to_string(), "{lang}".to_string()],
            lang: "ko".to_string(),
            timeout: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug)]
pub enum SpeechEvent {
    Ended { text: String },
    Failed { text: String, error: SpeechError },
    /// The process outlived the timeout and was killed.
    TimedOut { text: String },
}

struct Utterance {
    child: Child,
    started: Instant,
    text: String,
}

pub struct Speaker {
    config: SpeechConfig,
    current: Option<Utterance>,
}

impl Speaker {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.current.is_some()
    }

    pub fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        if !self.config.enabled || text.trim().is_empty() {
            return Ok(());
        }
        self.stop();

        let args = self
            .config
            .args
            .iter()
            .map(|arg| arg.replace("{lang}", &self.config.lang));
        let child = Command::new(&self.config.command)
            .args(args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                command: self.config.command.clone(),
                source,
            })?;
        tracing::debug!(%text, "speaking");
        self.current = Some(Utterance {
            child,
            started: Instant::now(),
            text: text.to_string(),
        });
        Ok(())
    }

    /// Kill the utterance in progress, if any.
    pub fn stop(&mut self) {
        if let Some(mut utterance) = self.current.take() {
            let _ = utterance.child.kill();
            let _ = utterance.child.wait();
            tracing::debug!(text = %utterance.text, error = %SpeechError::Interrupted, "speech stopped");
        }
    }

    /// Check the running utterance. Returns an event once it has finished,
    /// failed or run past the timeout.
    pub fn poll(&mut self, now: Instant) -> Option<SpeechEvent> {
        let utterance = self.current.as_mut()?;
        let event = match utterance.child.try_wait() {
            Ok(Some(status)) if status.success() => SpeechEvent::Ended {
                text: utterance.text.clone(),
            },
            Ok(Some(status)) => SpeechEvent::Failed {
                text: utterance.text.clone(),
                error: SpeechError::Exit(status),
            },
            Ok(None) => {
                if now.duration_since(utterance.started) < self.config.timeout {
                    return None;
                }
                let _ = utterance.child.kill();
                let _ = utterance.child.wait();
                tracing::warn!(text = %utterance.text, "speech timed out");
                SpeechEvent::TimedOut {
                    text: utterance.text.clone(),
                }
            }
            Err(e) => SpeechEvent::Failed {
                text: utterance.text.clone(),
                error: SpeechError::Poll(e),
            },
        };
        self.current = None;
        Some(event)
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::thread;

    fn speaker(command: &str, timeout_ms: u64) -> Speaker {
        Speaker::new(SpeechConfig {
            enabled: true,
            command: command.to_string(),
            args: Vec::new(),
            lang: "ko".to_string(),
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    fn wait_for_event(speaker: &mut Speaker) -> SpeechEvent {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(event) = speaker.poll(Instant::now()) {
                return event;
            }
            assert!(Instant::now() < deadline, "speech never finished");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_successful_command_ends() {
        let mut speaker = speaker("true", 3000);
        speaker.speak("안녕").unwrap();
        assert!(speaker.is_speaking());
        assert!(matches!(wait_for_event(&mut speaker), SpeechEvent::Ended { .. }));
        assert!(!speaker.is_speaking());
    }

    #[test]
    fn test_failing_command_reports_exit() {
        let mut speaker = speaker("false", 3000);
        speaker.speak("안녕").unwrap();
        assert!(matches!(
            wait_for_event(&mut speaker),
            SpeechEvent::Failed {
                error: SpeechError::Exit(_),
                ..
            }
        ));
    }

    #[test]
    fn test_timeout_clears_speaking() {
        let mut speaker = speaker("sleep", 50);
        speaker.speak("5").unwrap();
        assert!(matches!(wait_for_event(&mut speaker), SpeechEvent::TimedOut { .. }));
        assert!(!speaker.is_speaking());
    }

    #[test]
    fn test_new_utterance_replaces_old() {
        let mut speaker = speaker("sleep", 3000);
        speaker.speak("5").unwrap();
        speaker.speak("0").unwrap();
        assert!(matches!(wait_for_event(&mut speaker), SpeechEvent::Ended { .. }));
    }

    #[test]
    fn test_missing_command_is_spawn_error() {
        let mut speaker = speaker("hanmadi-no-such-tts-binary", 3000);
        assert!(matches!(
            speaker.speak("안녕"),
            Err(SpeechError::Spawn { .. })
        ));
        assert!(!speaker.is_speaking());
    }

    #[test]
    fn test_disabled_speaker_does_nothing() {
        let mut speaker = speaker("hanmadi-no-such-tts-binary", 3000);
        speaker.set_enabled(false);
        assert!(speaker.speak("안녕").is_ok());
        assert!(!speaker.is_speaking());
    }
}
