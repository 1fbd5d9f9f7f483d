//! Speech playback state: Idle, Speaking, Paused.
//!
//! The controller only tracks state and forwards start/pause/resume/cancel to
//! a `SpeechEngine`; timing belongs to the engine.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::process::{Child, Command, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechState {
    #[default]
    Idle,
    Speaking,
    Paused,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpeechError {
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        from: SpeechState,
        action: &'static str,
    },

    #[error("speech engine error: {0}")]
    Engine(String),
}

/// Device speech subsystem
pub trait SpeechEngine {
    fn speak(&mut self, text: &str, locale: &str) -> Result<(), SpeechError>;
    fn pause(&mut self) -> Result<(), SpeechError>;
    fn resume(&mut self) -> Result<(), SpeechError>;
    fn cancel(&mut self) -> Result<(), SpeechError>;

    /// Whether an utterance is still playing or paused
    fn is_active(&mut self) -> bool;
}

pub struct SpeechController<E: SpeechEngine> {
    engine: E,
    state: SpeechState,
}

impl<E: SpeechEngine> SpeechController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: SpeechState::Idle,
        }
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn require(&self, wanted: SpeechState, action: &'static str) -> Result<(), SpeechError> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(SpeechError::InvalidTransition {
                from: self.state,
                action,
            })
        }
    }

    /// Idle -> Speaking
    pub fn speak(&mut self, text: &str, locale: &str) -> Result<(), SpeechError> {
        self.require(SpeechState::Idle, "speak")?;
        self.engine.speak(text, locale)?;
        self.state = SpeechState::Speaking;
        Ok(())
    }

    /// Speaking -> Paused
    pub fn pause(&mut self) -> Result<(), SpeechError> {
        self.require(SpeechState::Speaking, "pause")?;
        self.engine.pause()?;
        self.state = SpeechState::Paused;
        Ok(())
    }

    /// Paused -> Speaking
    pub fn resume(&mut self) -> Result<(), SpeechError> {
        self.require(SpeechState::Paused, "resume")?;
        self.engine.resume()?;
        self.state = SpeechState::Speaking;
        Ok(())
    }

    /// Any -> Idle
    pub fn stop(&mut self) -> Result<(), SpeechError> {
        let result = self.engine.cancel();
        self.state = SpeechState::Idle;
        result
    }

    /// Drop back to Idle once the engine finished on its own
    pub fn refresh(&mut self) -> SpeechState {
        if self.state != SpeechState::Idle && !self.engine.is_active() {
            debug!("Utterance finished");
            self.state = SpeechState::Idle;
        }
        self.state
    }
}

/// Speaks through an `espeak-ng` child process; pause/resume stop and continue it.
pub struct ProcessSpeechEngine {
    program: String,
    child: Option<Child>,
}

impl Default for ProcessSpeechEngine {
    fn default() -> Self {
        Self::new("espeak-ng")
    }
}

impl ProcessSpeechEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: None,
        }
    }

    fn voice(locale: &str) -> String {
        match locale.split('-').next() {
            Some("hi") => "hi".to_string(),
            Some("en") | None => "en-us".to_string(),
            Some(other) => other.to_lowercase(),
        }
    }

    fn signal(&self, signal: Signal) -> Result<(), SpeechError> {
        let child = self
            .child
            .as_ref()
            .ok_or_else(|| SpeechError::Engine("no utterance in progress".to_string()))?;
        let pid = i32::try_from(child.id())
            .map_err(|_| SpeechError::Engine("child pid out of range".to_string()))?;
        kill(Pid::from_raw(pid), signal).map_err(|e| SpeechError::Engine(e.to_string()))
    }
}

impl SpeechEngine for ProcessSpeechEngine {
    fn speak(&mut self, text: &str, locale: &str) -> Result<(), SpeechError> {
        let child = Command::new(&self.program)
            .arg("-v")
            .arg(Self::voice(locale))
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SpeechError::Engine(format!("failed to start {}: {}", self.program, e)))?;
        info!("Speaking ({}) via {}", locale, self.program);
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), SpeechError> {
        self.signal(Signal::SIGSTOP)
    }

    fn resume(&mut self) -> Result<(), SpeechError> {
        self.signal(Signal::SIGCONT)
    }

    fn cancel(&mut self) -> Result<(), SpeechError> {
        if self.child.is_none() {
            return Ok(());
        }
        // a stopped process must be continued before it can exit
        if let Err(e) = self.signal(Signal::SIGCONT) {
            debug!("SIGCONT before cancel failed: {}", e);
        }
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!("Speech process already gone: {}", e);
            }
            if let Err(e) = child.wait() {
                warn!("Failed to reap speech process: {}", e);
            }
        }
        Ok(())
    }

    fn is_active(&mut self) -> bool {
        match self.child.as_mut().map(|c| c.try_wait()) {
            Some(Ok(None)) => true,
            Some(Ok(Some(_))) | Some(Err(_)) => {
                self.child = None;
                false
            }
            None => false,
        }
    }
}
