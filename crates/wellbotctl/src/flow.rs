//! Diagnosis request flow: Idle -> Submitting -> Success | Failed.
//!
//! The flow owns the validation guard and the progress indicator; the
//! network call goes through a `DiagnosisBackend`.

use crate::backend::DiagnosisBackend;
use crate::selection::SelectionSet;
use std::time::Duration;
use tracing::{info, warn};
use wellbot_common::{DiagnosisRequest, DiagnosisResult, SymptomForm, WellbotError};

pub const MSG_SELECT_PART: &str = "Please select at least one body part.";
pub const MSG_IN_PROGRESS: &str = "A diagnosis request is already in progress.";

/// Progress advances by this much per tick
pub const PROGRESS_STEP: u8 = 10;
/// Progress never passes this while a request is pending
pub const PROGRESS_CEILING: u8 = 90;
pub const PROGRESS_DONE: u8 = 100;
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Submitting,
    Success(DiagnosisResult),
    Failed(String),
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Success(_) => "success",
            Self::Failed(_) => "failed",
        }
    }
}

/// Indeterminate progress: fixed steps up to a ceiling below completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    value: u8,
}

impl Progress {
    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn tick(&mut self) -> u8 {
        self.value = self.value.saturating_add(PROGRESS_STEP).min(PROGRESS_CEILING);
        self.value
    }

    pub fn complete(&mut self) {
        self.value = PROGRESS_DONE;
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

#[derive(Debug, Clone)]
pub struct DiagnosisFlow {
    state: FlowState,
    validation_error: Option<String>,
    progress: Progress,
}

impl Default for DiagnosisFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosisFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
            validation_error: None,
            progress: Progress::default(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress.value()
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    /// Selection changes clear a pending validation message
    pub fn clear_validation(&mut self) {
        self.validation_error = None;
    }

    /// Toggle a body part; any selection change clears the validation message
    pub fn toggle(&mut self, selection: &mut SelectionSet, part: &str) -> bool {
        self.clear_validation();
        selection.toggle(part)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, FlowState::Submitting)
    }

    pub fn result(&self) -> Option<&DiagnosisResult> {
        match &self.state {
            FlowState::Success(result) => Some(result),
            _ => None,
        }
    }

    /// Inline message for the form, if any
    pub fn error_line(&self) -> Option<String> {
        if let Some(msg) = &self.validation_error {
            return Some(msg.clone());
        }
        match &self.state {
            FlowState::Failed(msg) => Some(format!("Failed to get diagnosis: {}", msg)),
            _ => None,
        }
    }

    /// Guarded transition into Submitting. Returns the payload to send.
    pub fn begin(
        &mut self,
        selection: &SelectionSet,
        form: &SymptomForm,
    ) -> Result<DiagnosisRequest, WellbotError> {
        if self.is_submitting() {
            return Err(WellbotError::Validation(MSG_IN_PROGRESS.to_string()));
        }

        if selection.is_empty() {
            warn!("Diagnosis blocked: no body part selected");
            self.state = FlowState::Idle;
            self.progress.reset();
            self.validation_error = Some(MSG_SELECT_PART.to_string());
            return Err(WellbotError::Validation(MSG_SELECT_PART.to_string()));
        }

        self.validation_error = None;
        self.progress.reset();
        self.state = FlowState::Submitting;
        Ok(form.to_request(selection.to_locations()))
    }

    /// Advance the progress indicator; no-op unless Submitting
    pub fn tick(&mut self) -> u8 {
        if self.is_submitting() {
            self.progress.tick();
        }
        self.progress.value()
    }

    /// Settle a pending request
    pub fn resolve(&mut self, outcome: Result<DiagnosisResult, WellbotError>) -> &FlowState {
        if !self.is_submitting() {
            warn!("Ignoring diagnosis outcome while {}", self.state.name());
            return &self.state;
        }

        match outcome {
            Ok(result) => {
                info!("Diagnosis received");
                self.progress.complete();
                self.state = FlowState::Success(result);
            }
            Err(e) => {
                warn!("Diagnosis failed: {}", e);
                self.progress.reset();
                self.state = FlowState::Failed(e.to_string());
            }
        }
        &self.state
    }

    /// Full round trip without progress reporting
    pub async fn submit<B>(
        &mut self,
        backend: &B,
        selection: &SelectionSet,
        form: &SymptomForm,
    ) -> &FlowState
    where
        B: DiagnosisBackend + ?Sized,
    {
        self.submit_with_progress(backend, selection, form, |_| {}).await
    }

    /// Full round trip, reporting progress every `PROGRESS_INTERVAL` until it resolves
    pub async fn submit_with_progress<B, F>(
        &mut self,
        backend: &B,
        selection: &SelectionSet,
        form: &SymptomForm,
        mut on_progress: F,
    ) -> &FlowState
    where
        B: DiagnosisBackend + ?Sized,
        F: FnMut(u8),
    {
        let request = match self.begin(selection, form) {
            Ok(request) => request,
            Err(_) => return &self.state,
        };
        on_progress(self.progress());

        let call = backend.diagnose(&request);
        tokio::pin!(call);

        let mut interval = tokio::time::interval(PROGRESS_INTERVAL);
        // first tick completes immediately
        interval.tick().await;

        let outcome = loop {
            tokio::select! {
                outcome = &mut call => break outcome,
                _ = interval.tick() => on_progress(self.tick()),
            }
        };

        self.resolve(outcome);
        on_progress(self.progress());
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_caps_below_done() {
        let mut progress = Progress::default();
        for _ in 0..50 {
            assert!(progress.tick() <= PROGRESS_CEILING);
        }
        assert_eq!(progress.value(), PROGRESS_CEILING);
        progress.complete();
        assert_eq!(progress.value(), PROGRESS_DONE);
    }

    #[test]
    fn test_tick_ignored_when_idle() {
        let mut flow = DiagnosisFlow::new();
        assert_eq!(flow.tick(), 0);
    }

    #[test]
    fn test_begin_rejects_resubmission() {
        let mut flow = DiagnosisFlow::new();
        let mut selection = SelectionSet::new();
        selection.toggle("left_elbow");

        flow.begin(&selection, &SymptomForm::default()).unwrap();
        let err = flow.begin(&selection, &SymptomForm::default()).unwrap_err();
        assert_eq!(err.to_string(), MSG_IN_PROGRESS);
        assert!(flow.is_submitting());
    }

    #[test]
    fn test_failure_line_wraps_message() {
        let mut flow = DiagnosisFlow::new();
        let mut selection = SelectionSet::new();
        selection.toggle("upper_arm");
        flow.begin(&selection, &SymptomForm::default()).unwrap();
        flow.resolve(Err(WellbotError::Upstream("boom".to_string())));

        assert_eq!(flow.state(), &FlowState::Failed("boom".to_string()));
        assert_eq!(flow.error_line().unwrap(), "Failed to get diagnosis: boom");
        assert_eq!(flow.progress(), 0);
    }
}
