//! Presentation language toggling and speech control with fakes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use wellbot_common::{DiagnosisResult, Language, WellbotError};
use wellbotctl::speech::SpeechError;
use wellbotctl::{
    Presentation, ResultSource, SpeechController, SpeechEngine, SpeechState, Translator,
};

/// Prefixes text with the target code; optionally fails on one input
struct CountingTranslator {
    calls: AtomicUsize,
    fail_on: Option<&'static str>,
}

impl CountingTranslator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on: None,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for CountingTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String, WellbotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(text) {
            return Err(WellbotError::Upstream("translation down".to_string()));
        }
        Ok(format!("[{}] {}", target, text))
    }
}

#[derive(Default)]
struct FakeEngine {
    spoken: Vec<(String, String)>,
    pauses: usize,
    resumes: usize,
    cancels: usize,
    /// Polls answered "active" before the utterance ends
    remaining_polls: usize,
}

impl SpeechEngine for FakeEngine {
    fn speak(&mut self, text: &str, locale: &str) -> Result<(), SpeechError> {
        self.spoken.push((text.to_string(), locale.to_string()));
        self.remaining_polls = 1;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), SpeechError> {
        self.pauses += 1;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), SpeechError> {
        self.resumes += 1;
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), SpeechError> {
        self.cancels += 1;
        Ok(())
    }

    fn is_active(&mut self) -> bool {
        if self.remaining_polls == 0 {
            return false;
        }
        self.remaining_polls -= 1;
        true
    }
}

fn sample() -> Presentation {
    Presentation::new(
        DiagnosisResult::new("Likely **Tennis Elbow** from strain.", "Rest and ice."),
        ResultSource::Navigation,
    )
}

#[tokio::test]
async fn test_each_toggle_translates_both_fields() {
    let translator = CountingTranslator::new();
    let mut p = sample();

    p.toggle_language(&translator).await;
    assert_eq!(p.language(), Language::Hindi);
    assert_eq!(translator.calls(), 2);
    assert_eq!(p.shown().recommendations, "[hi] Rest and ice.");

    p.toggle_language(&translator).await;
    assert_eq!(p.language(), Language::English);
    assert_eq!(translator.calls(), 2);
    assert_eq!(p.shown(), p.original());

    p.toggle_language(&translator).await;
    assert_eq!(translator.calls(), 4);
}

#[tokio::test]
async fn test_failed_field_falls_back_to_original() {
    let translator = CountingTranslator {
        calls: AtomicUsize::new(0),
        fail_on: Some("Rest and ice."),
    };
    let mut p = sample();

    p.set_language(Language::Hindi, &translator).await;

    assert_eq!(translator.calls(), 2);
    assert!(p.shown().diagnosis.starts_with("[hi] "));
    assert_eq!(p.shown().recommendations, "Rest and ice.");
    assert_eq!(p.translation_error(), Some("translation down"));
}

#[tokio::test]
async fn test_condition_is_split_from_translated_text() {
    let translator = CountingTranslator::new();
    let mut p = sample();
    p.set_language(Language::Hindi, &translator).await;

    let parts = p.condition_parts();
    assert_eq!(parts.before, "[hi] Likely ");
    assert_eq!(parts.condition, Some("Tennis Elbow"));
    assert_eq!(parts.after, " from strain.");
}

#[tokio::test]
async fn test_hindi_speech_uses_hindi_labels_and_locale() {
    let translator = CountingTranslator::new();
    let mut p = sample();
    p.set_language(Language::Hindi, &translator).await;

    let mut speech = SpeechController::new(FakeEngine::default());
    p.speak(&mut speech).unwrap();

    let (text, locale) = &speech.engine().spoken[0];
    assert_eq!(locale, "hi-IN");
    assert_eq!(
        text,
        "निदान: [hi] Likely Tennis Elbow from strain.. सिफारिशें: [hi] Rest and ice."
    );
}

#[test]
fn test_speech_transitions() {
    let mut speech = SpeechController::new(FakeEngine::default());

    assert!(matches!(
        speech.pause(),
        Err(SpeechError::InvalidTransition { .. })
    ));
    assert_eq!(speech.engine().pauses, 0);

    speech.speak("hello", "en-US").unwrap();
    assert_eq!(speech.state(), SpeechState::Speaking);
    assert!(speech.speak("again", "en-US").is_err());
    assert!(speech.resume().is_err());

    speech.pause().unwrap();
    assert_eq!(speech.state(), SpeechState::Paused);
    speech.resume().unwrap();
    assert_eq!(speech.state(), SpeechState::Speaking);

    speech.stop().unwrap();
    assert_eq!(speech.state(), SpeechState::Idle);
    assert_eq!(speech.engine().cancels, 1);
    assert_eq!(speech.engine().spoken.len(), 1);
    assert_eq!((speech.engine().pauses, speech.engine().resumes), (1, 1));
}

#[test]
fn test_stop_from_idle_still_cancels() {
    let mut speech = SpeechController::new(FakeEngine::default());
    speech.stop().unwrap();
    assert_eq!(speech.state(), SpeechState::Idle);
    assert_eq!(speech.engine().cancels, 1);
}

#[test]
fn test_finished_utterance_returns_to_idle() {
    let mut speech = SpeechController::new(FakeEngine::default());

    speech.speak("short", "en-US").unwrap();
    assert_eq!(speech.refresh(), SpeechState::Speaking);
    assert_eq!(speech.refresh(), SpeechState::Idle);
    assert_eq!(speech.engine().cancels, 0);
}
