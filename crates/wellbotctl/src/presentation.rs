//! Diagnosis presentation: result source, language toggle and read-aloud text.
//!
//! Independent of the request flow once entered. Translations are never
//! cached; every switch away from English goes back to the translator.

use crate::speech::{SpeechController, SpeechEngine, SpeechError};
use crate::storage::LocalStore;
use crate::translate::Translator;
use tracing::{debug, info, warn};
use wellbot_common::{strip_emphasis, ConditionParts, DiagnosisResult, Language, WellbotError};

/// Where the displayed result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Navigation,
    Storage,
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct Presentation {
    original: DiagnosisResult,
    shown: DiagnosisResult,
    language: Language,
    source: ResultSource,
    translation_error: Option<String>,
}

impl Presentation {
    pub fn new(result: DiagnosisResult, source: ResultSource) -> Self {
        Self {
            shown: result.clone(),
            original: result,
            language: Language::English,
            source,
            translation_error: None,
        }
    }

    /// Navigation state first, then local storage, then the placeholder
    pub fn resolve(navigation: Option<DiagnosisResult>, storage: &LocalStore) -> Self {
        if let Some(result) = navigation {
            return Self::new(result, ResultSource::Navigation);
        }

        match storage.load_diagnosis() {
            Ok(Some(result)) => {
                debug!("Loaded diagnosis from {}", storage.path().display());
                Self::new(result, ResultSource::Storage)
            }
            Ok(None) => Self::new(DiagnosisResult::unavailable(), ResultSource::Placeholder),
            Err(e) => {
                warn!("Stored diagnosis unreadable: {}", e);
                Self::new(DiagnosisResult::unavailable(), ResultSource::Placeholder)
            }
        }
    }

    pub fn source(&self) -> ResultSource {
        self.source
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Result as received, always English
    pub fn original(&self) -> &DiagnosisResult {
        &self.original
    }

    /// Result in the current language
    pub fn shown(&self) -> &DiagnosisResult {
        &self.shown
    }

    /// Last translation failure, cleared by the next toggle
    pub fn translation_error(&self) -> Option<&str> {
        self.translation_error.as_deref()
    }

    pub fn condition_parts(&self) -> ConditionParts<'_> {
        self.shown.condition_parts()
    }

    pub fn headings(&self) -> (&'static str, &'static str) {
        self.language.headings()
    }

    /// Switch to `target`. One translator call per field unless the target is English.
    pub async fn set_language<T>(&mut self, target: Language, translator: &T)
    where
        T: Translator + ?Sized,
    {
        self.language = target;
        self.translation_error = None;

        if target.is_source() {
            self.shown = self.original.clone();
            return;
        }

        info!("Translating diagnosis to {}", target);
        let (diagnosis, recommendations) = tokio::join!(
            translator.translate(&self.original.diagnosis, target),
            translator.translate(&self.original.recommendations, target),
        );

        let mut failure = None;
        let mut or_original = |outcome: Result<String, WellbotError>, original: &str| match outcome {
            Ok(text) => text,
            Err(e) => {
                warn!("Translation failed, showing original text: {}", e);
                failure = Some(e.to_string());
                original.to_string()
            }
        };
        let diagnosis = or_original(diagnosis, &self.original.diagnosis);
        let recommendations = or_original(recommendations, &self.original.recommendations);

        self.shown = DiagnosisResult::new(diagnosis, recommendations);
        self.translation_error = failure;
    }

    pub async fn toggle_language<T>(&mut self, translator: &T)
    where
        T: Translator + ?Sized,
    {
        self.set_language(self.language.toggled(), translator).await
    }

    /// Text read aloud for the current language
    pub fn speech_text(&self) -> String {
        let (diagnosis_label, recommendations_label) = self.language.speech_labels();
        format!(
            "{}: {}. {}: {}",
            diagnosis_label,
            strip_emphasis(&self.shown.diagnosis),
            recommendations_label,
            self.shown.recommendations
        )
    }

    pub fn speak<E: SpeechEngine>(
        &self,
        speech: &mut SpeechController<E>,
    ) -> Result<(), SpeechError> {
        speech.speak(&self.speech_text(), self.language.speech_locale())
    }

    /// Pair handed to the feedback form
    pub fn feedback_handoff(&self) -> (String, String) {
        (
            self.original.diagnosis.clone(),
            self.original.recommendations.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_speech_text_strips_markers() {
        let p = Presentation::new(
            DiagnosisResult::new("You may have **Tennis Elbow**.", "Rest the arm."),
            ResultSource::Navigation,
        );
        assert_eq!(
            p.speech_text(),
            "Diagnosis: You may have Tennis Elbow.. Recommendations: Rest the arm."
        );
    }

    #[test]
    fn test_navigation_wins_over_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().join("s.json"));
        storage
            .save_diagnosis(&DiagnosisResult::new("stored", "stored"))
            .unwrap();

        let p = Presentation::resolve(Some(DiagnosisResult::new("nav", "nav")), &storage);
        assert_eq!(p.source(), ResultSource::Navigation);
        assert_eq!(p.shown().diagnosis, "nav");

        let p = Presentation::resolve(None, &storage);
        assert_eq!(p.source(), ResultSource::Storage);
        assert_eq!(p.shown().diagnosis, "stored");
    }

    #[test]
    fn test_placeholder_when_nothing_stored() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().join("missing.json"));
        let p = Presentation::resolve(None, &storage);
        assert_eq!(p.source(), ResultSource::Placeholder);
        assert_eq!(p.shown(), &DiagnosisResult::unavailable());
    }
}
