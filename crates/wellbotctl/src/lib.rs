//! WellBot client library - selection, diagnosis flow, presentation and feedback.
//!
//! Exposed as a library so the state machines can be driven from tests with
//! fake backends.

pub mod backend;
pub mod config;
pub mod display;
pub mod feedback;
pub mod flow;
pub mod presentation;
pub mod selection;
pub mod speech;
pub mod storage;
pub mod translate;

pub use backend::{DiagnosisBackend, HttpDiagnosisClient};
pub use flow::{DiagnosisFlow, FlowState};
pub use presentation::{Presentation, ResultSource};
pub use selection::{ModelHighlighter, SelectionSet};
pub use speech::{SpeechController, SpeechEngine, SpeechState};
pub use storage::LocalStore;
pub use translate::{LibreTranslateClient, Translator};
