//! Command handlers for wellbotctl.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use wellbot_common::body_parts::{is_known, BODY_PARTS};
use wellbot_common::{Language, SymptomForm};

use wellbotctl::config::ClientConfig;
use wellbotctl::display;
use wellbotctl::feedback::{FeedbackClient, FeedbackForm, FeedbackSink, MSG_THANKS};
use wellbotctl::flow::{DiagnosisFlow, FlowState, PROGRESS_DONE};
use wellbotctl::presentation::{Presentation, ResultSource};
use wellbotctl::selection::{Material, MeshClick, ModelHighlighter, SelectionSet};
use wellbotctl::speech::{ProcessSpeechEngine, SpeechController, SpeechState};
use wellbotctl::translate::LibreTranslateClient;
use wellbotctl::HttpDiagnosisClient;

use crate::{DiagnoseArgs, FeedbackAction};

/// Apply `--part` clicks in order, as the model view would
fn select_parts(clicks: &[String], flow: &mut DiagnosisFlow) -> SelectionSet {
    let mut selection = SelectionSet::new();
    for name in clicks {
        let click = MeshClick {
            mesh_name: name.clone(),
        };
        let Some(part) = click.part_name() else {
            continue;
        };
        if !is_known(part) {
            warn!("{} is not a known body part; sending as-is", part);
        }
        flow.toggle(&mut selection, part);
    }
    selection
}

fn parse_language(code: &str) -> Result<Language> {
    Language::from_code(code).with_context(|| format!("unsupported language: {}", code))
}

/// Handle parts command
pub fn parts(clicks: &[String]) -> Result<()> {
    let mut flow = DiagnosisFlow::new();
    let selection = select_parts(clicks, &mut flow);
    let meshes = BODY_PARTS.iter().map(|(name, _)| (*name, None::<Material>));
    let highlighter = ModelHighlighter::capture(meshes);

    display::print_parts(&selection);
    if !selection.is_empty() {
        println!();
        display::print_selection(&selection);
        for (mesh, material) in highlighter.render(&selection) {
            println!("  {:15} #{:06x}", mesh, material.color);
        }
    }
    Ok(())
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(u64::from(PROGRESS_DONE));
    if let Ok(style) =
        ProgressStyle::default_bar().template("{msg} [{bar:30.green/white}] {pos:>3}%")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message("Analyzing symptoms");
    bar
}

/// Handle diagnose command
pub async fn diagnose(config: &ClientConfig, args: DiagnoseArgs) -> Result<()> {
    let language = parse_language(&args.lang)?;
    let mut flow = DiagnosisFlow::new();
    let selection = select_parts(&args.parts, &mut flow);

    let form = SymptomForm {
        pain_type: args.pain_type.unwrap_or_default(),
        duration: args.duration.unwrap_or_default(),
        severity: args.severity,
        additional: args.additional.unwrap_or_default(),
        extra_details: args.extra_details.unwrap_or_default(),
        medical_history: args.medical_history.unwrap_or_default(),
        age: args.age.unwrap_or_default(),
        gender: args.gender.unwrap_or_default(),
        follow_up_answer: args.follow_up_answer.unwrap_or_default(),
    };

    if !selection.is_empty() {
        display::print_selection(&selection);
    }

    let backend = HttpDiagnosisClient::new(&config.endpoints.diagnose_url);
    let bar = progress_bar();
    flow.submit_with_progress(&backend, &selection, &form, |p| {
        bar.set_position(u64::from(p))
    })
    .await;
    bar.finish_and_clear();

    let result = match flow.state() {
        FlowState::Success(result) => result.clone(),
        FlowState::Idle | FlowState::Failed(_) => {
            let line = flow
                .error_line()
                .unwrap_or_else(|| "Diagnosis did not complete".to_string());
            display::print_error(&line);
            bail!(line);
        }
        FlowState::Submitting => bail!("diagnosis still pending"),
    };

    let storage = config.local_store();
    if let Err(e) = storage.save_diagnosis(&result) {
        warn!("Could not persist diagnosis: {}", e);
    }

    let presentation = Presentation::resolve(Some(result), &storage);
    present(config, presentation, language, args.speak).await
}

/// Handle show command
pub async fn show(config: &ClientConfig, lang: &str, speak: bool) -> Result<()> {
    let language = parse_language(lang)?;
    let presentation = Presentation::resolve(None, &config.local_store());
    if presentation.source() == ResultSource::Placeholder {
        info!("No stored diagnosis found");
    }
    present(config, presentation, language, speak).await
}

async fn present(
    config: &ClientConfig,
    mut presentation: Presentation,
    language: Language,
    speak: bool,
) -> Result<()> {
    if !language.is_source() {
        let translator = LibreTranslateClient::new(&config.endpoints.translate_url);
        presentation.set_language(language, &translator).await;
    }
    display::print_presentation(&presentation);

    if speak {
        let engine = ProcessSpeechEngine::new(&config.speech.program);
        let mut speech = SpeechController::new(engine);
        presentation
            .speak(&mut speech)
            .context("failed to start speech")?;
        speech_loop(&mut speech).await?;
    }

    println!();
    println!(
        "{}",
        "Rate this diagnosis with `wellbotctl feedback submit`.".dimmed()
    );
    Ok(())
}

/// Drive playback from stdin: `p` pause, `r` resume, `s` stop
async fn speech_loop(speech: &mut SpeechController<ProcessSpeechEngine>) -> Result<()> {
    println!("{}", "Speaking. [p]ause  [r]esume  [s]top".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(Duration::from_millis(200));
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = poll.tick() => {
                if speech.refresh() == SpeechState::Idle {
                    return Ok(());
                }
            }
            line = lines.next_line(), if stdin_open => {
                let outcome = match line?.as_deref().map(str::trim) {
                    Some("p") => speech.pause(),
                    Some("r") => speech.resume(),
                    Some("s") => {
                        speech.stop()?;
                        return Ok(());
                    }
                    Some(_) => Ok(()),
                    // no controls without a terminal; play to the end
                    None => {
                        stdin_open = false;
                        Ok(())
                    }
                };
                if let Err(e) = outcome {
                    display::print_error(&e.to_string());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                speech.stop()?;
                return Ok(());
            }
        }
    }
}

/// Handle feedback subcommands
pub async fn feedback(config: &ClientConfig, action: FeedbackAction) -> Result<()> {
    let client = FeedbackClient::new(
        &config.endpoints.feedback_url,
        &config.endpoints.feedback_api_key,
    );

    match action {
        FeedbackAction::Submit {
            usefulness,
            accuracy,
            comments,
        } => {
            let mut form = match config.local_store().load_diagnosis() {
                Ok(Some(result)) => {
                    let presentation = Presentation::new(result, ResultSource::Storage);
                    let (diagnosis, recommendations) = presentation.feedback_handoff();
                    FeedbackForm::for_result(diagnosis, recommendations)
                }
                _ => FeedbackForm::default(),
            };
            form.usefulness = usefulness;
            form.accuracy = accuracy;
            form.comments = comments;
            if let Some(subject) = form.subject() {
                println!("{} {}", "Rating:".bold(), subject);
            }

            match client.submit(&form).await {
                Ok(ack) => {
                    info!("{}", ack.message);
                    display::print_ok(MSG_THANKS);
                    Ok(())
                }
                Err(e) => {
                    display::print_error(&e.to_string());
                    bail!(e)
                }
            }
        }
        FeedbackAction::List => {
            let records = client.list().await.map_err(|e| {
                display::print_error(&e.to_string());
                e
            })?;
            display::print_feedback_records(&records);
            Ok(())
        }
    }
}
