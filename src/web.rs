//! Minimal interactive web form.
//!
//! One text field ("company name") and an Analyze button. Submitting the form
//! runs the pipeline and renders the combined summary with an embedded audio
//! player, or a warning when nothing was produced. Failures are reported
//! generically; the failing stage is never shown.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | Empty form |
//! | `POST /analyze` | Run the pipeline for the submitted company |
//! | `GET /audio` | Serve the narrated summary |

use crate::models::NewsAnalysis;
use crate::utils::escape_html;
use axum::{
    Form, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::fmt::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

/// Runs one analysis to completion on a blocking worker thread.
pub type Runner = Arc<dyn Fn(String) -> Option<NewsAnalysis> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    runner: Runner,
    /// Runs share the output files, so only one may be in flight.
    run_lock: Arc<Mutex<()>>,
    audio_path: PathBuf,
    target_lang: String,
}

impl AppState {
    pub fn new(runner: Runner, audio_path: PathBuf, target_lang: String) -> Self {
        Self {
            runner,
            run_lock: Arc::new(Mutex::new(())),
            audio_path,
            target_lang,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub company_name: String,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", get(index).post(analyze))
        .route("/audio", get(audio))
        .with_state(state)
}

/// Bind `addr` and serve the form until the process exits.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Serving news analysis form");
    axum::serve(listener, create_app(state)).await
}

async fn index() -> Html<String> {
    Html(render_page("", ""))
}

#[instrument(level = "info", skip_all)]
async fn analyze(State(state): State<AppState>, Form(form): Form<AnalyzeForm>) -> Html<String> {
    let company_name = form.company_name.trim().to_string();
    if company_name.is_empty() {
        return Html(render_page("", &warning("Please enter a company name.")));
    }
    info!(%company_name, "Analysis requested");

    // The guard moves into the worker so a dropped request cannot release it
    // while the run is still writing.
    let guard = Arc::clone(&state.run_lock).lock_owned().await;
    let runner = Arc::clone(&state.runner);
    let name = company_name.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        runner(name)
    })
    .await;

    let body = match outcome {
        Ok(analysis) => render_outcome(analysis.as_ref(), &state.target_lang),
        Err(e) => {
            error!(error = %e, "Analysis task failed");
            format!(
                r#"<div class="error">An error occurred while analyzing news: {}</div>"#,
                escape_html(&e.to_string())
            )
        }
    };
    Html(render_page(&company_name, &body))
}

async fn audio(State(state): State<AppState>) -> Response {
    match tokio::fs::read(&state.audio_path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "audio/mpeg"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Audio file not found.").into_response(),
    }
}

fn warning(message: &str) -> String {
    format!(r#"<div class="warning">{}</div>"#, escape_html(message))
}

fn render_outcome(analysis: Option<&NewsAnalysis>, target_lang: &str) -> String {
    let mut body = String::new();
    match analysis {
        Some(a) => {
            let _ = write!(
                body,
                "<h3>Summary:</h3><p>{}</p><p>Overall sentiment: {}</p>",
                escape_html(&a.summary),
                a.sentiment
            );
            let _ = write!(body, "<h3>Articles ({}):</h3><ul>", a.articles.len());
            for article in &a.articles {
                let _ = write!(
                    body,
                    r#"<li><a href="{}">{}</a> <small>{} · {}</small></li>"#,
                    escape_html(&article.url),
                    escape_html(&article.title),
                    escape_html(&article.date_time),
                    article.sentiment
                );
            }
            body.push_str("</ul>");
        }
        None => body.push_str(&warning("No articles found for this company.")),
    }

    match analysis {
        Some(a) if a.audio_path.exists() => {
            let _ = write!(
                body,
                r#"<h3>Summary audio in {}:</h3><audio controls src="/audio" type="audio/mpeg"></audio>"#,
                escape_html(language_name(target_lang))
            );
        }
        _ => body.push_str(&warning("Audio file not found.")),
    }
    body
}

/// English name of a target language code, or the code itself.
fn language_name(code: &str) -> &str {
    match code {
        "hi" => "Hindi",
        "en" => "English",
        "bn" => "Bengali",
        "ta" => "Tamil",
        "te" => "Telugu",
        "mr" => "Marathi",
        "gu" => "Gujarati",
        "ur" => "Urdu",
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        _ => code,
    }
}

fn render_page(company_name: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>News Analysis and Summarization</title></head>
<body>
<h1>News Analysis and Summarization</h1>
<form method="post" action="/analyze">
<label for="company_name">Enter company name:</label>
<input id="company_name" name="company_name" value="{}">
<button type="submit">Analyze</button>
</form>
{}
</body>
</html>
"#,
        escape_html(company_name),
        body
    )
}
