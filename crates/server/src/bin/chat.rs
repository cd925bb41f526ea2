//! Interactive console for the concierge chat router
//!
//! Runs every line typed on stdin through the turn orchestrator against a
//! single local session.
//!
//! Commands:
//! - `/load <path>`: load a text document (relative paths also resolve
//!   against `documents.path`)
//! - `/status`: show session state
//! - `/reset`: clear the appointment data
//! - `/quit`: exit

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use concierge_agent::{load_document, TurnOrchestrator};
use concierge_config::{load_settings, Settings};
use concierge_core::{Session, SystemClock};
use concierge_llm::{LlmBackend, LlmConfig, OllamaBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("CONCIERGE_ENV").ok();
    let config = load_settings(env.as_deref()).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concierge=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let backend = OllamaBackend::new(LlmConfig::from(&config.llm))?;
    if !backend.is_available().await {
        eprintln!(
            "Warning: Ollama is not reachable at {}; replies will use fallbacks.",
            config.llm.endpoint
        );
    }
    let llm: Arc<dyn LlmBackend> = Arc::new(backend);
    let orchestrator = TurnOrchestrator::from_settings(llm, Arc::new(SystemClock), &config.llm);

    let mut session = Session::with_random_id();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Concierge console (model: {})", config.llm.model);
    println!("Commands: /load <path>, /status, /reset, /quit");

    loop {
        stdout.write_all(b"\nYou: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_once(' ').map_or((input, ""), |(c, rest)| (c, rest.trim())) {
            ("/quit" | "/exit", _) => break,
            ("/reset", _) => {
                session.appointment_data.clear();
                println!("Appointment data cleared.");
            }
            ("/status", _) => print_status(&session),
            ("/load", "") => println!("Usage: /load <path>"),
            ("/load", path) => {
                let path = resolve_document_path(path, &config);
                match load_document(&path) {
                    Ok(content) => {
                        session.set_documents(content);
                        println!("Loaded {}. You can now ask questions about it.", path.display());
                    }
                    Err(e) => println!("Could not load {}: {}", path.display(), e),
                }
            }
            _ => {
                let result = orchestrator.run_turn(input, &mut session).await;
                println!("\nAssistant [{}]: {}", result.intent, result.response);
                print_appointment(&session);
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn resolve_document_path(raw: &str, config: &Settings) -> PathBuf {
    let path = Path::new(raw);
    if path.is_relative() && !path.exists() {
        let candidate = Path::new(&config.documents.path).join(path);
        if candidate.exists() {
            return candidate;
        }
    }
    path.to_path_buf()
}

fn print_appointment(session: &Session) {
    let data = &session.appointment_data;
    if data.is_empty() {
        return;
    }
    println!("\n--- Current Appointment Data ---");
    for (field, value) in data.iter() {
        println!("  {}: {}", field.label(), value);
    }
}

fn print_status(session: &Session) {
    println!("Session: {}", session.id);
    println!("  Documents loaded: {}", if session.has_documents() { "yes" } else { "no" });
    println!(
        "  Appointment fields missing: {}",
        session
            .appointment_data
            .missing_fields()
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Conversation turns: {}", session.conversation_history.len());
}
