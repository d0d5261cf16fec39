//! Interactive REPL
//!
//! Each line is run through the orchestrator inside a persistent session.
//! The session is saved after every turn and again on the way out.

use crewline_core::{Config, Orchestrator, SessionManager};
use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, Emacs, KeyCode, KeyModifiers, Keybindings,
    MenuBuilder, Prompt, Reedline, ReedlineEvent, ReedlineMenu, Signal, Suggestion,
};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::info;

use crate::format_delegation_chain;

/// Slash commands offered by the completer
const COMMANDS: &[(&str, &str)] = &[
    ("/history", "Show the conversation history"),
    ("/prefs", "Show learned preferences"),
    ("/clear", "Clear the conversation history"),
    ("/help", "Show this help"),
];

/// Words that save the session and leave the REPL
const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

/// Command completer for reedline
#[derive(Clone)]
pub struct CommandCompleter {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        if !line.starts_with('/') {
            return Vec::new();
        }

        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                extra: None,
                span: reedline::Span::new(0, pos),
                append_whitespace: true,
                style: None,
            })
            .collect()
    }
}

/// Prompt showing the active session id
struct SessionPrompt {
    session_id: String,
    style: Style,
}

impl SessionPrompt {
    fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for SessionPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.style.paint("you> ").to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Owned(Style::new().dimmed().paint(self.session_id.as_str()).to_string())
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// What the REPL should do with one line of input
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Exit,
    History,
    Prefs,
    Clear,
    Help,
    Unknown(String),
    Query(String),
}

fn parse_command(input: &str) -> Command {
    let lower = input.to_lowercase();

    if EXIT_WORDS.contains(&lower.as_str()) || lower == "/exit" || lower == "/quit" {
        return Command::Exit;
    }

    match lower.as_str() {
        "/history" => Command::History,
        "/prefs" => Command::Prefs,
        "/clear" => Command::Clear,
        "/help" | "/?" => Command::Help,
        _ if lower.starts_with('/') => Command::Unknown(input.to_string()),
        _ => Command::Query(input.to_string()),
    }
}

/// New session ids are the local start time
pub fn new_session_id() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Run the REPL until the user exits
pub async fn run_repl(
    config: &Config,
    orchestrator: Arc<Orchestrator>,
    session_id: Option<String>,
) -> anyhow::Result<()> {
    let resuming = session_id.is_some();
    let session_id = session_id.unwrap_or_else(new_session_id);

    let mut session = SessionManager::from_config(&config.session, session_id)
        .map_err(|e| anyhow::anyhow!("Failed to open session: {}", e))?;

    info!(session = %session.session_id(), "Starting REPL");
    print_welcome(&session, config, resuming);

    let mut keybindings = default_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Char('/'),
        ReedlineEvent::Edit(vec![reedline::EditCommand::InsertChar('/'), reedline::EditCommand::Complete]),
    );

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_menu")
            .with_columns(1)
            .with_column_width(Some(40))
            .with_only_buffer_difference(false),
    );

    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = SessionPrompt::new(session.session_id());

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                match parse_command(input) {
                    Command::Exit => break,
                    Command::History => print_history(&session),
                    Command::Prefs => print_prefs(&session),
                    Command::Clear => {
                        session.clear();
                        save(&session);
                        println!("\nConversation history cleared.\n");
                    }
                    Command::Help => print_help(),
                    Command::Unknown(cmd) => {
                        eprintln!("\nUnknown command: {}. Type /help for the list.\n", cmd);
                    }
                    Command::Query(query) => {
                        run_turn(&mut session, &orchestrator, &query).await;
                        save(&session);
                    }
                }
            }
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => {
                println!();
                break;
            }
            Err(err) => {
                eprintln!("\nInput error: {}\n", err);
                break;
            }
        }
    }

    save(&session);
    println!("\nSession {} saved. Goodbye!\n", session.session_id());
    Ok(())
}

async fn run_turn(session: &mut SessionManager, orchestrator: &Orchestrator, query: &str) {
    let style = Color::Green.bold();

    match session.process_inquiry(orchestrator, query).await {
        Ok(outcome) => {
            println!("\n{}\n{}\n", style.paint("crewline:"), outcome.response);

            let agents = outcome.agents_used();
            if !agents.is_empty() {
                println!("{}", Style::new().dimmed().paint(format!("Agents: {}", agents.join(", "))));
            }
            if !outcome.delegation_history.is_empty() {
                println!("{}", Color::Yellow.paint("Delegations:"));
                println!("{}", format_delegation_chain(&outcome.delegation_history));
            }
            println!();
        }
        Err(e) => {
            eprintln!("\n{} {}\n", Color::Red.bold().paint("Error:"), e);
        }
    }
}

/// Persistence is best effort; a failed save is reported and the REPL goes on
fn save(session: &SessionManager) {
    if let Err(e) = session.save() {
        tracing::warn!(session = %session.session_id(), error = %e, "Failed to save session");
        eprintln!("Warning: could not save session: {}", e);
    }
}

fn default_keybindings() -> Keybindings {
    let mut keybindings = Keybindings::new();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('c'), ReedlineEvent::CtrlC);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::CtrlD);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings
}

fn print_welcome(session: &SessionManager, config: &Config, resuming: bool) {
    println!();
    println!("{}", Color::Cyan.bold().paint("crewline - multi-agent assistant"));
    println!("Roster: {}", config.orchestrator.roster);
    if resuming {
        println!(
            "Resumed session {} ({} previous turns)",
            session.session_id(),
            session.context().turn_count()
        );
    } else {
        println!("Session: {}", session.session_id());
    }
    println!("Commands: /history, /prefs, /clear, /help. Type exit, quit or bye to leave.");
    println!();
}

fn print_help() {
    println!();
    println!("Available commands:");
    for (cmd, desc) in COMMANDS {
        println!("  {:<10} {}", cmd, desc);
    }
    println!("  {:<10} Save the session and quit", EXIT_WORDS.join("/"));
    println!();
}

fn print_history(session: &SessionManager) {
    let turns = &session.context().turns;

    println!();
    println!("Conversation history ({} turns):", turns.len());
    println!("{}", "─".repeat(50));

    for (i, turn) in turns.iter().enumerate() {
        println!(
            "{}. [{}] You: {}",
            i + 1,
            turn.timestamp.format("%H:%M:%S"),
            preview(&turn.input)
        );
        println!("   crewline: {}", preview(&turn.output));
    }

    println!("{}", "─".repeat(50));
    println!();
}

fn print_prefs(session: &SessionManager) {
    let prefs = &session.context().user_preferences;

    println!();
    if prefs.is_empty() {
        println!("No preferences learned yet.");
    } else {
        println!("Learned preferences:");
        for (key, value) in prefs {
            let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
            println!("  {}: {}", key, value);
        }
    }
    println!();
}

/// First 100 characters on one line
fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > 100 {
        format!("{}...", flat.chars().take(100).collect::<String>())
    } else {
        flat
    }
}
