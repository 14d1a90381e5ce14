//! Interactive prompt loop
//!
//! Lines are read on a dedicated thread with rustyline and forwarded over a
//! channel, so the async loop can keep polling the active session while the
//! user types the next prompt. Output produced meanwhile goes through
//! rustyline's external printer so it lands above the prompt.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;

use colored::Colorize;
use eyre::Result;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, ExternalPrinter};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::controller::{PollOutcome, SessionController, SubmitError};
use crate::surface::Surface;

/// Input forwarded from the readline thread
#[derive(Debug)]
enum ReplInput {
    Line(String),
    Interrupted,
    Eof,
    Failed(String),
}

/// What the loop does after handling a line
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

type SharedPrinter = Arc<Mutex<Option<Box<dyn ExternalPrinter + Send>>>>;

/// Writer that prints above the readline prompt
///
/// Bytes are buffered until `flush`; each flush becomes one message. Until
/// the editor has installed its printer, messages go to stdout.
#[derive(Clone, Default)]
pub struct PromptOutput {
    printer: SharedPrinter,
    pending: Vec<u8>,
}

impl PromptOutput {
    pub fn new() -> Self {
        Self::default()
    }

    fn install(&self, printer: Box<dyn ExternalPrinter + Send>) {
        match self.printer.lock() {
            Ok(mut slot) => *slot = Some(printer),
            Err(e) => warn!(error = %e, "PromptOutput::install: printer lock poisoned"),
        }
    }
}

impl Write for PromptOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();

        let mut slot = self
            .printer
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        match slot.as_mut() {
            Some(printer) => printer.print(text).map_err(|e| io::Error::other(e.to_string())),
            None => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes())?;
                out.flush()
            }
        }
    }
}

/// Interactive session around one controller
pub struct Repl<S: Surface> {
    controller: SessionController<S>,
    output: PromptOutput,
}

impl<S: Surface> Repl<S> {
    /// `output` should be the writer the controller's surface prints to
    pub fn new(controller: SessionController<S>, output: PromptOutput) -> Self {
        Self { controller, output }
    }

    pub fn controller(&self) -> &SessionController<S> {
        &self.controller
    }

    /// Run until `/quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let (tx, mut rx) = mpsc::channel(8);
        spawn_reader(tx, self.output.clone());

        loop {
            tokio::select! {
                input = rx.recv() => {
                    match input {
                        Some(ReplInput::Line(line)) => {
                            if self.handle_line(&line).await == Flow::Quit {
                                break;
                            }
                        }
                        Some(ReplInput::Interrupted) => self.say("^C"),
                        Some(ReplInput::Failed(message)) => {
                            return Err(eyre::eyre!("Readline error: {}", message));
                        }
                        Some(ReplInput::Eof) | None => {
                            self.say("");
                            break;
                        }
                    }
                }
                ticked = self.controller.next_tick(), if self.controller.is_polling() => {
                    if ticked {
                        let outcome = self.controller.poll_once().await;
                        self.report(&outcome);
                    }
                }
            }
        }

        self.say("Goodbye!");
        Ok(())
    }

    fn say(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{}", text).and_then(|_| self.output.flush()) {
            warn!(error = %e, "Repl::say: write failed");
        }
    }

    async fn handle_line(&mut self, line: &str) -> Flow {
        let input = line.trim();
        debug!(%input, "handle_line: called");
        if input.is_empty() {
            return Flow::Continue;
        }

        if input.starts_with('/') {
            return self.handle_slash_command(input);
        }

        match self.controller.submit(input).await {
            Ok(session_id) => {
                info!(%session_id, "handle_line: prompt submitted");
            }
            Err(e @ (SubmitError::Busy | SubmitError::EmptyPrompt)) => {
                self.say(&format!("{} {}", "!".yellow(), e));
            }
            Err(SubmitError::Api(e)) => {
                // Already rendered into the parsing region
                debug!(error = %e, "handle_line: submit failed");
            }
        }
        Flow::Continue
    }

    fn handle_slash_command(&mut self, input: &str) -> Flow {
        debug!(%input, "handle_slash_command: called");
        match input {
            "/quit" | "/exit" | "/q" => Flow::Quit,
            "/status" => {
                let message = match self.controller.session_id() {
                    Some(id) => format!("Session {} is processing", id.to_string().cyan()),
                    None => "No active session".to_string(),
                };
                self.say(&message);
                Flow::Continue
            }
            "/help" | "/?" => {
                self.print_help();
                Flow::Continue
            }
            other => {
                self.say(&format!("{} Unknown command: {} (try /help)", "!".yellow(), other));
                Flow::Continue
            }
        }
    }

    fn report(&self, outcome: &PollOutcome) {
        match outcome {
            PollOutcome::Finished(status) => info!(%status, "report: session finished"),
            PollOutcome::Failed(e) => warn!(error = %e, "report: polling stopped"),
            PollOutcome::Updated(status) => debug!(%status, "report: session updated"),
            PollOutcome::Idle => {}
        }
    }

    fn print_welcome(&mut self) {
        self.say(&"Prompt Router".bold().to_string());
        self.say("Type a prompt and press Enter. /help for commands, Ctrl-D to exit.\n");
    }

    fn print_help(&mut self) {
        self.say("  /status   Show the active session\n  /help     Show this help\n  /quit     Exit");
    }
}

/// Read lines on a plain thread; rustyline blocks
fn spawn_reader(tx: mpsc::Sender<ReplInput>, output: PromptOutput) {
    thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                let _ = tx.blocking_send(ReplInput::Failed(e.to_string()));
                return;
            }
        };
        match rl.create_external_printer() {
            Ok(printer) => output.install(Box::new(printer)),
            Err(e) => warn!(error = %e, "spawn_reader: no external printer, output may overlap the prompt"),
        }

        loop {
            let input = match rl.readline(&format!("{} ", ">".bright_green())) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }
                    ReplInput::Line(line)
                }
                Err(ReadlineError::Interrupted) => ReplInput::Interrupted,
                Err(ReadlineError::Eof) => ReplInput::Eof,
                Err(e) => ReplInput::Failed(e.to_string()),
            };

            let done = matches!(input, ReplInput::Eof | ReplInput::Failed(_));
            if tx.blocking_send(input).is_err() || done {
                break;
            }
        }
    });
}
