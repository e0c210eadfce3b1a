use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use converter_core::{update, AppState, Msg, OutputFormat, SubmissionState};
use converter_logging::{conv_debug, conv_info, conv_warn};

use crate::commands::{parse_command, Command, HELP_TEXT};
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render::render;

#[derive(Debug)]
pub enum AppEvent {
    Msg(Msg),
    Input(Command),
    InputClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Saved(PathBuf),
    Failed(String),
}

/// Initial form contents taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Prefill {
    pub links: Vec<String>,
    pub format: Option<OutputFormat>,
}

struct Session<W: Write> {
    state: AppState,
    runner: EffectRunner,
    events_rx: mpsc::Receiver<AppEvent>,
    events_tx: mpsc::Sender<AppEvent>,
    out: W,
    echo: bool,
}

impl<W: Write> Session<W> {
    fn new(config: &AppConfig, out: W, echo: bool) -> Result<Self> {
        let (events_tx, events_rx) = mpsc::channel();
        let engine_config = config.engine_config()?;
        let state = AppState::with_resize_policy(config.resize_policy())
            .with_success_window(config.success_window()?);
        let runner = EffectRunner::new(engine_config, events_tx.clone())
            .context("failed to start the conversion engine")?;

        Ok(Self {
            state,
            runner,
            events_rx,
            events_tx,
            out,
            echo,
        })
    }

    fn dispatch(&mut self, msg: Msg) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);

        if was_dirty && self.echo {
            self.show()?;
        }
        Ok(())
    }

    fn prefill(&mut self, prefill: Prefill) -> Result<()> {
        if !prefill.links.is_empty() {
            self.dispatch(Msg::LinkCountChanged(prefill.links.len().to_string()))?;
            for (index, value) in prefill.links.into_iter().enumerate() {
                self.dispatch(Msg::LinkEdited { index, value })?;
            }
        }
        if let Some(format) = prefill.format {
            self.dispatch(Msg::FormatSelected(format))?;
        }
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        write!(self.out, "{}", render(&self.state.view()))?;
        self.out.flush()?;
        Ok(())
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }

    fn next_event(&self) -> Result<AppEvent> {
        self.events_rx
            .recv()
            .context("event channel closed unexpectedly")
    }
}

/// Fill the form from `prefill`, submit once and wait for the outcome.
pub fn run_batch<W: Write>(config: &AppConfig, prefill: Prefill, out: W) -> Result<BatchOutcome> {
    let mut session = Session::new(config, out, false)?;
    session.prefill(prefill)?;
    session.dispatch(Msg::SubmitClicked)?;
    session.say(&format!(
        "Converting... (sending batch to {})",
        config.endpoint
    ))?;

    loop {
        let AppEvent::Msg(msg) = session.next_event()? else {
            continue;
        };
        session.dispatch(msg)?;

        let view = session.state.view();
        match view.submission {
            SubmissionState::Succeeded => {
                let path = view.archive_path.unwrap_or_default();
                if let Some(notification) = view.notification {
                    session.say(&format!("{notification} Saved to {}", path.display()))?;
                }
                return Ok(BatchOutcome::Saved(path));
            }
            SubmissionState::Failed => {
                let message = view.last_failure.unwrap_or_default();
                session.say(&format!("Conversion failed: {message}"))?;
                return Ok(BatchOutcome::Failed(message));
            }
            SubmissionState::Idle | SubmissionState::Pending => {}
        }
    }
}

/// Drive the form from line commands read from `input` until `quit` or end of input.
pub fn run_interactive<R, W>(config: &AppConfig, prefill: Prefill, input: R, out: W) -> Result<()>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let mut session = Session::new(config, out, true)?;
    spawn_input_reader(input, session.events_tx.clone());

    session.prefill(prefill)?;
    session.show()?;
    session.say("Type `help` for commands.")?;

    let mut leaving = false;
    loop {
        if leaving && session.state.submission() != SubmissionState::Pending {
            break;
        }
        match session.next_event()? {
            AppEvent::Msg(msg) => session.dispatch(msg)?,
            AppEvent::Input(Command::Dispatch(msg)) => handle_form_input(&mut session, msg)?,
            AppEvent::Input(Command::Show) => session.show()?,
            AppEvent::Input(Command::Help) => session.say(HELP_TEXT)?,
            AppEvent::Input(Command::Invalid(hint)) => session.say(&hint)?,
            AppEvent::Input(Command::Quit) | AppEvent::InputClosed => {
                if session.state.submission() == SubmissionState::Pending {
                    session.say("Waiting for the running conversion to finish...")?;
                }
                leaving = true;
            }
        }
    }

    conv_info!("Interactive session finished");
    Ok(())
}

fn handle_form_input<W: Write>(session: &mut Session<W>, msg: Msg) -> Result<()> {
    match &msg {
        Msg::LinkEdited { index, .. } if *index >= session.state.links().count() => {
            let count = session.state.links().count();
            conv_debug!("Ignoring edit of link {} with {} fields", index + 1, count);
            return session.say(&format!(
                "There are only {count} link fields; use `count` to add more."
            ));
        }
        Msg::SubmitClicked if !session.state.submission().accepts_submit() => {
            conv_warn!("Submit ignored while a conversion is running");
            return session.say("A conversion is already running.");
        }
        _ => {}
    }
    session.dispatch(msg)
}

fn spawn_input_reader<R>(input: R, events: mpsc::Sender<AppEvent>)
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else {
                break;
            };
            if let Some(command) = parse_command(&line) {
                if events.send(AppEvent::Input(command)).is_err() {
                    return;
                }
            }
        }
        let _ = events.send(AppEvent::InputClosed);
    });
}
