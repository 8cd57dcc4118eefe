//! The command interpreter: a single-pass, line-oriented state machine
//! over the scheduling model.
//!
//! Commands are independent units: a malformed or rejected command
//! produces one report line and the loop continues, mirroring a REPL
//! contract rather than an all-or-nothing transaction. Under the
//! fail-fast policy the first reported error aborts the run instead.

use std::io::BufRead;

use koyomi_command::{Command, parse};
use koyomi_model::{ModelResult, SchedulingModel};

use crate::presenter::{Presenter, format_event};

/// Interpreter states: `Ready` awaits the next command; `Terminated`
/// reads no further input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Ready,
    Terminated,
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Explicit exit or end of input.
    Completed,
    /// Fail-fast abort or a failed read mid-stream.
    Aborted,
}

pub struct Interpreter<P> {
    model: SchedulingModel,
    presenter: P,
    fail_fast: bool,
    echo_commands: bool,
    state: State,
}

impl<P: Presenter> Interpreter<P> {
    #[must_use]
    pub fn new(presenter: P, fail_fast: bool, echo_commands: bool) -> Self {
        Self {
            model: SchedulingModel::new(),
            presenter,
            fail_fast,
            echo_commands,
            state: State::Ready,
        }
    }

    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn model(&self) -> &SchedulingModel {
        &self.model
    }

    /// Consumes the interpreter, handing back its presenter. Tests use
    /// this to inspect the collected transcript.
    #[must_use]
    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// ## Summary
    /// Processes lines until the exit command, end of input, a read
    /// failure, or a fail-fast abort.
    pub fn run<R: BufRead>(&mut self, input: R) -> RunOutcome {
        for (index, line) in input.lines().enumerate() {
            if self.state == State::Terminated {
                break;
            }
            match line {
                Ok(text) => {
                    let ok = self.step(&text, index + 1);
                    if !ok && self.fail_fast {
                        tracing::warn!(line = index + 1, "aborting run (fail-fast)");
                        self.state = State::Terminated;
                        return RunOutcome::Aborted;
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to read input line");
                    self.presenter
                        .line(&format!("Error: InputUnavailable: {err}"));
                    self.state = State::Terminated;
                    return RunOutcome::Aborted;
                }
            }
        }
        self.state = State::Terminated;
        RunOutcome::Completed
    }

    /// ## Summary
    /// Executes one input line. Returns `false` when the line produced an
    /// error report.
    pub fn step(&mut self, line: &str, line_number: usize) -> bool {
        let trimmed = line.trim();
        if self.echo_commands && !trimmed.is_empty() && !trimmed.starts_with('#') {
            self.presenter.line(&format!("> {trimmed}"));
        }

        match parse(line) {
            Ok(None) => true,
            Ok(Some(Command::Exit)) => {
                tracing::debug!(line_number, "exit command");
                self.state = State::Terminated;
                true
            }
            Ok(Some(command)) => match self.execute(command) {
                Ok(()) => true,
                Err(err) => {
                    tracing::debug!(line_number, kind = err.kind(), "command rejected");
                    self.presenter
                        .line(&format!("Error: {}: {err}", err.kind()));
                    false
                }
            },
            Err(err) => {
                tracing::debug!(line_number, kind = err.kind_name(), "parse failed");
                self.presenter
                    .line(&format!("Error: {}: {err}", err.kind_name()));
                false
            }
        }
    }

    fn execute(&mut self, command: Command) -> ModelResult<()> {
        match command {
            Command::CreateCalendar { name, zone } => {
                self.model.create_calendar(&name, &zone)?;
                self.presenter
                    .line(&format!("Created calendar {name:?} ({zone})"));
            }
            Command::UseCalendar { name } => {
                self.model.use_calendar(&name)?;
                self.presenter.line(&format!("Using calendar {name:?}"));
            }
            Command::CreateEvent(spec) => {
                let event = self.model.create_event(&spec)?;
                self.presenter.line(&format!(
                    "Created event {:?} from {} to {}",
                    event.subject,
                    koyomi_core::time::format_instant(&event.start),
                    koyomi_core::time::format_instant(&event.end),
                ));
            }
            Command::CreateSeries(spec) => {
                let subject = spec.template.subject.clone();
                let count = self.model.create_series(&spec)?;
                self.presenter
                    .line(&format!("Created {count} events in series {subject:?}"));
            }
            Command::EditEvent {
                selector,
                patch,
                scope,
            } => {
                let count = self.model.edit_event(&selector, &patch, scope)?;
                let noun = if count == 1 { "event" } else { "events" };
                self.presenter.line(&format!("Edited {count} {noun}"));
            }
            Command::CopyEvent {
                subject,
                start,
                target,
                new_start,
            } => {
                let copy = self.model.copy_event(&subject, start, &target, new_start)?;
                self.presenter.line(&format!(
                    "Copied event {:?} to calendar {target:?}",
                    copy.subject
                ));
            }
            Command::CopyEventsOn { date, target, to } => {
                let count = self.model.copy_events_on(date, &target, to)?;
                self.presenter
                    .line(&format!("Copied {count} events to calendar {target:?}"));
            }
            Command::CopyEventsBetween {
                from,
                until,
                target,
                to,
            } => {
                let count = self.model.copy_events_between(from, until, &target, to)?;
                self.presenter
                    .line(&format!("Copied {count} events to calendar {target:?}"));
            }
            Command::PrintEventsOn { date } => {
                let events = self.model.events_on(date)?;
                for event in &events {
                    self.presenter.line(&format_event(event));
                }
            }
            Command::PrintEventsRange { start, end } => {
                let events = self.model.events_in_range(start, end)?;
                for event in &events {
                    self.presenter.line(&format_event(event));
                }
            }
            Command::ShowStatus { at } => {
                let busy = self.model.is_busy(at)?;
                self.presenter.line(if busy { "busy" } else { "available" });
            }
            Command::Exit => {
                // Handled in `step`; reaching it here means a caller fed
                // the command directly
                self.state = State::Terminated;
            }
        }
        Ok(())
    }
}
