//! Command shape parser.
//!
//! Matches a tokenized line against the fixed set of command shapes and
//! produces a variant of the closed [`Command`] enum; execution later
//! dispatches with one exhaustive match, never on strings.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use koyomi_core::time;
use koyomi_model::event::{EventPatch, EventSpec, EventWindow, Visibility};
use koyomi_model::model::{EditScope, EventSelector};
use koyomi_model::series::{SeriesSpec, Termination};

use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::lexer::tokenize;

/// One fully parsed command, ready for execution against the model.
#[derive(Debug, Clone)]
pub enum Command {
    CreateCalendar {
        name: String,
        zone: String,
    },
    UseCalendar {
        name: String,
    },
    CreateEvent(EventSpec),
    CreateSeries(SeriesSpec),
    EditEvent {
        selector: EventSelector,
        patch: EventPatch,
        scope: EditScope,
    },
    CopyEvent {
        subject: String,
        start: NaiveDateTime,
        target: String,
        new_start: NaiveDateTime,
    },
    CopyEventsOn {
        date: NaiveDate,
        target: String,
        to: NaiveDate,
    },
    CopyEventsBetween {
        from: NaiveDate,
        until: NaiveDate,
        target: String,
        to: NaiveDate,
    },
    PrintEventsOn {
        date: NaiveDate,
    },
    PrintEventsRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    ShowStatus {
        at: NaiveDateTime,
    },
    Exit,
}

/// ## Summary
/// Parses one input line into a command.
///
/// Blank lines and `#` comment lines yield `Ok(None)` and produce no
/// output.
///
/// ## Errors
/// `UnrecognizedCommand` when the line matches no command shape,
/// `MalformedDateTime` for bad date literals, `InvalidRecurrence` for bad
/// recurrence clauses.
pub fn parse(line: &str) -> ParseResult<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let tokens = tokenize(trimmed)?;
    let mut cursor = Cursor::new(&tokens, trimmed);

    let command = match cursor.next()? {
        "create" => match cursor.next()? {
            "calendar" => parse_create_calendar(&mut cursor)?,
            "event" => parse_create_event(&mut cursor)?,
            other => return Err(unexpected(trimmed, "\"calendar\" or \"event\"", other)),
        },
        "use" => {
            cursor.keyword("calendar")?;
            cursor.keyword("--name")?;
            let name = cursor.text("calendar name")?;
            cursor.finish()?;
            Command::UseCalendar { name }
        }
        "edit" => {
            cursor.keyword("event")?;
            parse_edit_event(&mut cursor)?
        }
        "copy" => match cursor.next()? {
            "event" => parse_copy_event(&mut cursor)?,
            "events" => parse_copy_events(&mut cursor)?,
            other => return Err(unexpected(trimmed, "\"event\" or \"events\"", other)),
        },
        "print" => {
            cursor.keyword("events")?;
            parse_print_events(&mut cursor)?
        }
        "show" => {
            cursor.keyword("status")?;
            cursor.keyword("on")?;
            let at = cursor.datetime()?;
            cursor.finish()?;
            Command::ShowStatus { at }
        }
        "exit" => {
            cursor.finish()?;
            Command::Exit
        }
        other => {
            return Err(ParseError::unrecognized(
                trimmed,
                &format!("unknown command {other:?}"),
            ));
        }
    };

    tracing::trace!(?command, "parsed command");
    Ok(Some(command))
}

fn parse_create_calendar(cursor: &mut Cursor<'_>) -> ParseResult<Command> {
    cursor.keyword("--name")?;
    let name = cursor.text("calendar name")?;
    cursor.keyword("--timezone")?;
    let zone = cursor.text("timezone")?;
    cursor.finish()?;
    Ok(Command::CreateCalendar { name, zone })
}

fn parse_create_event(cursor: &mut Cursor<'_>) -> ParseResult<Command> {
    let subject = cursor.text("subject")?;

    let window = match cursor.next()? {
        "from" => {
            let start = cursor.datetime()?;
            cursor.keyword("to")?;
            let end = cursor.datetime()?;
            EventWindow::Timed { start, end }
        }
        "on" => EventWindow::AllDay {
            date: cursor.date()?,
        },
        other => return Err(unexpected(cursor.line, "\"from\" or \"on\"", other)),
    };

    if cursor.peek() == Some("repeats") {
        cursor.keyword("repeats")?;
        let weekdays = parse_weekdays(cursor.next()?)?;
        let termination = match cursor.next()? {
            "for" => {
                let count = parse_count(cursor.next()?)?;
                cursor.keyword("times")?;
                Termination::Count(count)
            }
            "until" => Termination::Until(cursor.date()?),
            other => return Err(unexpected(cursor.line, "\"for\" or \"until\"", other)),
        };
        cursor.finish()?;
        return Ok(Command::CreateSeries(SeriesSpec {
            template: EventSpec {
                subject,
                window,
                location: None,
                description: None,
                visibility: Visibility::default(),
            },
            weekdays,
            termination,
        }));
    }

    let mut location = None;
    let mut description = None;
    let mut visibility = Visibility::default();
    while let Some(flag) = cursor.peek() {
        match flag {
            "--location" => {
                cursor.keyword("--location")?;
                location = Some(cursor.text("location")?);
            }
            "--description" => {
                cursor.keyword("--description")?;
                description = Some(cursor.text("description")?);
            }
            "--private" => {
                cursor.keyword("--private")?;
                visibility = Visibility::Private;
            }
            other => {
                return Err(ParseError::unrecognized(
                    cursor.line,
                    &format!("unknown option {other:?}"),
                ));
            }
        }
    }

    Ok(Command::CreateEvent(EventSpec {
        subject,
        window,
        location,
        description,
        visibility,
    }))
}

fn parse_edit_event(cursor: &mut Cursor<'_>) -> ParseResult<Command> {
    let field = cursor.next()?.to_string();
    let subject = cursor.text("subject")?;
    cursor.keyword("from")?;
    let start = cursor.datetime()?;
    cursor.keyword("to")?;
    let end = cursor.datetime()?;
    cursor.keyword("with")?;
    let value = cursor.next()?.to_string();

    let scope = match cursor.peek() {
        None => EditScope::This,
        Some("this") => {
            cursor.keyword("this")?;
            EditScope::This
        }
        Some("following") => {
            cursor.keyword("following")?;
            EditScope::Following
        }
        Some("all") => {
            cursor.keyword("all")?;
            EditScope::All
        }
        Some(other) => return Err(unexpected(cursor.line, "\"this\", \"following\" or \"all\"", other)),
    };
    cursor.finish()?;

    let patch = build_patch(&field, &value, cursor.line)?;
    Ok(Command::EditEvent {
        selector: EventSelector {
            subject,
            start,
            end,
        },
        patch,
        scope,
    })
}

fn parse_copy_event(cursor: &mut Cursor<'_>) -> ParseResult<Command> {
    let subject = cursor.text("subject")?;
    cursor.keyword("on")?;
    let start = cursor.datetime()?;
    cursor.keyword("--target")?;
    let target = cursor.text("target calendar")?;
    cursor.keyword("to")?;
    let new_start = cursor.datetime()?;
    cursor.finish()?;
    Ok(Command::CopyEvent {
        subject,
        start,
        target,
        new_start,
    })
}

fn parse_copy_events(cursor: &mut Cursor<'_>) -> ParseResult<Command> {
    match cursor.next()? {
        "on" => {
            let date = cursor.date()?;
            cursor.keyword("--target")?;
            let target = cursor.text("target calendar")?;
            cursor.keyword("to")?;
            let to = cursor.date()?;
            cursor.finish()?;
            Ok(Command::CopyEventsOn { date, target, to })
        }
        "between" => {
            let from = cursor.date()?;
            cursor.keyword("and")?;
            let until = cursor.date()?;
            cursor.keyword("--target")?;
            let target = cursor.text("target calendar")?;
            cursor.keyword("to")?;
            let to = cursor.date()?;
            cursor.finish()?;
            Ok(Command::CopyEventsBetween {
                from,
                until,
                target,
                to,
            })
        }
        other => Err(unexpected(cursor.line, "\"on\" or \"between\"", other)),
    }
}

fn parse_print_events(cursor: &mut Cursor<'_>) -> ParseResult<Command> {
    match cursor.next()? {
        "on" => {
            let date = cursor.date()?;
            cursor.finish()?;
            Ok(Command::PrintEventsOn { date })
        }
        "from" => {
            let start = cursor.datetime()?;
            cursor.keyword("to")?;
            let end = cursor.datetime()?;
            cursor.finish()?;
            Ok(Command::PrintEventsRange { start, end })
        }
        other => Err(unexpected(cursor.line, "\"on\" or \"from\"", other)),
    }
}

fn build_patch(field: &str, value: &str, line: &str) -> ParseResult<EventPatch> {
    match field {
        "subject" => {
            if value.trim().is_empty() {
                return Err(ParseError::unrecognized(line, "subject must not be empty"));
            }
            Ok(EventPatch::Subject(value.to_string()))
        }
        "start" => Ok(EventPatch::Start(parse_datetime_value(value)?)),
        "end" => Ok(EventPatch::End(parse_datetime_value(value)?)),
        "location" => Ok(EventPatch::Location(value.to_string())),
        "description" => Ok(EventPatch::Description(value.to_string())),
        "visibility" => match value {
            "private" => Ok(EventPatch::Visibility(Visibility::Private)),
            "public" => Ok(EventPatch::Visibility(Visibility::Public)),
            other => Err(ParseError::unrecognized(
                line,
                &format!("visibility must be \"public\" or \"private\", got {other:?}"),
            )),
        },
        other => Err(ParseError::unrecognized(
            line,
            &format!("unknown field {other:?}"),
        )),
    }
}

fn parse_weekdays(token: &str) -> ParseResult<Vec<Weekday>> {
    if token.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::InvalidRecurrence,
            "at least one weekday letter is required",
        ));
    }
    token
        .chars()
        .map(|letter| match letter {
            'M' => Ok(Weekday::Mon),
            'T' => Ok(Weekday::Tue),
            'W' => Ok(Weekday::Wed),
            'R' => Ok(Weekday::Thu),
            'F' => Ok(Weekday::Fri),
            'S' => Ok(Weekday::Sat),
            'U' => Ok(Weekday::Sun),
            other => Err(ParseError::new(
                ParseErrorKind::InvalidRecurrence,
                format!("unknown weekday letter {other:?}"),
            )),
        })
        .collect()
}

fn parse_count(token: &str) -> ParseResult<u32> {
    token.parse::<u32>().map_err(|_e| {
        ParseError::new(
            ParseErrorKind::InvalidRecurrence,
            format!("invalid occurrence count {token:?}"),
        )
    })
}

fn parse_datetime_value(token: &str) -> ParseResult<NaiveDateTime> {
    time::parse_datetime(token)
        .map_err(|err| ParseError::new(ParseErrorKind::MalformedDateTime, err.to_string()))
}

fn unexpected(line: &str, expected: &str, found: &str) -> ParseError {
    ParseError::unrecognized(line, &format!("expected {expected}, got {found:?}"))
}

/// Token cursor over one line, with the raw line kept for error echoes.
struct Cursor<'a> {
    tokens: &'a [String],
    pos: usize,
    line: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [String], line: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
        }
    }

    fn next(&mut self) -> ParseResult<&'a str> {
        let token = self
            .tokens
            .get(self.pos)
            .ok_or_else(|| ParseError::unrecognized(self.line, "unexpected end of command"))?;
        self.pos += 1;
        Ok(token)
    }

    fn keyword(&mut self, expected: &str) -> ParseResult<()> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(unexpected(self.line, &format!("{expected:?}"), token))
        }
    }

    fn text(&mut self, what: &str) -> ParseResult<String> {
        let token = self.next()?;
        if token.trim().is_empty() {
            return Err(ParseError::unrecognized(
                self.line,
                &format!("{what} must not be empty"),
            ));
        }
        Ok(token.to_string())
    }

    fn datetime(&mut self) -> ParseResult<NaiveDateTime> {
        parse_datetime_value(self.next()?)
    }

    fn date(&mut self) -> ParseResult<NaiveDate> {
        let token = self.next()?;
        time::parse_date(token)
            .map_err(|err| ParseError::new(ParseErrorKind::MalformedDateTime, err.to_string()))
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn finish(&self) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(extra) => Err(ParseError::unrecognized(
                self.line,
                &format!("unexpected trailing token {extra:?}"),
            )),
        }
    }
}
