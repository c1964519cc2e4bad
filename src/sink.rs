// Output sink - status lines and tailed events

use crate::query::LogEvent;
use colored::*;
use std::io::{self, Stdout, Write};

/// Session transitions reported to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Searching { log_group: String, filter: String },
    Found { stream: String },
    NotFound,
    Tailing { stream: String },
    Idle,
    Interrupted,
    Errored(String),
}

impl Status {
    fn symbol(&self) -> &'static str {
        match self {
            Status::Searching { .. } => "🔍",
            Status::Found { .. } => "✓",
            Status::NotFound => "⚠",
            Status::Tailing { .. } => "📡",
            Status::Idle => "⏳",
            Status::Interrupted => "🛑",
            Status::Errored(_) => "✗",
        }
    }

    fn message(&self) -> String {
        match self {
            Status::Searching { log_group, filter } => format!(
                "Searching {} for an active stream matching '{}'...",
                log_group, filter
            ),
            Status::Found { stream } => format!("Found stream with events: {}", stream),
            Status::NotFound => "No log stream with events found".to_string(),
            Status::Tailing { stream } => format!("Tailing stream: {}", stream),
            Status::Idle => "No new log events...".to_string(),
            Status::Interrupted => "Interrupted by user".to_string(),
            Status::Errored(error) => format!("Error: {}", error),
        }
    }

    fn paint(&self, text: String) -> ColoredString {
        match self {
            Status::Found { .. } => text.green().bold(),
            Status::NotFound | Status::Interrupted => text.yellow(),
            Status::Idle => text.dimmed(),
            Status::Errored(_) => text.red().bold(),
            Status::Searching { .. } | Status::Tailing { .. } => text.blue().bold(),
        }
    }
}

/// Line-oriented writer; every line is flushed as soon as it is written
pub struct Sink<W: Write> {
    writer: W,
    color: bool,
}

impl<W: Write> Sink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            color: true,
        }
    }

    /// Enable or disable ANSI colors
    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Write a status line
    pub fn status(&mut self, status: &Status) -> io::Result<()> {
        let text = format!("{} {}", status.symbol(), status.message());
        if self.color {
            let painted = status.paint(text).to_string();
            self.write_line(&painted)
        } else {
            self.write_line(&text)
        }
    }

    /// Write a tailed event as `[timestamp] message`
    pub fn event(&mut self, event: &LogEvent) -> io::Result<()> {
        let stamp = format!("[{}]", format_timestamp(event));
        let message = event.message.trim();
        if self.color {
            let line = format!("{} {}", stamp.dimmed(), message);
            self.write_line(&line)
        } else {
            self.write_line(&format!("{} {}", stamp, message))
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl Sink<Stdout> {
    pub fn stdout() -> Self {
        Sink::new(io::stdout())
    }
}

/// UTC timestamp with millisecond precision, or raw millis if out of range
pub fn format_timestamp(event: &LogEvent) -> String {
    event
        .time()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| event.timestamp.to_string())
}
