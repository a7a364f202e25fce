use std::io;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(s: &str) -> Self {
        match s {
            "ERROR" => LogLevel::Error,
            "WARN" => LogLevel::Warn,
            "INFO" => LogLevel::Info,
            "DEBUG" => LogLevel::Debug,
            "TRACE" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Captures tracing output and forwards it to the TUI's log pane instead of
/// corrupting the alternate screen with raw writes.
pub struct TuiWriter {
    sender: mpsc::UnboundedSender<LogEntry>,
}

impl TuiWriter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LogEntry>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (TuiWriter { sender }, receiver)
    }
}

impl io::Write for TuiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        if let Some(entry) = parse_tracing_line(&text) {
            let _ = self.sender.send(entry);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for TuiWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        TuiWriter {
            sender: self.sender.clone(),
        }
    }
}

/// Expected format: "2026-08-07T12:00:00.000000Z WARN webforge::core: message"
fn parse_tracing_line(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.splitn(3, ' ');
    let timestamp_str = parts.next()?;
    let level_str = parts.next().unwrap_or("INFO");
    let rest = parts.next().unwrap_or("");

    let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(timestamp_str) else {
        // Not a tracing-formatted line; keep it verbatim.
        return Some(LogEntry {
            level: LogLevel::Info,
            message: line.to_string(),
            timestamp: chrono::Utc::now(),
        });
    };

    // Strip the "target:" prefix tracing-subscriber emits before the message.
    let message = match rest.find(": ") {
        Some(colon) => rest[colon + 2..].to_string(),
        None => rest.to_string(),
    };

    Some(LogEntry {
        level: LogLevel::parse(level_str),
        message,
        timestamp: parsed.with_timezone(&chrono::Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tracing_line() {
        let line = "2026-08-07T12:00:00.000000Z WARN webforge::core::session: skipping malformed stream line";
        let parsed = parse_tracing_line(line).unwrap();
        assert_eq!(parsed.level, LogLevel::Warn);
        assert_eq!(parsed.message, "skipping malformed stream line");
    }

    #[test]
    fn test_parse_plain_line() {
        let parsed = parse_tracing_line("something else entirely").unwrap();
        assert_eq!(parsed.level, LogLevel::Info);
        assert_eq!(parsed.message, "something else entirely");
    }
}
