//! Terminal appender implementation

use crate::core::{Appender, LogRecord, Result, Terminal};
use colored::{Color, Colorize};
use parking_lot::Mutex;
use std::sync::Arc;

/// Write `line` to `target` in `color`, restoring the previous text color
pub(crate) fn write_colored<T: Terminal + ?Sized>(target: &mut T, line: &str, color: Option<Color>) {
    match color {
        Some(color) => {
            let previous = target.text_color();
            target.set_text_color(color);
            target.print_line(line);
            target.set_text_color(previous);
        }
        None => target.print_line(line),
    }
}

pub struct TerminalAppender {
    terminal: Box<dyn Terminal>,
    use_colors: bool,
}

impl TerminalAppender {
    pub fn new(terminal: Box<dyn Terminal>) -> Self {
        Self {
            terminal,
            use_colors: true,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn set_colors(&mut self, use_colors: bool) {
        self.use_colors = use_colors;
    }
}

impl Appender for TerminalAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let color = self.use_colors.then(|| record.level.color_code());
        write_colored(self.terminal.as_mut(), &record.line, color);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "terminal"
    }
}

/// Standard output, colored with ANSI escapes
///
/// White is treated as the terminal's default color and printed without
/// escapes.
pub struct StdoutTerminal {
    color: Color,
}

impl StdoutTerminal {
    pub fn new() -> Self {
        Self {
            color: Color::White,
        }
    }
}

impl Default for StdoutTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for StdoutTerminal {
    fn text_color(&self) -> Color {
        self.color
    }

    fn set_text_color(&mut self, color: Color) {
        self.color = color;
    }

    fn print_line(&mut self, line: &str) {
        if self.color == Color::White {
            println!("{}", line);
        } else {
            println!("{}", line.color(self.color));
        }
    }
}

#[derive(Debug)]
struct BufferState {
    color: Color,
    lines: Vec<(Color, String)>,
}

/// In-memory terminal that records every printed line with its color
///
/// Clones share the same buffer, so a caller can keep one clone and hand
/// the other to a logger.
///
/// # Example
///
/// ```
/// use cc_logger::appenders::BufferTerminal;
/// use cc_logger::core::Terminal;
///
/// let terminal = BufferTerminal::new();
/// let mut handle = terminal.clone();
/// handle.print_line("hello");
/// assert_eq!(terminal.lines(), vec!["hello".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct BufferTerminal {
    state: Arc<Mutex<BufferState>>,
}

impl BufferTerminal {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BufferState {
                color: Color::White,
                lines: Vec::new(),
            })),
        }
    }

    /// Printed lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.state.lock().lines.iter().map(|(_, line)| line.clone()).collect()
    }

    /// Printed lines with the color active when each was printed
    pub fn colored_lines(&self) -> Vec<(Color, String)> {
        self.state.lock().lines.clone()
    }

    pub fn clear(&self) {
        self.state.lock().lines.clear();
    }
}

impl Default for BufferTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for BufferTerminal {
    fn text_color(&self) -> Color {
        self.state.lock().color
    }

    fn set_text_color(&mut self, color: Color) {
        self.state.lock().color = color;
    }

    fn print_line(&mut self, line: &str) {
        let mut state = self.state.lock();
        let color = state.color;
        state.lines.push((color, line.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LineFormat, LogLevel};

    fn record(level: LogLevel, message: &str) -> LogRecord {
        LogRecord::new(level, None, message, &LineFormat::default())
    }

    #[test]
    fn test_colors_are_applied_and_restored() {
        let terminal = BufferTerminal::new();
        let mut appender = TerminalAppender::new(Box::new(terminal.clone()));

        appender.append(&record(LogLevel::Error, "boom")).unwrap();

        let lines = terminal.colored_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Color::Red);
        assert!(lines[0].1.ends_with("boom"));
        assert_eq!(terminal.text_color(), Color::White);
    }

    #[test]
    fn test_previous_color_is_restored() {
        let terminal = BufferTerminal::new();
        let mut handle = terminal.clone();
        handle.set_text_color(Color::Cyan);

        let mut appender = TerminalAppender::new(Box::new(terminal.clone()));
        appender.append(&record(LogLevel::Warn, "careful")).unwrap();

        assert_eq!(terminal.colored_lines()[0].0, Color::Yellow);
        assert_eq!(terminal.text_color(), Color::Cyan);
    }

    #[test]
    fn test_without_colors() {
        let terminal = BufferTerminal::new();
        let mut appender = TerminalAppender::new(Box::new(terminal.clone())).with_colors(false);

        appender.append(&record(LogLevel::Fatal, "plain")).unwrap();
        assert_eq!(terminal.colored_lines()[0].0, Color::White);
    }

    #[test]
    fn test_stdout_terminal_tracks_color() {
        let mut terminal = StdoutTerminal::new();
        assert_eq!(terminal.text_color(), Color::White);
        terminal.set_text_color(Color::Green);
        assert_eq!(terminal.text_color(), Color::Green);
    }
}
