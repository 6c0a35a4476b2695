//! Console output with cursor positioning, viewport, and status line.

use std::io::{self, Write};

use log::debug;

use crate::cmd::{
    DynMoveTo, DynSetScrollRegion, DynSetWindowTitle, EraseRestOfLine, EraseScreen, ResetScrollRegion,
    ResetStyle, RestoreCursorPosition, SaveCursorPosition,
};
use crate::err::{ErrorKind, Result};
use crate::{sys, Command, Sgr};

/// The size of a terminal in rows and columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub rows: u16,
    pub cols: u16,
}

fn env_dimension(name: &str) -> Option<u16> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| 0 < *value)
}

/// Determine the terminal size.
///
/// If both the `LINES` and `COLUMNS` environment variables hold positive
/// numbers, they take precedence. Otherwise, this function queries the
/// terminal. It returns `None` if neither source is available.
pub fn terminal_size() -> Option<Size> {
    if let (Some(rows), Some(cols)) = (env_dimension("LINES"), env_dimension("COLUMNS")) {
        return Some(Size { rows, cols });
    }

    sys::terminal_size().map(|(rows, cols)| Size { rows, cols })
}

/// Wrap the text in the SGR command and a reset.
///
/// # Example
///
/// ```
/// # use promptty::{console::cwrap, cmd::SetForeground8};
/// assert_eq!(cwrap("ok", SetForeground8::<2>), "\x1b[32mok\x1b[m");
/// ```
pub fn cwrap<S: Sgr>(text: &str, sgr: S) -> String {
    format!("{}{}{}", sgr, text, ResetStyle)
}

/// Console output.
///
/// A console writes text and [`Command`]s to its output, flushing after
/// every operation. It also remembers the most recently written text or
/// command, which is handy for tests and for redrawing.
///
/// Operations that address rows or columns use 1-based coordinates and
/// validate them against the terminal size. If the size is unknown, rows and
/// columns are only checked for being positive, and operations that need the
/// size fail with [`ErrorKind::PlatformUnavailable`].
#[derive(Debug)]
pub struct Console<W: Write> {
    output: W,
    size: Option<Size>,
    last_output: String,
}

impl Console<io::Stdout> {
    /// Create a console writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    /// Create a console for the output.
    ///
    /// The terminal size is queried whenever an operation needs it.
    pub fn new(output: W) -> Self {
        Self {
            output,
            size: None,
            last_output: String::new(),
        }
    }

    /// Create a console with a fixed terminal size.
    pub fn with_size(output: W, size: Size) -> Self {
        Self {
            output,
            size: Some(size),
            last_output: String::new(),
        }
    }

    /// Get the terminal size.
    pub fn size(&self) -> Option<Size> {
        self.size.or_else(terminal_size)
    }

    /// Get the most recently written text or command.
    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    /// Get the output.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Consume the console and return the output.
    pub fn into_output(self) -> W {
        self.output
    }

    fn emit(&mut self, text: String) -> Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        self.last_output = text;
        Ok(())
    }

    /// Execute the command.
    pub fn exec<C: Command>(&mut self, cmd: C) -> Result<()> {
        self.emit(cmd.to_string())
    }

    /// Print the text.
    pub fn print<S: AsRef<str>>(&mut self, text: S) -> Result<()> {
        self.emit(text.as_ref().to_owned())
    }

    /// Print the text followed by a newline.
    pub fn println<S: AsRef<str>>(&mut self, text: S) -> Result<()> {
        self.emit(format!("{}\n", text.as_ref()))
    }

    /// Erase the screen and, if requested, move the cursor home.
    pub fn clear_screen(&mut self, home: bool) -> Result<()> {
        self.exec(EraseScreen)?;
        if home {
            self.move_to(1, 1)?;
        }
        Ok(())
    }

    fn check_position(&self, row: u16, col: u16) -> Result<()> {
        let outside = match self.size() {
            Some(size) => size.rows < row || size.cols < col,
            None => false,
        };

        if row == 0 || col == 0 || outside {
            debug!("position {};{} is outside of terminal {:?}", row, col, self.size());
            return Err(ErrorKind::InvalidArgument.into());
        }
        Ok(())
    }

    /// Move the cursor to the 1-based row and column.
    ///
    /// This method fails with [`ErrorKind::InvalidArgument`] if the position
    /// is outside the terminal. It then writes nothing.
    pub fn move_to(&mut self, row: u16, col: u16) -> Result<()> {
        self.check_position(row, col)?;
        self.exec(DynMoveTo(row, col))
    }

    /// Print the text at the 1-based row and column.
    pub fn print_at<S: AsRef<str>>(&mut self, row: u16, col: u16, text: S) -> Result<()> {
        self.move_to(row, col)?;
        self.print(text)
    }

    /// Restrict scrolling to the rows from start to end, inclusive.
    ///
    /// The start defaults to the first row and the end to the last row. This
    /// method fails with [`ErrorKind::InvalidArgument`] if the start is zero,
    /// the start exceeds the end, or either exceeds the number of rows.
    pub fn set_viewport(&mut self, start: Option<u16>, end: Option<u16>) -> Result<()> {
        let rows = self.size().ok_or(ErrorKind::PlatformUnavailable)?.rows;
        let start = start.unwrap_or(1);
        let end = end.unwrap_or(rows);

        if start == 0 || end < start || rows < start || rows < end {
            debug!("viewport {}..={} does not fit {} rows", start, end, rows);
            return Err(ErrorKind::InvalidArgument.into());
        }
        self.exec(DynSetScrollRegion(start, end))
    }

    /// Let the entire screen scroll again.
    pub fn reset_viewport(&mut self) -> Result<()> {
        self.exec(ResetScrollRegion)
    }

    /// Show the text on the last row and restore the cursor.
    pub fn display_status<S: AsRef<str>>(&mut self, text: S) -> Result<()> {
        let rows = self.size().ok_or(ErrorKind::PlatformUnavailable)?.rows;
        self.exec(SaveCursorPosition)?;
        self.print_at(rows, 1, text)?;
        self.exec(EraseRestOfLine)?;
        self.exec(RestoreCursorPosition)
    }

    /// Set the window title.
    pub fn set_title<S: Into<String>>(&mut self, title: S) -> Result<()> {
        self.exec(DynSetWindowTitle::new(title))
    }
}

// =====================================================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::cmd::Format;

    fn console() -> Console<Vec<u8>> {
        Console::with_size(Vec::new(), Size { rows: 24, cols: 80 })
    }

    fn written(console: Console<Vec<u8>>) -> String {
        String::from_utf8_lossy(&console.into_output()).into_owned()
    }

    #[test]
    fn test_last_output() -> Result<()> {
        let mut console = console();
        console.print("hello")?;
        assert_eq!(console.last_output(), "hello");
        console.exec(Format::Bold)?;
        assert_eq!(console.last_output(), "\x1b[1m");
        console.println("world")?;
        assert_eq!(console.last_output(), "world\n");
        assert_eq!(written(console), "hello\x1b[1mworld\n");
        Ok(())
    }

    #[test]
    fn test_move_to() -> Result<()> {
        let mut console = console();
        console.print_at(24, 80, "x")?;
        for (row, col) in [(0, 1), (1, 0), (25, 1), (1, 81)] {
            let result = console.move_to(row, col).map_err(|e| e.kind());
            assert_eq!(result, Err(ErrorKind::InvalidArgument));
        }
        assert_eq!(written(console), "\x1b[24;80Hx");
        Ok(())
    }

    #[test]
    fn test_clear_screen() -> Result<()> {
        let mut console = console();
        console.clear_screen(true)?;
        console.clear_screen(false)?;
        assert_eq!(written(console), "\x1b[2J\x1b[1;1H\x1b[2J");
        Ok(())
    }

    #[test]
    fn test_viewport() -> Result<()> {
        let mut console = console();
        console.set_viewport(None, None)?;
        console.set_viewport(Some(3), Some(20))?;
        for (start, end) in [(0, 10), (10, 5), (25, 30), (1, 25)] {
            let result = console.set_viewport(Some(start), Some(end));
            assert_eq!(result.map_err(|e| e.kind()), Err(ErrorKind::InvalidArgument));
        }
        console.reset_viewport()?;
        assert_eq!(written(console), "\x1b[1;24r\x1b[3;20r\x1b[r");
        Ok(())
    }

    #[test]
    fn test_display_status() -> Result<()> {
        let mut console = console();
        console.display_status("Ready")?;
        assert_eq!(written(console), "\x1b7\x1b[24;1HReady\x1b[K\x1b8");
        Ok(())
    }

    #[test]
    fn test_set_title() -> Result<()> {
        let mut console = console();
        console.set_title("Demo")?;
        assert_eq!(console.last_output(), "\x1b]2;Demo\x1b\\");
        Ok(())
    }
}
