use log::warn;
use meteo_core::CharDisplay;
use std::{
    fmt,
    io::{self, Stdout, Write},
};

/// Character display drawn as a framed box on a terminal.
///
/// Each write redraws the box in place with ANSI cursor movement.
pub struct TerminalDisplay<W> {
    cols: usize,
    cells: Vec<Vec<char>>,
    cursor: (usize, usize),
    drawn: bool,
    out: W,
}

impl TerminalDisplay<Stdout> {
    pub fn stdout(cols: usize, rows: usize) -> Self {
        Self::with_writer(cols, rows, io::stdout())
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn with_writer(cols: usize, rows: usize, out: W) -> Self {
        Self { cols, cells: vec![vec![' '; cols]; rows], cursor: (0, 0), drawn: false, out }
    }

    fn redraw(&mut self) -> io::Result<()> {
        let border = format!("+{}+", "-".repeat(self.cols));
        if self.drawn {
            write!(self.out, "\x1b[{}A", self.cells.len() + 2)?;
        }
        writeln!(self.out, "{border}")?;
        for row in &self.cells {
            writeln!(self.out, "|{}|", row.iter().collect::<String>())?;
        }
        writeln!(self.out, "{border}")?;
        self.out.flush()?;
        self.drawn = true;
        Ok(())
    }

    fn redraw_or_warn(&mut self) {
        if let Err(err) = self.redraw() {
            warn!("Terminal display write failed: {err}");
        }
    }
}

impl<W> fmt::Debug for TerminalDisplay<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalDisplay")
            .field("cols", &self.cols)
            .field("rows", &self.cells.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl<W: Write + Send> CharDisplay for TerminalDisplay<W> {
    fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(' ');
        }
        self.cursor = (0, 0);
    }

    fn move_to(&mut self, col: usize, row: usize) {
        self.cursor = (col, row);
    }

    fn write_text(&mut self, text: &str) {
        let (mut col, row) = self.cursor;
        if let Some(cells) = self.cells.get_mut(row) {
            for ch in text.chars().take(self.cols.saturating_sub(col)) {
                cells[col] = ch;
                col += 1;
            }
        }
        self.cursor = (col, row);
        self.redraw_or_warn();
    }
}
