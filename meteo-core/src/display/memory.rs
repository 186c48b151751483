use tokio::time::Instant;

use super::CharDisplay;

/// One `write_text` call as the device saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub col: usize,
    pub row: usize,
    pub text: String,
    pub at: Instant,
}

/// In-memory character grid. Text past the last column is clipped.
#[derive(Debug, Clone)]
pub struct MemoryDisplay {
    cols: usize,
    cells: Vec<Vec<char>>,
    cursor: (usize, usize),
    clears: usize,
    writes: Vec<WriteRecord>,
}

impl MemoryDisplay {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            cells: vec![vec![' '; cols]; rows],
            cursor: (0, 0),
            clears: 0,
            writes: Vec::new(),
        }
    }

    pub fn row(&self, row: usize) -> String {
        self.cells.get(row).map(|cells| cells.iter().collect()).unwrap_or_default()
    }

    pub fn rows(&self) -> Vec<String> {
        (0..self.cells.len()).map(|row| self.row(row)).collect()
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }
}

impl CharDisplay for MemoryDisplay {
    fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(' ');
        }
        self.cursor = (0, 0);
        self.clears += 1;
    }

    fn move_to(&mut self, col: usize, row: usize) {
        self.cursor = (col, row);
    }

    fn write_text(&mut self, text: &str) {
        let (col, row) = self.cursor;
        self.writes.push(WriteRecord { col, row, text: text.to_string(), at: Instant::now() });

        let Some(cells) = self.cells.get_mut(row) else {
            return;
        };
        let mut next = col;
        for ch in text.chars() {
            if next >= self.cols {
                break;
            }
            cells[next] = ch;
            next += 1;
        }
        self.cursor = (next, row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_per_cell() {
        let mut display = MemoryDisplay::new(8, 2);
        display.move_to(0, 0);
        display.write_text("abcdef");
        display.move_to(2, 0);
        display.write_text("XY");

        assert_eq!(display.row(0), "abXYef  ");
        assert_eq!(display.row(1), "        ");
    }

    #[test]
    fn overflow_is_clipped() {
        let mut display = MemoryDisplay::new(4, 2);
        display.move_to(0, 1);
        display.write_text("overflowing");

        assert_eq!(display.row(1), "over");
        assert_eq!(display.writes()[0].text, "overflowing");
    }

    #[test]
    fn clear_blanks_every_row() {
        let mut display = MemoryDisplay::new(4, 2);
        display.write_text("abcd");
        display.clear();

        assert_eq!(display.rows(), vec!["    ".to_string(), "    ".to_string()]);
        assert_eq!(display.clear_count(), 1);
    }

    #[test]
    fn writes_off_the_grid_are_ignored() {
        let mut display = MemoryDisplay::new(4, 2);
        display.move_to(0, 5);
        display.write_text("lost");
        assert_eq!(display.rows(), vec!["    ".to_string(), "    ".to_string()]);
    }
}
