//! Two-row character display rendering.
//!
//! Formatting is pure (`*_lines`); [`DisplayRenderer`] pushes the result to a
//! [`CharDisplay`].

use log::debug;
use std::{fmt, time::Duration};
use tokio::time::sleep;

use crate::{
    codec::label_for,
    model::{CurrentConditions, Location},
};

#[cfg(test)]
pub(crate) mod memory;

#[cfg(test)]
pub(crate) use memory::MemoryDisplay;

/// Line-oriented output device, addressed by (column, row).
///
/// Only "last write wins per cell" is assumed about the device.
pub trait CharDisplay: Send + fmt::Debug {
    fn clear(&mut self);
    fn move_to(&mut self, col: usize, row: usize);
    fn write_text(&mut self, text: &str);
}

/// Contents of both display rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lines {
    pub top: String,
    pub bottom: String,
}

/// Truncate or right-pad `text` to exactly `width` characters.
pub fn fit(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{clipped:<width$}")
}

/// Location without data yet.
pub fn idle_lines(name: &str, cols: usize) -> Lines {
    Lines {
        top: format!("{}--C", fit(name, cols.saturating_sub(3))),
        bottom: format!("{}H:--%", fit("No data", cols.saturating_sub(5))),
    }
}

/// Location with cached conditions.
///
/// Halves round to even. The temperature field is two characters wide; a rounded value needing more
/// (below -9 or above 99) makes the top line longer than `cols`.
pub fn data_lines(name: &str, conditions: &CurrentConditions, cols: usize) -> Lines {
    let temperature = conditions.temperature_c.round_ties_even() as i64;
    let label = label_for(conditions.weather_code);

    let bottom = if conditions.humidity_pct == 100 {
        format!("{}H:100%", fit(label, cols.saturating_sub(6)))
    } else {
        format!("{}H:{:>2}%", fit(label, cols.saturating_sub(5)), conditions.humidity_pct)
    };

    Lines {
        top: format!("{}{temperature:>2}C", fit(name, cols.saturating_sub(3))),
        bottom,
    }
}

/// Free-form status screen such as "Connecting WiFi".
pub fn message_lines(top: &str, bottom: &str, cols: usize) -> Lines {
    Lines { top: fit(top, cols), bottom: fit(bottom, cols) }
}

/// Lines for a location, idle or with data.
pub fn location_lines(
    location: &Location,
    conditions: Option<&CurrentConditions>,
    cols: usize,
) -> Lines {
    match conditions {
        Some(conditions) => data_lines(&location.name, conditions, cols),
        None => idle_lines(&location.name, cols),
    }
}

#[derive(Debug)]
pub struct DisplayRenderer<D> {
    display: D,
    cols: usize,
}

impl<D: CharDisplay> DisplayRenderer<D> {
    pub fn new(display: D, cols: usize) -> Self {
        Self { display, cols }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Full redraw of both rows.
    pub fn show(&mut self, lines: &Lines) {
        self.display.clear();
        self.display.move_to(0, 0);
        self.display.write_text(&lines.top);
        self.display.move_to(0, 1);
        self.display.write_text(&lines.bottom);
    }

    pub fn show_location(&mut self, location: &Location, conditions: Option<&CurrentConditions>) {
        let lines = location_lines(location, conditions, self.cols);
        debug!("Render {}: {:?} / {:?}", location.name, lines.top, lines.bottom);
        self.show(&lines);
    }

    pub fn show_message(&mut self, top: &str, bottom: &str) {
        let lines = message_lines(top, bottom, self.cols);
        self.show(&lines);
    }

    /// Overlay `Err:<tag>` on the bottom row and hold it for `hold`.
    ///
    /// Stalls the caller; the caller redraws afterwards.
    pub async fn show_error(&mut self, tag: &str, hold: Duration) {
        self.display.move_to(0, 1);
        self.display.write_text(&fit(&format!("Err:{tag}"), self.cols));
        sleep(hold).await;
    }
}
