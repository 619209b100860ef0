mod progress;
pub mod view_models;
mod views;

pub use progress::ProgressPrinter;

use crate::types::OutputFormat;
use anyhow::Result;
use is_terminal::IsTerminal;
use serde::Serialize;
use std::fmt;

/// Bridge from a view model to its plain-text view.
pub trait CreateView {
    fn create_view<'a>(&'a self, style: Style) -> Box<dyn fmt::Display + 'a>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub color: bool,
}

/// Prints view models as JSON or as text, depending on `--format`.
pub struct ConsoleRenderer {
    format: OutputFormat,
    style: Style,
}

impl ConsoleRenderer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            style: Style {
                color: std::io::stdout().is_terminal(),
            },
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn render<T>(&self, view_model: &T) -> Result<()>
    where
        T: Serialize + CreateView,
    {
        if self.is_json() {
            println!("{}", serde_json::to_string_pretty(view_model)?);
        } else {
            print!("{}", view_model.create_view(self.style));
        }
        Ok(())
    }
}
