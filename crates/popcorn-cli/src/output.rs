use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn emit(&self, level: Level, msg: &str) {
        // Errors are shown even in quiet mode
        if self.quiet && level != Level::Error {
            return;
        }

        if !self.is_human() {
            self.print_json(&json!({ "type": level.as_str(), "message": msg }));
            return;
        }

        match level {
            Level::Success => println!("{} {}", "✓".green(), msg),
            Level::Info => println!("{}", msg),
            Level::Warning => println!("{} {}", "⚠".yellow(), msg),
            Level::Error => eprintln!("{} {}", "⛔".red(), msg),
        }
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.emit(Level::Success, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.emit(Level::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.emit(Level::Warning, msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.emit(Level::Error, msg.as_ref());
    }

    /// Pre-rendered human output (tables, detail panes). Ignored in JSON modes.
    pub fn block(&self, text: impl AsRef<str>) {
        if self.quiet || !self.is_human() {
            return;
        }
        println!("{}", text.as_ref());
    }

    /// Structured payload. Ignored in human mode, where `block` carries the same data.
    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet || self.is_human() {
            return;
        }
        self.print_json(data);
    }

    fn print_json(&self, data: &serde_json::Value) {
        let rendered = match self.format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(data),
            _ => serde_json::to_string(data),
        };
        println!("{}", rendered.unwrap_or_default());
    }

    /// Prompt text without a newline.
    pub fn prompt(&self, msg: impl AsRef<str>) -> io::Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        print!("{}", msg.as_ref());
        io::stdout().flush()
    }
}
