//! Terminal output for the three `--output-format` modes.

use crate::error::{AudioLeftError, UserFriendlyError};
use crate::extractor::ExtractionReport;
use console::{style, Emoji, StyledObject, Term};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static DONE: Emoji = Emoji("✅ ", "ok ");
static FAILED: Emoji = Emoji("❌ ", "x ");
static CAUTION: Emoji = Emoji("⚠️  ", "! ");
static NOTE: Emoji = Emoji("ℹ️  ", "i ");
static AUDIO: Emoji = Emoji("🎵 ", "> ");
static TRACE: Emoji = Emoji("🔍 ", ". ");

/// What a one-line message is. Decides its marker, its stream and how
/// verbose the run has to be to show it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Step,
    Success,
    Warning,
    Error,
    Info,
    Debug,
}

impl Kind {
    /// `None` means the message survives `--quiet`.
    fn min_verbosity(self) -> Option<u8> {
        match self {
            Kind::Error => None,
            Kind::Step | Kind::Success | Kind::Warning => Some(0),
            Kind::Info => Some(1),
            Kind::Debug => Some(2),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Kind::Warning | Kind::Error)
    }

    fn label(self) -> &'static str {
        match self {
            Kind::Step => "step",
            Kind::Success => "success",
            Kind::Warning => "warning",
            Kind::Error => "error",
            Kind::Info => "info",
            Kind::Debug => "debug",
        }
    }

    fn marker(self) -> Emoji<'static, 'static> {
        match self {
            Kind::Step => AUDIO,
            Kind::Success => DONE,
            Kind::Warning => CAUTION,
            Kind::Error => FAILED,
            Kind::Info => NOTE,
            Kind::Debug => TRACE,
        }
    }

    fn paint(self, text: &str) -> StyledObject<&str> {
        match self {
            Kind::Step => style(text).bold(),
            Kind::Success => style(text).green().bold(),
            Kind::Warning => style(text).yellow().bold(),
            Kind::Error => style(text).red().bold(),
            Kind::Info => style(text).cyan(),
            Kind::Debug => style(text).dim(),
        }
    }
}

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbosity: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = mode == OutputMode::Human
            && !quiet
            && Term::stdout().features().colors_supported();

        Self {
            mode,
            use_colors,
            verbosity: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Announces the next thing the tool is about to do.
    pub fn step(&self, message: &str) {
        self.emit(Kind::Step, message);
    }

    pub fn success(&self, message: &str) {
        self.emit(Kind::Success, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Kind::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Kind::Error, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Kind::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Kind::Debug, message);
    }

    /// Labelled value such as `Input:  movie.mp4`, shown at default verbosity.
    pub fn field(&self, label: &str, value: &str) {
        if !self.shows(Kind::Step) {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                let label = format!("{:<7} ", format!("{}:", label));
                if self.use_colors {
                    println!("{}{}", style(label).bold(), value);
                } else {
                    println!("{}{}", label, value);
                }
            }
            OutputMode::Json => self.print_json(&json!({
                "type": "field",
                "name": label.to_lowercase(),
                "value": value,
            })),
            OutputMode::Plain => println!("{}: {}", label.to_uppercase(), value),
        }
    }

    /// Prints the error and, when there is one, a hint on how to fix it.
    pub fn print_user_friendly_error(&self, error: &AudioLeftError) {
        self.error(&error.user_message());

        let Some(hint) = error.suggestion() else {
            return;
        };

        match self.mode {
            OutputMode::Human if self.use_colors => {
                eprintln!("{}{}", NOTE, style(format!("Try: {}", hint)).cyan())
            }
            OutputMode::Human => eprintln!("{}Try: {}", NOTE, hint),
            OutputMode::Json => eprintln!(
                "{}",
                json_line(&json!({ "type": "hint", "message": hint }))
            ),
            OutputMode::Plain => eprintln!("HINT: {}", hint),
        }
    }

    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        match self.mode {
            OutputMode::Human if self.quiet => {}
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => println!("{}", report_json_line(report)),
            OutputMode::Plain => {
                println!("REPORT: {} -> {}", report.input.display(), report.output.display());
                if let Some(ref codec) = report.codec {
                    println!("CODEC: {}", codec);
                }
                println!("SIZE: {} bytes", report.output_size);
                println!("DURATION: {}ms", report.duration.as_millis());
            }
        }
    }

    /// Writes `value` to stdout as a single JSON line.
    pub fn print_json(&self, value: &Value) {
        println!("{}", json_line(value));
    }

    /// Horizontal rule between sections of human or plain output.
    pub fn rule(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human if self.use_colors => println!("{}", style("─".repeat(48)).dim()),
            OutputMode::Human | OutputMode::Plain => println!("{}", "-".repeat(48)),
            OutputMode::Json => {}
        }
    }

    fn shows(&self, kind: Kind) -> bool {
        match kind.min_verbosity() {
            None => true,
            Some(level) => !self.quiet && self.verbosity >= level,
        }
    }

    fn emit(&self, kind: Kind, message: &str) {
        if !self.shows(kind) {
            return;
        }

        let line = self.render(kind, message);
        if kind.to_stderr() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn render(&self, kind: Kind, message: &str) -> String {
        match self.mode {
            OutputMode::Human if self.use_colors => {
                format!("{}{}", kind.marker(), kind.paint(message))
            }
            OutputMode::Human => format!("{}{}", kind.marker(), message),
            OutputMode::Json => json_line(&json!({
                "type": "message",
                "level": kind.label(),
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
            OutputMode::Plain => format!("{}: {}", kind.label().to_uppercase(), message),
        }
    }

    fn print_human_report(&self, report: &ExtractionReport) {
        let value = |text: String| {
            if self.use_colors {
                style(text).cyan().to_string()
            } else {
                text
            }
        };

        self.rule();
        if let Some(ref codec) = report.codec {
            println!("  codec  {}", value(codec.clone()));
        }
        println!("  size   {}", value(format_bytes(report.output_size)));
        println!("  took   {}", value(format_duration(report.duration)));
        self.rule();
    }
}

fn json_line(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn report_json_line(report: &ExtractionReport) -> String {
    serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
