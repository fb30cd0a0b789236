//! Logging utilities with colored output and step status display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro gated behind `--verbose`
//! - `StatusLine` for success/failure lines of builds and installs
//!
//! # Example
//!
//! ```ignore
//! log!("deps"; "downloading {}", url);
//! status_success(Step::Build, "built json.0123456789ab");
//! status_error(Step::Build, "failed to build wasm", &diagnostic);
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" | "ws" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "deps" => prefix.bright_magenta().bold().to_string(),
        "error" | "warning" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Step status lines
// ============================================================================

/// Long-running step a status line reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Build,
    Install,
}

impl Step {
    fn label(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Install => "deps",
        }
    }
}

/// Wall-clock HH:MM:SS (UTC).
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

/// Outcome lines for builds and installs.
///
/// A success line replaces the previous success line of the same step, so
/// a burst of rebuilds leaves one line behind. Failures are never
/// overwritten and reset the overwrite state.
pub struct StatusLine {
    /// Step and height of the last overwritable line
    last: Option<(Step, usize)>,
}

static STATUS_LINE: LazyLock<Mutex<StatusLine>> = LazyLock::new(|| Mutex::new(StatusLine::new()));

impl StatusLine {
    pub const fn new() -> Self {
        Self { last: None }
    }

    pub fn success(&mut self, step: Step, message: &str) {
        let symbol = "✓".green().to_string();
        self.print(step, &symbol, message);
        self.last = Some((step, message.lines().count().max(1)));
    }

    /// Failure with the tool's raw diagnostic underneath.
    pub fn error(&mut self, step: Step, summary: &str, detail: &str) {
        let symbol = "✗".red().to_string();
        let detail = detail.trim_end();
        if detail.is_empty() {
            self.print(step, &symbol, summary);
        } else {
            self.print(step, &symbol, &format!("{summary}\n{detail}"));
        }
        self.last = None;
    }

    fn print(&self, step: Step, symbol: &str, message: &str) {
        let mut stdout = stdout().lock();

        if let Some((last_step, height)) = self.last
            && last_step == step
        {
            let height = u16::try_from(height).unwrap_or(u16::MAX);
            execute!(stdout, cursor::MoveUp(height), Clear(ClearType::FromCursorDown)).ok();
        }

        let stamp = format!("[{}]", now()).dimmed().to_string();
        let label = format!("{:<5}", step.label()).bold().to_string();
        writeln!(stdout, "{stamp} {symbol} {label} {message}").ok();
        stdout.flush().ok();
    }
}

/// Report a finished step.
pub fn status_success(step: Step, message: &str) {
    STATUS_LINE.lock().success(step, message);
}

/// Report a failed step.
pub fn status_error(step: Step, summary: &str, detail: &str) {
    STATUS_LINE.lock().error(step, summary, detail);
}

// ============================================================================
// Tests
// ============================================================================
