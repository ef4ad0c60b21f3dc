//! Output rendering for chat streaming.
//!
//! This module provides the renderer trait the chat session streams into and
//! a plain-text implementation for terminals.

use std::io::{self, Stdout, Write};

/// ANSI escape code for dim text (used for status lines).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for status lines).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for cyan text (used for the assistant label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for yellow text (used for hints).
const ANSI_YELLOW: &str = "\x1b[33m";

/// Return to column zero and erase the current line.
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Capturing fragments in tests
pub trait Renderer: Send {
    /// Called before the first fragment of a response.
    fn start_response(&mut self, label: &str) {
        _ = label;
    }

    /// Print a transient status line, such as a busy indicator.
    ///
    /// The status is replaced by the first fragment of text.
    fn print_status(&mut self, status: &str) {
        _ = status;
    }

    /// Print a chunk of response text.
    ///
    /// This is called incrementally as fragments are streamed from the API.
    fn print_text(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print a hint that accompanies an error.
    fn print_hint(&mut self, hint: &str) {
        self.print_info(hint);
    }

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a response is complete, successfully or not.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    in_status: bool,
    line_start: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            in_status: false,
            line_start: true,
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn clear_status(&mut self) {
        if self.in_status {
            if self.use_color {
                print!("{ANSI_RESET}{ANSI_CLEAR_LINE}");
            } else {
                println!();
            }
            self.in_status = false;
            self.line_start = true;
        }
    }

    fn ensure_line_start(&mut self) {
        if !self.line_start {
            println!();
            self.line_start = true;
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn start_response(&mut self, label: &str) {
        self.clear_status();
        self.ensure_line_start();
        if self.use_color {
            println!("{ANSI_BOLD}{ANSI_CYAN}{label}:{ANSI_RESET}");
        } else {
            println!("{label}:");
        }
        self.flush();
    }

    fn print_status(&mut self, status: &str) {
        self.clear_status();
        if self.use_color {
            print!("{ANSI_DIM}{ANSI_ITALIC}{status}{ANSI_RESET}");
        } else {
            print!("{status}");
        }
        self.in_status = true;
        self.line_start = false;
        self.flush();
    }

    fn print_text(&mut self, text: &str) {
        self.clear_status();
        print!("{text}");
        if !text.is_empty() {
            self.line_start = text.ends_with('\n');
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.clear_status();
        self.ensure_line_start();
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_hint(&mut self, hint: &str) {
        self.clear_status();
        self.ensure_line_start();
        if self.use_color {
            eprintln!("{ANSI_YELLOW}{hint}{ANSI_RESET}");
        } else {
            eprintln!("{hint}");
        }
    }

    fn print_info(&mut self, info: &str) {
        self.clear_status();
        self.ensure_line_start();
        println!("{info}");
        self.flush();
    }

    fn finish_response(&mut self) {
        self.clear_status();
        self.ensure_line_start();
        self.flush();
    }
}
