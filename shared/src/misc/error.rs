// Std.
use std::fmt::Display;

// External.
use backtrace::Backtrace;
use thiserror::Error;

// Custom.
use crate::misc::report::ReportField;

/// Internal error with the place it was created at and a call stack.
#[derive(Debug)]
pub struct AppError {
    message: String,
    location: String,
    backtrace: Backtrace,
}

impl AppError {
    /// Creates a new error, use `file!()` and `line!()` for `file` and `line`.
    pub fn new(message: &str, file: &str, line: u32) -> Self {
        Self {
            message: String::from(message),
            location: format!("{}, {}", file, line),
            backtrace: Backtrace::new(),
        }
    }
    pub fn get_message(&self) -> String {
        self.message.clone()
    }
    pub fn get_location(&self) -> &str {
        &self.location
    }
    fn backtrace_to_string(&self) -> String {
        let mut current_entry_index: usize = 0;
        let mut output = String::new();

        for frame in self.backtrace.frames() {
            for symbol in frame.symbols() {
                let (Some(filename), Some(lineno)) = (symbol.filename(), symbol.lineno()) else {
                    continue;
                };
                output += &format!(
                    "{} {}:{}\n",
                    current_entry_index,
                    Self::shorten_backtrace_paths(&filename.to_string_lossy()),
                    lineno
                );
                current_entry_index += 1;
            }
        }

        output
    }
    fn shorten_backtrace_paths(filename: &str) -> String {
        if filename.contains("rustc") {
            // Probably a crate from standard library.
            return filename.to_string();
        }

        if let Some(cargo_pos) = filename.find(".cargo") {
            // Probably an external crate.
            return filename[cargo_pos..].to_string();
        }

        match filename.find("src") {
            Some(src_dir_pos) => filename[src_dir_pos..].to_string(),
            None => filename.to_string(),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "An error occurred at [{}]: {}\nBacktrace:\n{}",
            self.location,
            self.message,
            self.backtrace_to_string()
        )
    }
}

impl std::error::Error for AppError {}

/// Errors of the report frame codec.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("sent {sent} byte(s) while expected {expected}")]
    ShortWrite { sent: usize, expected: usize },

    #[error("received {received} byte(s) while expected {expected}")]
    ShortRead { received: usize, expected: usize },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("field \"{field}\" has {size} byte(s) while the limit is {limit}")]
    FieldTooLong {
        field: ReportField,
        size: usize,
        limit: usize,
    },

    #[error("field \"{0}\" is not valid UTF-8")]
    InvalidUtf8(ReportField),
}

impl WireError {
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            WireError::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

/// Result of a failed report submission.
#[derive(Debug, Error)]
pub enum SendReportError {
    /// Nothing was sent, the field needs to be shortened.
    #[error("field \"{field}\" (id {}) exceeds its limit of {} bytes", .field.id(), .field.max_size_in_bytes())]
    FieldTooLong { field: ReportField },

    #[error("failed to resolve address \"{address}\": {source}")]
    AddressResolution {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not connect to \"{address}\" after {attempts} attempt(s): {source}")]
    CouldNotConnect {
        address: String,
        attempts: usize,
        #[source]
        source: std::io::Error,
    },

    /// The connection was established but the exchange failed, nothing is retried.
    #[error("transport error: {0}")]
    Transport(#[from] WireError),
}

impl SendReportError {
    /// Returns the platform error code if the error came from the OS.
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            SendReportError::FieldTooLong { .. } => None,
            SendReportError::AddressResolution { source, .. } => source.raw_os_error(),
            SendReportError::CouldNotConnect { source, .. } => source.raw_os_error(),
            SendReportError::Transport(wire_error) => wire_error.os_error_code(),
        }
    }
}
