//! Log writer.
//!
//! Thread-safe writing to stdout/stderr or configured files. Initialized
//! once at startup; before that, messages fall back to the console.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

/// Thread-safe log writer with separate access and error targets
pub struct LogWriter {
    access: LogTarget,
    error: LogTarget,
}

impl LogWriter {
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        let access = match access_log_file {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stdout,
        };
        let error = match error_log_file {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stderr,
        };
        Ok(Self { access, error })
    }

    pub fn write_access(&self, message: &str) {
        write_to_target(&self.access, message);
    }

    pub fn write_info(&self, message: &str) {
        write_to_target(&self.access, message);
    }

    pub fn write_error(&self, message: &str) {
        write_to_target(&self.error, message);
    }
}

fn write_to_target(target: &LogTarget, message: &str) {
    match target {
        LogTarget::Stdout => println!("{message}"),
        LogTarget::Stderr => eprintln!("{message}"),
        LogTarget::File(file) => {
            if let Ok(mut file) = file.lock() {
                // A failed log write is not worth crashing a request over.
                let _ = writeln!(file, "{message}");
            }
        }
    }
}

fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global writer. Later calls are ignored.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    let _ = LOG_WRITER.set(writer);
    Ok(())
}

pub fn is_initialized() -> bool {
    LOG_WRITER.get().is_some()
}

/// Get the global writer. Panics if called before [`init`]; callers go
/// through the logger facade which checks [`is_initialized`] first.
pub fn get() -> &'static LogWriter {
    LOG_WRITER.get().expect("logger not initialized")
}
