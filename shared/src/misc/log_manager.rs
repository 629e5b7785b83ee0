// Std.
use std::fs::*;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

// External.
use chrono::Local;
#[cfg(any(unix, windows))]
use platform_dirs::UserDirs;

// Custom.
use crate::misc::error::AppError;

const LOG_DIR_PREFIX: &str = "FBugReporter";
const MAX_LOG_FILE_COUNT: usize = 10;

pub enum LogCategory {
    Info,
    Warning,
    Error,
}

pub struct LogManager {
    current_log_file: PathBuf,
    print_to_stdout: bool,
}

impl LogManager {
    /// Creates a new log file in "Documents/FBugReporter/`log_dir`".
    ///
    /// ## Arguments
    /// * `log_dir`: name of the directory for logs of this application.
    /// * `log_file_name`: name of the log file, it will be prefixed with the current date and time.
    pub fn new(log_dir: &str, log_file_name: &str) -> Result<Self, AppError> {
        let mut log_path;

        #[cfg(any(unix, windows))]
        {
            let user_dirs = UserDirs::new().ok_or_else(|| {
                AppError::new("can't read user directories", file!(), line!())
            })?;

            log_path = user_dirs.document_dir;
        }

        #[cfg(not(any(unix, windows)))]
        {
            compile_error!("Logging is not implemented for this OS.");
        }

        log_path.push(LOG_DIR_PREFIX);
        log_path.push(log_dir);

        Self::new_in(log_path, log_file_name)
    }

    /// Creates a new log file in the specified directory (created if not exists).
    pub fn new_in(log_dir: PathBuf, log_file_name: &str) -> Result<Self, AppError> {
        Ok(Self {
            current_log_file: Self::recreate_log_file(log_dir, log_file_name)?,
            print_to_stdout: false,
        })
    }

    /// Whether `log` should also print messages on the screen.
    pub fn set_print_to_stdout(&mut self, print_to_stdout: bool) {
        self.print_to_stdout = print_to_stdout;
    }

    pub fn current_log_file(&self) -> &Path {
        &self.current_log_file
    }

    /// Writes text to the log file (and on the screen if enabled).
    pub fn log(&self, category: LogCategory, text: &str) {
        let mut message = match category {
            LogCategory::Info => String::from("INFO: "),
            LogCategory::Warning => String::from("WARNING: "),
            LogCategory::Error => String::from("ERROR: "),
        };
        message += text;

        let datetime = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if self.print_to_stdout {
            println!("[{}] {}", datetime, message);
        }

        let result = OpenOptions::new()
            .append(true)
            .open(&self.current_log_file)
            .and_then(|mut log_file| writeln!(log_file, "[{}] {}", datetime, message));
        if let Err(e) = result {
            eprintln!(
                "ERROR: failed to write to the log file {}: {}",
                self.current_log_file.display(),
                e
            );
        }
    }

    /// Creates a log directory if needed, removes the oldest log file if there are too many
    /// and creates a new empty log file.
    ///
    /// Returns path to the new log file.
    fn recreate_log_file(mut log_path: PathBuf, log_file_name: &str) -> Result<PathBuf, AppError> {
        if !log_path.exists() {
            if let Err(e) = create_dir_all(&log_path) {
                return Err(AppError::new(&e.to_string(), file!(), line!()));
            }
        } else {
            LogManager::remove_oldest_log_if_needed(&log_path);
        }

        let local = Local::now();
        let filename = format!("{}_{}", local.format("%Y-%m-%d_%H-%M-%S"), log_file_name);

        log_path.push(&filename);

        // Truncates the file if it exists.
        if let Err(e) = File::create(&log_path) {
            return Err(AppError::new(&e.to_string(), file!(), line!()));
        }

        Ok(log_path)
    }

    /// Removes the oldest log file if there are `MAX_LOG_FILE_COUNT` log files or more.
    fn remove_oldest_log_if_needed(log_path: &Path) {
        let paths = match read_dir(log_path) {
            Ok(paths) => paths,
            Err(e) => {
                eprintln!("ERROR: {} at [{}, {}]", e, file!(), line!());
                return;
            }
        };

        let mut logs: Vec<(PathBuf, u64)> = Vec::new();

        for entry in paths.flatten() {
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    eprintln!("ERROR: {} at [{}, {}]", e, file!(), line!());
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let elapsed_seconds = metadata
                .modified()
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0);

            logs.push((entry.path(), elapsed_seconds));
        }

        if logs.len() < MAX_LOG_FILE_COUNT {
            return;
        }

        // Oldest last.
        logs.sort_by_key(|(_, elapsed)| *elapsed);

        if let Some((oldest, _)) = logs.last() {
            if let Err(e) = remove_file(oldest) {
                eprintln!("ERROR: failed to remove oldest log file, error: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lines_have_category_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let logger = LogManager::new_in(dir.path().join("logs"), "test.log").unwrap();

        logger.log(LogCategory::Info, "connected");
        logger.log(LogCategory::Error, "short read");

        let content = read_to_string(logger.current_log_file()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] INFO: connected"));
        assert!(lines[1].ends_with("] ERROR: short read"));
    }

    #[test]
    fn log_file_name_is_prefixed_with_date() {
        let dir = tempfile::tempdir().unwrap();
        let logger = LogManager::new_in(dir.path().to_path_buf(), "collector.log").unwrap();

        let name = logger
            .current_log_file()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert!(name.ends_with("_collector.log"));
        assert!(logger.current_log_file().starts_with(dir.path()));
    }

    #[test]
    fn oldest_log_is_removed_when_limit_reached() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..MAX_LOG_FILE_COUNT {
            File::create(dir.path().join(format!("old_{}.log", i))).unwrap();
        }

        LogManager::new_in(dir.path().to_path_buf(), "new.log").unwrap();

        let count = read_dir(dir.path()).unwrap().count();
        assert_eq!(count, MAX_LOG_FILE_COUNT);
    }
}
