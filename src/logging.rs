// 📝 Logging - stdout + non-blocking file subscriber
// Level from JALOPY_LOG (default: info)

use crate::error::{JalopyError, Result};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Stdout + file logging. Keep the returned guard alive for the whole run
/// or buffered file lines are lost.
pub fn init_logger(log_file: &Path) -> Result<WorkerGuard> {
    let filter = env::var("JALOPY_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let (directory, file_name) = prepare_log_file(log_file)?;
    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .try_init()
        .map_err(|e| JalopyError::Other(format!("logger already initialized: {e}")))?;

    info!(log_file = %log_file.display(), "Logging to stdout and file");

    Ok(guard)
}

/// Split the log path and create its directory, so the appender never
/// has to (it panics when it cannot).
fn prepare_log_file(log_file: &Path) -> Result<(PathBuf, OsString)> {
    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let file_name = log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("jalopy.log"));

    fs::create_dir_all(&directory)?;

    Ok((directory, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_directory_created() {
        let dir = tempdir().unwrap();
        let log_file = dir.path().join("logs").join("nested").join("jalopy.log");

        let (directory, file_name) = prepare_log_file(&log_file).unwrap();

        assert!(directory.is_dir());
        assert_eq!(directory, dir.path().join("logs").join("nested"));
        assert_eq!(file_name, OsString::from("jalopy.log"));
    }

    #[test]
    fn test_bare_file_name_logs_to_cwd() {
        let (directory, file_name) = prepare_log_file(Path::new("run.log")).unwrap();
        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(file_name, OsString::from("run.log"));
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "file").unwrap();

        let err = prepare_log_file(&blocker.join("jalopy.log")).unwrap_err();
        assert!(matches!(err, JalopyError::Io(_)));
    }
}
