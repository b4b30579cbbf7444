use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Why a log source contributed nothing to a scan pass
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is {size} bytes, limit is {limit}", path.display())]
    Oversized { path: PathBuf, size: u64, limit: u64 },

    #[error("{} is not a regular file", path.display())]
    NotRegularFile { path: PathBuf },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} did not finish within {}s", timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: String },
}
