// ABOUTME: Output stream resolution for subprocess stdout/stderr redirection
// ABOUTME: Maps symbolic stream names or filesystem paths to writable, closable sinks

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::process::Stdio;
use thiserror::Error;

/// Reserved name for the discard sink.
pub const DEVNUL: &str = "devnul";
/// Reserved name for the host's standard error.
pub const STDERR: &str = "stderr";
/// Reserved name for the host's standard output.
pub const STDOUT: &str = "stdout";

// Permissions for files created by the resolver.
const FILE_MODE: u32 = 0o644;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("missing stream name")]
    MissingName,

    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot open stderr: {0}")]
    Stderr(#[source] Box<StreamError>),

    #[error("cannot open stdout: {0}")]
    Stdout(#[source] Box<StreamError>),
}

/// A writable destination for a process output stream.
#[derive(Debug)]
pub enum Sink {
    Stdout,
    Stderr,
    Discard,
    File(File),
}

impl Sink {
    /// Resolve the first non-empty candidate name to a sink.
    ///
    /// `stdout`, `stderr` and `devnul` never touch the filesystem. Any other
    /// name is opened as a file in append mode, created if missing.
    pub fn resolve<I, S>(names: I) -> Result<Self, StreamError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            match name.as_ref() {
                "" => continue,
                DEVNUL => return Ok(Sink::Discard),
                STDERR => return Ok(Sink::Stderr),
                STDOUT => return Ok(Sink::Stdout),
                path => {
                    let file = OpenOptions::new()
                        .read(true)
                        .append(true)
                        .create(true)
                        .mode(FILE_MODE)
                        .open(path)
                        .map_err(|source| StreamError::Open {
                            path: path.to_string(),
                            source,
                        })?;

                    return Ok(Sink::File(file));
                }
            }
        }

        Err(StreamError::MissingName)
    }

    /// Hand the sink over to a child process.
    pub fn into_stdio(self) -> Stdio {
        match self {
            Sink::Stdout => Stdio::from(io::stdout()),
            Sink::Stderr => Stdio::from(io::stderr()),
            Sink::Discard => Stdio::null(),
            Sink::File(file) => Stdio::from(file),
        }
    }

    /// Flush and release the sink. Reserved sinks stay open for the host.
    pub fn close(mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout => io::stdout().write(buf),
            Sink::Stderr => io::stderr().write(buf),
            Sink::Discard => Ok(buf.len()),
            Sink::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout => io::stdout().flush(),
            Sink::Stderr => io::stderr().flush(),
            Sink::Discard => Ok(()),
            Sink::File(file) => file.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_file_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.log");
        let path_str = path.to_str().unwrap();

        for _ in 0..2 {
            let mut sink = Sink::resolve([path_str]).unwrap();
            assert!(matches!(sink, Sink::File(_)));
            assert_eq!(sink.write(b"hello").unwrap(), 5);
            sink.close().unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "hellohello");
    }

    #[test]
    fn test_resolve_reserved_names() {
        assert!(matches!(Sink::resolve([STDERR]).unwrap(), Sink::Stderr));
        assert!(matches!(Sink::resolve([STDOUT]).unwrap(), Sink::Stdout));

        let mut sink = Sink::resolve(["", DEVNUL]).unwrap();
        assert!(matches!(sink, Sink::Discard));
        assert_eq!(sink.write(b"hello").unwrap(), 5);
        sink.close().unwrap();
    }

    #[test]
    fn test_resolve_first_non_empty_wins() {
        assert!(matches!(
            Sink::resolve(["", STDOUT, STDERR]).unwrap(),
            Sink::Stdout
        ));
    }

    #[test]
    fn test_resolve_missing_name() {
        let empty: [&str; 0] = [];
        assert_eq!(
            Sink::resolve(empty).unwrap_err().to_string(),
            "missing stream name"
        );
        assert_eq!(
            Sink::resolve(["", ""]).unwrap_err().to_string(),
            "missing stream name"
        );
    }

    #[test]
    fn test_resolve_nonexistent_directory() {
        let err = Sink::resolve(["/does/not/exist"]).unwrap_err();
        assert!(matches!(err, StreamError::Open { .. }));
        assert!(err
            .to_string()
            .starts_with("cannot open /does/not/exist: "));
    }

    #[test]
    fn test_resolve_directory_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_str().unwrap().to_string();

        let err = Sink::resolve([path.as_str()]).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with(&format!("cannot open {}: ", path)));
        assert!(message.to_lowercase().contains("directory"));
    }
}
