//! Inter-process communication between pomo and pomoctl
//!
//! Commands are plain UTF-8 text over a Unix domain socket, one command
//! per connection. The daemon writes a single reply and closes the
//! connection, so anything that can talk to a socket (`nc -U`, `socat`)
//! works as a client too.

use regex::Regex;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

/// Socket file name, created next to the daemon executable
pub const SOCKET_NAME: &str = "pomo.sock";

/// The daemon reads at most this many bytes of a command
pub const MAX_COMMAND_BYTES: usize = 1024;

/// Commands that pomoctl can send to pomo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Continue,
    Kill,
    Pause,
    Reset,
    Time,
    Skip,
    /// `set`, optionally followed by `--description '<text>'`
    Set { description: Option<String> },
    /// Anything unrecognised. The daemon echoes it back.
    Other(String),
}

fn description_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"--description '(.*)'").expect("description pattern is a valid regex")
    })
}

impl Command {
    /// Decode one command. Never fails: unknown input becomes `Other`.
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        match text {
            "continue" => Command::Continue,
            "kill" => Command::Kill,
            "pause" => Command::Pause,
            "reset" => Command::Reset,
            "time" => Command::Time,
            "skip" => Command::Skip,
            set if set.starts_with("set") => Command::Set {
                description: description_pattern()
                    .captures(set)
                    .map(|caps| caps[1].to_string()),
            },
            other => Command::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Continue => write!(f, "continue"),
            Command::Kill => write!(f, "kill"),
            Command::Pause => write!(f, "pause"),
            Command::Reset => write!(f, "reset"),
            Command::Time => write!(f, "time"),
            Command::Skip => write!(f, "skip"),
            Command::Set { description: None } => write!(f, "set"),
            Command::Set {
                description: Some(description),
            } => write!(f, "set --description '{}'", description),
            Command::Other(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection refused at {0:?} - is pomo running?")]
    ConnectionRefused(PathBuf),

    #[error("Could not determine the directory of the running executable")]
    NoSocketDir,
}

/// Default socket location: alongside the running executable, so a daemon
/// and a pomoctl installed in the same directory find each other.
pub fn default_socket_path() -> Result<PathBuf, IpcError> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or(IpcError::NoSocketDir)?;
    Ok(dir.join(SOCKET_NAME))
}

/// Send one command and wait for the daemon's reply.
pub async fn send(socket_path: &Path, command: &Command) -> Result<String, IpcError> {
    let mut stream = UnixStream::connect(socket_path)
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => {
                IpcError::ConnectionRefused(socket_path.to_path_buf())
            }
            _ => IpcError::Io(e),
        })?;

    stream.write_all(command.to_string().as_bytes()).await?;
    stream.shutdown().await?;

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await?;
    Ok(String::from_utf8_lossy(&reply).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::UnixListener;

    #[test]
    fn parses_bare_keywords() {
        assert_eq!(Command::parse("continue"), Command::Continue);
        assert_eq!(Command::parse("kill\n"), Command::Kill);
        assert_eq!(Command::parse("  pause  "), Command::Pause);
        assert_eq!(Command::parse("reset"), Command::Reset);
        assert_eq!(Command::parse("time\r\n"), Command::Time);
        assert_eq!(Command::parse("skip"), Command::Skip);
    }

    #[test]
    fn set_extracts_quoted_description() {
        assert_eq!(
            Command::parse("set --description 'write report'"),
            Command::Set {
                description: Some("write report".to_string())
            }
        );
        assert_eq!(
            Command::parse("set --description ''"),
            Command::Set {
                description: Some(String::new())
            }
        );
    }

    #[test]
    fn set_without_quoted_argument_is_a_query() {
        assert_eq!(Command::parse("set"), Command::Set { description: None });
        assert_eq!(
            Command::parse("set --description unquoted"),
            Command::Set { description: None }
        );
        // Prefix match, like the keyword was typed with trailing junk
        assert_eq!(
            Command::parse("settings"),
            Command::Set { description: None }
        );
    }

    #[test]
    fn greedy_match_keeps_inner_quotes() {
        assert_eq!(
            Command::parse("set --description 'it's done'"),
            Command::Set {
                description: Some("it's done".to_string())
            }
        );
    }

    #[test]
    fn unknown_input_is_kept_verbatim() {
        assert_eq!(
            Command::parse("xyzzy"),
            Command::Other("xyzzy".to_string())
        );
        assert_eq!(Command::parse("   "), Command::Other(String::new()));
        assert_eq!(Command::parse("Pause"), Command::Other("Pause".to_string()));
    }

    #[test]
    fn display_matches_what_parse_accepts() {
        let cmd = Command::Set {
            description: Some("deep work".to_string()),
        };
        assert_eq!(cmd.to_string(), "set --description 'deep work'");
        assert_eq!(Command::parse(&cmd.to_string()), cmd);
        assert_eq!(Command::Skip.to_string(), "skip");
    }

    #[tokio::test]
    async fn send_reports_missing_daemon() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SOCKET_NAME);
        let err = send(&path, &Command::Time).await.unwrap_err();
        assert!(matches!(err, IpcError::ConnectionRefused(p) if p == path));
    }

    #[tokio::test]
    async fn send_writes_command_and_reads_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SOCKET_NAME);
        let listener = UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = String::new();
            stream.read_to_string(&mut received).await.unwrap();
            stream.write_all(b"ack").await.unwrap();
            received
        });

        let reply = send(&path, &Command::Pause).await.unwrap();
        assert_eq!(reply, "ack");
        assert_eq!(server.await.unwrap(), "pause");
    }
}
