//! Agents: the programs that play a match.
//!
//! The host talks to every agent through the [`Agent`] trait, one message and
//! one reply line at a time. [`ProcessAgent`] drives a child process over its
//! standard streams; [`ScriptedAgent`] plays back canned replies.

use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use crate::error::AgentError;

/// A participant in a match.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Send one message and wait for the reply line, without its newline.
    async fn exchange(&mut self, message: &str) -> Result<String, AgentError>;

    /// File the agent's diagnostics are written to, if any.
    fn log_filename(&self) -> Option<String> {
        None
    }

    /// Release the agent at the end of the match.
    async fn shutdown(&mut self) {}
}

/// An agent running as a child process.
///
/// Longest reply line a process agent may send, in bytes.
pub const MAX_REPLY_BYTES: u64 = 1 << 20;

/// Messages go to the child's stdin and replies are read line by line from
/// its stdout. The process is killed when the agent is dropped.
#[derive(Debug)]
pub struct ProcessAgent {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    log_filename: Option<String>,
    reply_limit: u64,
}

impl ProcessAgent {
    /// Start `command` through the shell.
    ///
    /// The child's stderr goes to `log_file` when given, otherwise it is
    /// inherited from the host.
    ///
    /// # Errors
    /// Returns an error if the log file cannot be created or the process
    /// cannot be started.
    pub fn spawn(command: &str, log_file: Option<&Path>) -> Result<Self, AgentError> {
        let stderr = match log_file {
            Some(path) => Stdio::from(std::fs::File::create(path)?),
            None => Stdio::inherit(),
        };
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()?;
        debug!(command, pid = child.id(), "Agent started");

        let stdin = child.stdin.take().ok_or(AgentError::Disconnected)?;
        let stdout = child.stdout.take().ok_or(AgentError::Disconnected)?;
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            log_filename: log_file.map(|path| path.display().to_string()),
            reply_limit: MAX_REPLY_BYTES,
        })
    }

    /// Replace the reply size limit.
    #[must_use]
    pub fn with_reply_limit(mut self, bytes: u64) -> Self {
        self.reply_limit = bytes;
        self
    }
}

#[async_trait]
impl Agent for ProcessAgent {
    async fn exchange(&mut self, message: &str) -> Result<String, AgentError> {
        self.stdin.write_all(message.as_bytes()).await?;
        self.stdin.flush().await?;

        let mut bytes = Vec::new();
        let read = (&mut self.stdout)
            .take(self.reply_limit)
            .read_until(b'\n', &mut bytes)
            .await?;
        if read == 0 {
            return Err(AgentError::Disconnected);
        }
        if !bytes.ends_with(b"\n") && read as u64 >= self.reply_limit {
            return Err(AgentError::Protocol(format!(
                "reply longer than {} bytes",
                self.reply_limit
            )));
        }
        let line = String::from_utf8(bytes)
            .map_err(|_| AgentError::Protocol("reply is not valid UTF-8".into()))?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn log_filename(&self) -> Option<String> {
        self.log_filename.clone()
    }

    async fn shutdown(&mut self) {
        if self.child.start_kill().is_ok() {
            let _ = self.child.wait().await;
        }
    }
}

/// One canned reply of a [`ScriptedAgent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Answer immediately.
    Line(String),
    /// Answer after a delay.
    Delayed(Duration, String),
    /// Close the connection; every later exchange fails too.
    Hangup,
}

impl Reply {
    /// Immediate reply.
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }
}

/// An agent answering from a script.
///
/// The first exchange is the init handshake and is answered with the
/// agent's name. Once the script runs out every message gets the fallback
/// line, empty unless set with [`ScriptedAgent::repeating`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgent {
    replies: VecDeque<Reply>,
    fallback: String,
    hung_up: bool,
    received: Vec<String>,
}

impl ScriptedAgent {
    /// Agent that reports `name` and then sends no commands.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_replies([Reply::Line(name.into())])
    }

    /// Agent following `replies` from the init handshake on.
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Queue another reply.
    #[must_use]
    pub fn then(mut self, reply: Reply) -> Self {
        self.replies.push_back(reply);
        self
    }

    /// Reply used once the script is exhausted.
    #[must_use]
    pub fn repeating(mut self, line: impl Into<String>) -> Self {
        self.fallback = line.into();
        self
    }

    /// Every message received so far.
    #[must_use]
    pub fn received(&self) -> &[String] {
        &self.received
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn exchange(&mut self, message: &str) -> Result<String, AgentError> {
        self.received.push(message.to_string());
        if self.hung_up {
            return Err(AgentError::Disconnected);
        }
        match self.replies.pop_front() {
            Some(Reply::Line(line)) => Ok(line),
            Some(Reply::Delayed(delay, line)) => {
                tokio::time::sleep(delay).await;
                Ok(line)
            }
            Some(Reply::Hangup) => {
                self.hung_up = true;
                Err(AgentError::Disconnected)
            }
            None => Ok(self.fallback.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_agent_follows_script() {
        let mut agent = ScriptedAgent::new("bot")
            .then(Reply::line("t 0 7"))
            .repeating("u 0");

        assert_eq!(agent.exchange("init").await.unwrap(), "bot");
        assert_eq!(agent.exchange("turn 1").await.unwrap(), "t 0 7");
        assert_eq!(agent.exchange("turn 2").await.unwrap(), "u 0");
        assert_eq!(agent.received().len(), 3);
    }

    #[tokio::test]
    async fn test_scripted_hangup_is_permanent() {
        let mut agent = ScriptedAgent::new("bot").then(Reply::Hangup).repeating("u 0");
        agent.exchange("init").await.unwrap();
        assert!(matches!(
            agent.exchange("turn").await,
            Err(AgentError::Disconnected)
        ));
        assert!(matches!(
            agent.exchange("turn").await,
            Err(AgentError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn test_process_agent_round_trip() {
        let mut agent = ProcessAgent::spawn("cat", None).unwrap();
        assert_eq!(agent.exchange("hello\n").await.unwrap(), "hello");
        assert_eq!(agent.exchange("t 0 7\n").await.unwrap(), "t 0 7");
        agent.shutdown().await;
    }

    #[tokio::test]
    async fn test_process_agent_reply_is_capped() {
        let mut agent = ProcessAgent::spawn("printf 'aaaaaaaaaaaaaaaa'; cat", None)
            .unwrap()
            .with_reply_limit(8);
        assert!(matches!(
            agent.exchange("t 0 7\n").await,
            Err(AgentError::Protocol(_))
        ));
        agent.shutdown().await;
    }

    #[tokio::test]
    async fn test_process_agent_exit_is_an_error() {
        let mut agent = ProcessAgent::spawn("exit 0", None).unwrap();
        assert!(agent.exchange("hello\n").await.is_err());
    }

    #[tokio::test]
    async fn test_process_agent_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.log");
        let mut agent = ProcessAgent::spawn("echo oops >&2; cat", Some(&path)).unwrap();
        assert_eq!(agent.exchange("ping\n").await.unwrap(), "ping");
        assert_eq!(agent.log_filename(), Some(path.display().to_string()));
        agent.shutdown().await;
        assert!(path.exists());
    }
}
