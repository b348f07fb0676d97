use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use snafu::{ResultExt as _, ensure};
use tokio::io::AsyncWriteExt as _;
use tracing::{debug, info};

use crate::{
    ExitedSnafu, LOG_TARGET, Message, NoRecipientsSnafu, Notifier, NotifyResult, PipeSnafu,
    SpawnSnafu,
};

/// Hands messages to the local MTA via `sendmail -t`
#[derive(Debug, Clone)]
pub struct SendmailNotifier {
    program: PathBuf,
    from: String,
}

impl SendmailNotifier {
    pub fn new(program: impl Into<PathBuf>, from: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            from: from.into(),
        }
    }
}

#[async_trait]
impl Notifier for SendmailNotifier {
    async fn send(&self, message: &Message) -> NotifyResult<()> {
        ensure!(message.has_recipients(), NoRecipientsSnafu);

        let program = &self.program;
        debug!(
            target: LOG_TARGET,
            program = %program.display(),
            subject = %message.subject,
            "Sending message"
        );

        let mut child = tokio::process::Command::new(program)
            .arg("-t")
            .arg("-oi")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .context(SpawnSnafu { program })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(message.format_with_from(&self.from).as_bytes())
                .await
                .context(PipeSnafu { program })?;
            stdin.shutdown().await.context(PipeSnafu { program })?;
        }

        let status = child.wait().await.context(PipeSnafu { program })?;
        ensure!(status.success(), ExitedSnafu { program, status });

        Ok(())
    }
}

/// Prints messages instead of sending them, for dry runs
#[derive(Debug, Clone, Default)]
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn send(&self, message: &Message) -> NotifyResult<()> {
        info!(target: LOG_TARGET, subject = %message.subject, "Dry run, printing message");
        println!("{}", message.format_with_from("dry-run"));
        Ok(())
    }
}

/// Keeps every message it's asked to send, optionally failing instead
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: std::sync::Arc<std::sync::Mutex<Vec<Message>>>,
    failing: bool,
}

#[cfg(any(test, feature = "test-util"))]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every send fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().expect("Locking failed").clone()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &Message) -> NotifyResult<()> {
        if self.failing {
            return crate::TransportSnafu {
                reason: "recording notifier set to fail",
            }
            .fail();
        }
        self.sent.lock().expect("Locking failed").push(message.clone());
        Ok(())
    }
}
