// SPDX-License-Identifier: MIT

//! Getting the word out: message transports, contact routing and the
//! [`Dispatcher`] deciding what to send to whom.

mod contacts;
mod dispatcher;
mod transport;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use async_trait::async_trait;
use dirhealth_suppression::error::StoreError;
use snafu::{Location, Snafu};

pub use self::contacts::{ContactBook, Destination};
pub use self::dispatcher::{DispatchOutcome, Dispatcher, Recipients};
#[cfg(any(test, feature = "test-util"))]
pub use self::transport::RecordingNotifier;
pub use self::transport::{SendmailNotifier, StdoutNotifier};

const LOG_TARGET: &str = "dirhealth::notify";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NotifyError {
    #[snafu(display("Message has no recipients"))]
    NoRecipients {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Failed to run {}", program.display()))]
    Spawn {
        program: PathBuf,
        source: io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Failed to hand the message to {}", program.display()))]
    Pipe {
        program: PathBuf,
        source: io::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("{} exited with {status}", program.display()))]
    Exited {
        program: PathBuf,
        status: ExitStatus,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Transport failed: {reason}"))]
    Transport {
        reason: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Failed to record sent issues"))]
    Suppression {
        source: StoreError,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type NotifyResult<T> = std::result::Result<T, NotifyError>;

/// A plain text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub body: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

impl Message {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            to: vec![],
            cc: vec![],
            bcc: vec![],
        }
    }

    pub fn to(mut self, to: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.to.extend(to.into_iter().map(Into::into));
        self
    }

    pub fn cc(mut self, cc: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.cc.extend(cc.into_iter().map(Into::into));
        self
    }

    pub fn bcc(mut self, bcc: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.bcc.extend(bcc.into_iter().map(Into::into));
        self
    }

    pub fn has_recipients(&self) -> bool {
        !(self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty())
    }

    /// The message in internet message format, ready for `sendmail -t`
    pub fn format_with_from(&self, from: &str) -> String {
        MessageFormat {
            message: self,
            from,
        }
        .to_string()
    }
}

struct MessageFormat<'m> {
    message: &'m Message,
    from: &'m str,
}

impl fmt::Display for MessageFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message;
        writeln!(f, "From: {}", self.from)?;
        for (header, addresses) in [
            ("To", &message.to),
            ("Cc", &message.cc),
            ("Bcc", &message.bcc),
        ] {
            if !addresses.is_empty() {
                writeln!(f, "{header}: {}", addresses.join(", "))?;
            }
        }
        writeln!(f, "Subject: {}", message.subject)?;
        writeln!(f, "Content-Type: text/plain; charset=utf-8")?;
        writeln!(f)?;
        writeln!(f, "{}", message.body)
    }
}

/// Outbound message transport
///
/// Failing to deliver is an error the caller has to handle, never silently
/// ignored.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &Message) -> NotifyResult<()>;
}

#[async_trait]
impl<N> Notifier for std::sync::Arc<N>
where
    N: Notifier + ?Sized,
{
    async fn send(&self, message: &Message) -> NotifyResult<()> {
        (**self).send(message).await
    }
}
