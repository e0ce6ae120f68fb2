//! Outgoing email.

use crate::Error;

/// A plain text email.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// The recipient's address.
    pub to: String,
    /// The subject line.
    pub subject: String,
    /// The plain text body.
    pub text: String,
}

/// Something that can deliver emails.
pub trait Mailer: Send + Sync {
    /// Hand `message` off for delivery.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmailError] if the message could not be accepted.
    fn send(&self, message: Message) -> Result<(), Error>;
}

/// A mailer that writes messages to the log instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: Message) -> Result<(), Error> {
        tracing::info!(to = %message.to, subject = %message.subject, "{}", message.text);

        Ok(())
    }
}

#[cfg(test)]
pub use recording::RecordingMailer;

#[cfg(test)]
mod recording {
    use std::sync::{Arc, Mutex};

    use crate::Error;

    use super::{Mailer, Message};

    /// A mailer that keeps every message so tests can read them back.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingMailer {
        sent: Arc<Mutex<Vec<Message>>>,
    }

    impl RecordingMailer {
        pub fn sent(&self) -> Vec<Message> {
            self.sent.lock().unwrap().clone()
        }

        /// The verification token in the most recent message sent to `to`.
        pub fn last_token_for(&self, to: &str) -> Option<String> {
            self.sent()
                .into_iter()
                .rev()
                .find(|message| message.to == to)
                .and_then(|message| {
                    message
                        .text
                        .split_whitespace()
                        .find_map(|word| word.split("/verify-email/").nth(1).map(str::to_owned))
                })
        }
    }

    impl Mailer for RecordingMailer {
        fn send(&self, message: Message) -> Result<(), Error> {
            self.sent
                .lock()
                .map_err(|_| Error::EmailError("mailbox lock poisoned".to_owned()))?
                .push(message);

            Ok(())
        }
    }
}
