//! Incoming message type and output sinks

use std::fmt;

use crate::form::FormValues;

/// SMS delivered by the provider's webhook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingMessage {
    pub from: String,
    pub body: String,
}

impl IncomingMessage {
    /// Take the first `From` and `Body` values. Missing fields are empty.
    pub fn from_form(form: &FormValues) -> Self {
        Self {
            from: form.first("From").unwrap_or_default().to_string(),
            body: form.first("Body").unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for IncomingMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.from, self.body)
    }
}

/// Destination for received messages
pub trait MessageSink: Send + Sync {
    /// Called once per successfully parsed callback
    fn message(&self, message: &IncomingMessage);

    /// Called when a callback body could not be parsed
    fn malformed(&self) {}
}

/// Prints each message as a single `"<From> <Body>"` line on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl MessageSink for StdoutSink {
    fn message(&self, message: &IncomingMessage) {
        println!("{}", message);
    }

    fn malformed(&self) {
        println!("Received a message but couldn't parse body");
    }
}
