//! twicat-webhook: callback listener for incoming SMS
//!
//! Binds an OS-assigned port, accepts the provider's form-encoded webhook
//! and hands each message to a [`MessageSink`].

pub mod error;
pub mod form;
pub mod server;
pub mod sink;

pub use error::{FormError, Result, WebhookError};
pub use form::FormValues;
pub use server::CallbackListener;
pub use sink::{IncomingMessage, MessageSink, StdoutSink};
