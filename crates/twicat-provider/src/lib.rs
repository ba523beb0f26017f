//! twicat-provider: Twilio REST client
//!
//! Lists the account's SMS-capable numbers and points a number's SMS
//! webhook at a callback URL.

pub mod client;
pub mod error;
pub mod types;

pub use client::ProviderClient;
pub use error::{ProviderError, Result};
pub use types::{PhoneNumber, capable_numbers};
