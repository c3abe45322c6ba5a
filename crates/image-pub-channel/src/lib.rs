//! Outbound channel clients
//!
//! A channel client delivers one image file to an external messaging
//! channel. The publisher only depends on the three-way outcome of a send:
//! delivered, rejected (the content is the problem) or a fatal error
//! (transport, authentication, configuration).
//!
//! `TelegramChannel` implements the contract against the Telegram Bot API.

pub mod client;
pub mod error;
pub mod telegram;

pub use client::{ChannelClient, Delivery};
pub use error::{ChannelError, ChannelResult};
pub use telegram::{TelegramChannel, TelegramConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
