//! Gateway wire protocol
//!
//! Frames are plain tagged JSON. Inbound frames carry a `type` of `chat` or
//! `typing`; anything else is logged and ignored without closing the
//! connection. Outbound frames are serialized domain events whose `type`
//! names the event.

mod client_events;
mod close_codes;

pub use client_events::{ChatPayload, ClientEvent, TypingPayload};
pub use close_codes::CloseCode;
