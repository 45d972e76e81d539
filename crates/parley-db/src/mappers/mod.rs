//! Row ↔ entity mappers

mod conversation;
mod message;
mod user;

pub use conversation::{kind_to_str, parse_kind};
pub use message::{content_type_to_str, parse_content_type};
pub use user::{parse_presence, presence_to_str};
