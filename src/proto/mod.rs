//! IRC wire types: outbound message construction and name validation.

mod message;
mod response;
mod valid;

pub use message::{Message, Prefix};
pub use response::Response;
pub use valid::{is_valid_channel_name, is_valid_nick};
