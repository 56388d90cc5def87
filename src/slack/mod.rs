mod client;
mod events;
mod types;

pub use client::SlackClient;
pub use events::EventStream;
pub use types::{ChannelId, MessageTs, UserId};
