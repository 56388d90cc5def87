//! Event-to-display pipeline
//!
//! Messages flow through channel filtering, text formatting and timestamp
//! conversion before being handed to a [`LineSink`].

mod filter;
mod format;
mod render;
mod router;
mod timestamp;
mod types;

pub use filter::{ChannelDecision, ChannelList, ChannelPolicy, decide};
pub use format::{
    TextFormatter, flatten_attachments, format_links, hyperlink, substitute_mentions, truncate,
};
pub use render::{JsonSink, LineSink, TerminalSink, stdout_sink};
pub use router::{EventRouter, RouterState, StreamEnd};
pub use timestamp::{TimeOfDay, TimestampError, parse_timestamp, parse_timestamp_in};
pub use types::{Attachment, FeedEvent, InboundMessage, RenderedLine};
