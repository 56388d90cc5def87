use crate::feed::timestamp::TimeOfDay;
use crate::slack::{ChannelId, MessageTs, UserId};
use serde::Serialize;

/// Attachment carried by a message (bot posts, unfurls, integrations)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    pub title: Option<String>,
    pub text: String,
}

impl Attachment {
    pub fn new(title: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            title: title.map(str::to_string),
            text: text.into(),
        }
    }
}

/// A message event as delivered by the transport
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel: ChannelId,
    pub user: UserId,
    /// Display name set on the event itself (bots, integrations)
    pub username: Option<String>,
    pub text: String,
    pub attachments: Vec<Attachment>,
    pub ts: MessageTs,
}

/// One accepted message, ready for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedLine {
    pub time: TimeOfDay,
    pub channel: String,
    pub user: String,
    pub text: String,
    pub is_direct_message: bool,
}

/// Everything the transport can hand to the router
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Message(InboundMessage),
    /// Recoverable connection problem; streaming continues
    TransportError(String),
    /// The credential was rejected; the session is over
    AuthInvalid,
    /// Any other event kind, identified by name
    Other(&'static str),
}
