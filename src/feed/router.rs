use crate::directory::{Directory, DirectorySource, load_directory};
use crate::error::{MoonslaError, Result};
use crate::feed::filter::{ChannelPolicy, decide};
use crate::feed::format::TextFormatter;
use crate::feed::render::LineSink;
use crate::feed::timestamp::{TimeOfDay, parse_timestamp};
use crate::feed::types::{FeedEvent, InboundMessage, RenderedLine};
use crate::logging::log_error;
use std::ops::ControlFlow;
use tokio::sync::mpsc::UnboundedReceiver;

/// Lifecycle of a feed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// Directory not loaded yet
    Idle,
    /// Directory loaded, stream not consumed yet
    Ready,
    /// Consuming events
    Streaming,
    /// Stopped; no further events are read
    Terminated,
}

/// Why streaming stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    AuthInvalid,
    /// The transport went away
    Closed,
}

/// Consumes feed events in arrival order and turns messages into lines
pub struct EventRouter {
    state: RouterState,
    directory: Directory,
    policy: ChannelPolicy,
    formatter: TextFormatter,
}

impl EventRouter {
    pub fn new(policy: ChannelPolicy, formatter: TextFormatter) -> Self {
        Self {
            state: RouterState::Idle,
            directory: Directory::default(),
            policy,
            formatter,
        }
    }

    /// Router over an already loaded directory
    pub fn with_directory(
        directory: Directory,
        policy: ChannelPolicy,
        formatter: TextFormatter,
    ) -> Self {
        Self {
            state: RouterState::Ready,
            directory,
            policy,
            formatter,
        }
    }

    pub fn state(&self) -> RouterState {
        self.state
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Load the directory snapshot; moves `Idle` to `Ready`
    pub async fn load_directory<S: DirectorySource>(&mut self, source: &S) -> Result<()> {
        if self.state != RouterState::Idle {
            return Err(MoonslaError::Internal(format!(
                "directory can only be loaded once (state: {:?})",
                self.state
            )));
        }

        self.directory = load_directory(source).await?;
        self.state = RouterState::Ready;
        Ok(())
    }

    /// Consume events until the credential is rejected or the stream closes
    pub async fn run<K: LineSink + ?Sized>(
        &mut self,
        events: &mut UnboundedReceiver<FeedEvent>,
        sink: &mut K,
    ) -> Result<StreamEnd> {
        if self.state != RouterState::Ready {
            return Err(MoonslaError::Internal(format!(
                "router cannot start streaming from {:?}",
                self.state
            )));
        }
        self.state = RouterState::Streaming;
        tracing::info!("Streaming messages");

        while let Some(event) = events.recv().await {
            if let ControlFlow::Break(end) = self.handle_event(event, sink)? {
                return Ok(end);
            }
        }

        tracing::info!("Event stream closed");
        self.state = RouterState::Terminated;
        Ok(StreamEnd::Closed)
    }

    /// Process a single event
    pub fn handle_event<K: LineSink + ?Sized>(
        &mut self,
        event: FeedEvent,
        sink: &mut K,
    ) -> Result<ControlFlow<StreamEnd>> {
        match event {
            FeedEvent::Message(message) => {
                if let Some(line) = self.render(&message) {
                    sink.emit(&line)?;
                }
            }
            FeedEvent::TransportError(error) => {
                log_error("event_stream", &MoonslaError::SlackApi(error));
            }
            FeedEvent::AuthInvalid => {
                tracing::error!("Invalid credentials");
                self.state = RouterState::Terminated;
                return Ok(ControlFlow::Break(StreamEnd::AuthInvalid));
            }
            FeedEvent::Other(kind) => {
                tracing::trace!(event_type = kind, "Ignoring event");
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Build the output line for a message, or `None` when it is not shown
    pub fn render(&self, message: &InboundMessage) -> Option<RenderedLine> {
        let channel_id = message.channel.as_str();
        let decision = decide(channel_id, &self.directory, &self.policy);
        if !decision.included {
            tracing::trace!(
                channel_id = %channel_id,
                channel = %decision.display_name,
                "Channel filtered out"
            );
            return None;
        }

        let user = message
            .username
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.directory.resolve_user(message.user.as_str()));

        let (channel, is_direct_message) = match self.directory.resolve_dm(channel_id) {
            Some(peer) => (peer, true),
            None => (decision.display_name, false),
        };

        let time = parse_timestamp(message.ts.as_str()).unwrap_or_else(|e| {
            tracing::debug!(ts = %message.ts.as_str(), error = %e, "Unreadable timestamp");
            TimeOfDay::fallback()
        });

        let text = self.formatter.display_text(message, &self.directory)?;

        Some(RenderedLine {
            time,
            channel: channel.to_string(),
            user: user.to_string(),
            text,
            is_direct_message,
        })
    }
}
