use crate::error::is_auth_failure_message;
use crate::feed::{Attachment, FeedEvent, InboundMessage};
use crate::slack::{ChannelId, MessageTs, SlackClient, UserId};
use slack_morphism::prelude::*;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Clone)]
struct StreamState {
    events_tx: UnboundedSender<FeedEvent>,
}

impl StreamState {
    fn report(&self, error: String) {
        let event = if is_auth_failure_message(&error) {
            FeedEvent::AuthInvalid
        } else {
            FeedEvent::TransportError(error)
        };
        // Receiver gone means the router already stopped
        let _ = self.events_tx.send(event);
    }
}

/// Socket Mode connection feeding [`FeedEvent`]s into an unbounded channel.
///
/// The listener owns handshake, keep-alive and reconnects. It only ever sends
/// events and never touches directory or policy state.
pub struct EventStream {
    slack_client: Arc<SlackClient>,
}

impl EventStream {
    pub fn new(slack_client: Arc<SlackClient>) -> Self {
        Self { slack_client }
    }

    /// Start the listener in a background task and return the event receiver.
    ///
    /// The receiver yields `None` once the listener has stopped.
    pub fn spawn(self) -> UnboundedReceiver<FeedEvent> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        tokio::spawn(self.serve(events_tx));
        events_rx
    }

    async fn serve(self, events_tx: UnboundedSender<FeedEvent>) {
        let state = StreamState { events_tx };

        tracing::debug!("Creating listener environment");
        let listener_environment = Arc::new(
            SlackClientEventsListenerEnvironment::new(self.slack_client.get_client())
                .with_error_handler(Self::error_handler)
                .with_user_state(state.clone()),
        );

        let callbacks =
            SlackSocketModeListenerCallbacks::new().with_push_events(Self::handle_push_event);

        let socket_mode_listener = SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment,
            callbacks,
        );

        tracing::info!("Connecting to Slack via Socket Mode");
        if let Err(e) = socket_mode_listener
            .listen_for(self.slack_client.get_app_token())
            .await
        {
            tracing::error!(error = %e, "Failed to connect to Slack Socket Mode");
            state.report(e.to_string());
            return;
        }

        tracing::info!("Connected to Slack Socket Mode");
        let exit_code = socket_mode_listener.serve().await;
        tracing::info!(exit_code = exit_code, "Socket Mode listener stopped");
    }

    async fn handle_push_event(
        event: SlackPushEventCallback,
        _client: Arc<SlackHyperClient>,
        user_state: SlackClientEventsUserState,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let state = {
            let storage = user_state.read().await;
            storage
                .get_user_state::<StreamState>()
                .cloned()
                .ok_or("stream state not set")?
        };

        let feed_event = to_feed_event(event.event);
        if let FeedEvent::Other(kind) = &feed_event {
            tracing::trace!(event_type = *kind, "Received push event");
        }

        // Sending in the callback keeps arrival order
        let _ = state.events_tx.send(feed_event);
        Ok(())
    }

    fn error_handler(
        err: Box<dyn std::error::Error + Send + Sync>,
        _client: Arc<SlackHyperClient>,
        states: SlackClientEventsUserState,
    ) -> HttpStatusCode {
        tracing::warn!(
            error = %err,
            error_kind = std::any::type_name_of_val(&*err),
            "Slack event error"
        );

        forward_error(states, err.to_string());
        HttpStatusCode::OK
    }
}

/// Hand a listener error to the router.
///
/// The error handler cannot await, so when the state lock is held the report
/// moves to a task that waits for it.
fn forward_error(states: SlackClientEventsUserState, error: String) {
    if let Ok(storage) = states.try_read() {
        if let Some(state) = storage.get_user_state::<StreamState>() {
            state.report(error);
        }
        return;
    }

    tracing::debug!("Stream state busy, forwarding error later");
    tokio::spawn(async move {
        let storage = states.read().await;
        match storage.get_user_state::<StreamState>() {
            Some(state) => state.report(error),
            None => tracing::warn!(error = %error, "Stream state not set, error dropped"),
        }
    });
}

/// Classify a push event body
fn to_feed_event(body: SlackEventCallbackBody) -> FeedEvent {
    match body {
        SlackEventCallbackBody::Message(message) => FeedEvent::Message(to_inbound(message)),
        SlackEventCallbackBody::AppMention(_) => FeedEvent::Other("app_mention"),
        _ => FeedEvent::Other("other"),
    }
}

fn to_inbound(message: SlackMessageEvent) -> InboundMessage {
    let channel = message
        .origin
        .channel
        .map(|c| c.to_string())
        .unwrap_or_default();

    // Bot posts carry a bot id instead of a user id
    let user = message
        .sender
        .user
        .map(|u| u.to_string())
        .or_else(|| message.sender.bot_id.map(|b| b.to_string()))
        .unwrap_or_default();

    let (text, attachments) = match message.content {
        Some(content) => (
            content.text.unwrap_or_default(),
            content
                .attachments
                .unwrap_or_default()
                .into_iter()
                .map(|a| Attachment {
                    title: a.title,
                    text: a.text.unwrap_or_default(),
                })
                .collect(),
        ),
        None => (String::new(), Vec::new()),
    };

    InboundMessage {
        channel: ChannelId::new(channel),
        user: UserId::new(user),
        username: message.sender.username,
        text,
        attachments,
        ts: MessageTs::new(message.origin.ts.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> SlackEventCallbackBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_message_event_to_inbound() {
        let body = parse(json!({
            "type": "message",
            "channel": "C123",
            "user": "U456",
            "text": "hello <@U789>",
            "ts": "1530593277.000080"
        }));

        let FeedEvent::Message(message) = to_feed_event(body) else {
            panic!("expected a message event");
        };
        assert_eq!(message.channel.as_str(), "C123");
        assert_eq!(message.user.as_str(), "U456");
        assert_eq!(message.text, "hello <@U789>");
        assert_eq!(message.ts.as_str(), "1530593277.000080");
        assert!(message.username.is_none());
        assert!(message.attachments.is_empty());
    }

    #[test]
    fn test_bot_message_with_attachments() {
        let body = parse(json!({
            "type": "message",
            "subtype": "bot_message",
            "channel": "C123",
            "bot_id": "B001",
            "username": "ci",
            "text": "",
            "attachments": [
                { "id": 1, "text": "build passed" },
                { "id": 2, "title": "Coverage", "text": "87%" }
            ],
            "ts": "1530593277.000080"
        }));

        let FeedEvent::Message(message) = to_feed_event(body) else {
            panic!("expected a message event");
        };
        assert_eq!(message.user.as_str(), "B001");
        assert_eq!(message.username.as_deref(), Some("ci"));
        assert_eq!(
            message.attachments,
            vec![
                Attachment::new(None, "build passed"),
                Attachment::new(Some("Coverage"), "87%"),
            ]
        );
    }

    fn stream_state() -> (StreamState, UnboundedReceiver<FeedEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (StreamState { events_tx }, events_rx)
    }

    #[test]
    fn test_report_classifies_listener_errors() {
        let (state, mut events) = stream_state();

        state.report("Slack API error: invalid_auth".to_string());
        state.report("connection reset by peer".to_string());
        state.report("token_revoked".to_string());

        assert!(matches!(events.try_recv(), Ok(FeedEvent::AuthInvalid)));
        match events.try_recv() {
            Ok(FeedEvent::TransportError(error)) => {
                assert_eq!(error, "connection reset by peer")
            }
            other => panic!("expected a transport error, got {other:?}"),
        }
        assert!(matches!(events.try_recv(), Ok(FeedEvent::AuthInvalid)));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_report_after_router_stopped() {
        let (state, events) = stream_state();
        drop(events);
        state.report("invalid_auth".to_string());
    }

    #[tokio::test]
    async fn test_forward_error_while_state_locked() {
        let (state, mut events) = stream_state();
        let states = SlackClientEventsUserState::new(SlackClientEventsUserStateStorage::new());
        states.write().await.set_user_state(state);

        let guard = states.write().await;
        forward_error(states.clone(), "not_authed".to_string());
        assert!(events.try_recv().is_err());
        drop(guard);

        assert!(matches!(events.recv().await, Some(FeedEvent::AuthInvalid)));
    }

    #[tokio::test]
    async fn test_forward_error_unlocked_is_immediate() {
        let (state, mut events) = stream_state();
        let states = SlackClientEventsUserState::new(SlackClientEventsUserStateStorage::new());
        states.write().await.set_user_state(state);

        forward_error(states, "ratelimited".to_string());
        assert!(matches!(
            events.try_recv(),
            Ok(FeedEvent::TransportError(error)) if error == "ratelimited"
        ));
    }
}
