use moonsla::config::load_settings;
use moonsla::error::Result;
use moonsla::feed::{
    ChannelList, ChannelPolicy, EventRouter, StreamEnd, TextFormatter, stdout_sink,
};
use moonsla::logging::{init_tracing, log_error};
use moonsla::slack::{EventStream, SlackClient};
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() {
    // Initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    init_tracing();

    if let Err(e) = run().await {
        log_error("moonsla", &e);
        if e.is_auth_failure() {
            tracing::error!("Invalid credentials");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing::info!("Starting moonsla");

    // Load configuration
    let settings = load_settings()?;
    tracing::info!("Configuration loaded");
    tracing::info!(whitelist = ?settings.feed.whitelist, "Channel whitelist");
    tracing::info!(blacklist = ?settings.feed.blacklist, "Channel blacklist");

    let policy = ChannelPolicy::new(
        ChannelList::new(settings.feed.whitelist.iter().cloned()),
        ChannelList::new(settings.feed.blacklist.iter().cloned()),
    );
    let formatter = TextFormatter::new(settings.feed.hyperlinks, settings.feed.max_lines);

    // Create Slack client
    let slack_client = Arc::new(SlackClient::new(settings.slack.clone())?);
    tracing::debug!("Slack client created");

    // The directory must be complete before any event is consumed
    let mut router = EventRouter::new(policy, formatter);
    router.load_directory(slack_client.as_ref()).await?;
    let (channels, users, dms) = router.directory().counts();
    tracing::info!(channels, users, dms, "Directory loaded");

    let mut events = EventStream::new(slack_client.clone()).spawn();
    let mut sink = stdout_sink(settings.feed.output);

    tokio::select! {
        result = router.run(&mut events, &mut sink) => {
            match result? {
                StreamEnd::AuthInvalid => tracing::info!("Stopped: credentials rejected"),
                StreamEnd::Closed => tracing::info!("Event stream ended"),
            }
            Ok(())
        }
        signal_name = shutdown_signal() => {
            let signal_name = signal_name?;
            tracing::info!(signal = %signal_name, "Received shutdown signal");
            Ok(())
        }
    }
}

/// Wait for SIGINT (Ctrl+C), SIGTERM or SIGQUIT
async fn shutdown_signal() -> Result<String> {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigquit = signal(SignalKind::quit())?;

        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT (Ctrl+C)",
            _ = sigterm.recv() => "SIGTERM",
            _ = sigquit.recv() => "SIGQUIT",
        };
        Ok(name.to_string())
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        Ok("Ctrl+C".to_string())
    }
}
