//! Immutable id → name snapshot used by the feed pipeline

use crate::directory::types::{DirectoryEntry, ImChannel};
use std::collections::HashMap;

/// Point-in-time mapping from Slack identifiers to display names.
///
/// Built once before streaming starts and never mutated afterwards, so it can
/// be shared by reference without locking. All `resolve_*` lookups are total:
/// a miss hands back the identifier that was asked for.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    channels: HashMap<String, String>,
    users: HashMap<String, String>,
    dms: HashMap<String, String>,
}

impl Directory {
    pub fn builder() -> DirectoryBuilder {
        DirectoryBuilder::default()
    }

    /// Channel name, if the channel is known
    pub fn channel_name(&self, id: &str) -> Option<&str> {
        self.channels.get(id).map(String::as_str)
    }

    /// User display name, if the user is known
    pub fn user_name(&self, id: &str) -> Option<&str> {
        self.users.get(id).map(String::as_str)
    }

    /// Channel name, or the id itself when unknown
    pub fn resolve_channel<'a>(&'a self, id: &'a str) -> &'a str {
        self.channel_name(id).unwrap_or(id)
    }

    /// User display name, or the id itself when unknown
    pub fn resolve_user<'a>(&'a self, id: &'a str) -> &'a str {
        self.user_name(id).unwrap_or(id)
    }

    /// Peer display name when `id` is a direct-message channel
    pub fn resolve_dm(&self, id: &str) -> Option<&str> {
        self.dms.get(id).map(String::as_str)
    }

    /// Sizes as (channels, users, dms)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.channels.len(), self.users.len(), self.dms.len())
    }
}

/// Accumulates listing pages before freezing them into a [`Directory`]
#[derive(Debug, Default)]
pub struct DirectoryBuilder {
    channels: HashMap<String, String>,
    users: HashMap<String, String>,
    ims: Vec<ImChannel>,
}

impl DirectoryBuilder {
    pub fn extend_channels(&mut self, entries: impl IntoIterator<Item = DirectoryEntry>) {
        for entry in entries {
            self.channels.insert(entry.id, entry.display_name);
        }
    }

    pub fn extend_users(&mut self, entries: impl IntoIterator<Item = DirectoryEntry>) {
        for entry in entries {
            self.users.insert(entry.id, entry.display_name);
        }
    }

    pub fn extend_ims(&mut self, ims: impl IntoIterator<Item = ImChannel>) {
        self.ims.extend(ims);
    }

    pub fn with_channel(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.extend_channels([DirectoryEntry::new(id, name)]);
        self
    }

    pub fn with_user(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.extend_users([DirectoryEntry::new(id, name)]);
        self
    }

    pub fn with_dm(mut self, channel_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.extend_ims([ImChannel::new(channel_id, user_id)]);
        self
    }

    /// Freeze the collected maps.
    ///
    /// DM peers are named through the user map; a peer missing from it keeps
    /// its raw user id.
    pub fn build(self) -> Directory {
        let dms = self
            .ims
            .into_iter()
            .map(|im| {
                let peer = self
                    .users
                    .get(&im.user_id)
                    .cloned()
                    .unwrap_or(im.user_id);
                (im.channel_id, peer)
            })
            .collect();

        Directory {
            channels: self.channels,
            users: self.users,
            dms,
        }
    }
}
