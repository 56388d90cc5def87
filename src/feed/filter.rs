//! Channel visibility policy

use crate::directory::Directory;
use std::collections::HashSet;

/// A set of channel names.
///
/// The single-element set `{""}` is the sentinel that means "no restriction"
/// for a whitelist and "no exclusions" for a blacklist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelList {
    names: HashSet<String>,
}

impl ChannelList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The `{""}` sentinel
    pub fn sentinel() -> Self {
        Self::new([""])
    }

    pub fn is_sentinel(&self) -> bool {
        self.names.len() == 1 && self.names.contains("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPolicy {
    pub whitelist: ChannelList,
    pub blacklist: ChannelList,
}

impl ChannelPolicy {
    pub fn new(whitelist: ChannelList, blacklist: ChannelList) -> Self {
        Self {
            whitelist,
            blacklist,
        }
    }

    /// Show every channel
    pub fn allow_all() -> Self {
        Self::new(ChannelList::sentinel(), ChannelList::sentinel())
    }
}

/// Outcome of filtering one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDecision<'a> {
    pub included: bool,
    pub display_name: &'a str,
}

/// Decide whether messages from `channel_id` are shown, and under what name.
///
/// Channels missing from the directory are always shown under their raw id.
/// For known channels the whitelist is consulted first (the sentinel admits
/// everything) and a blacklist hit then overrides it.
pub fn decide<'a>(
    channel_id: &'a str,
    directory: &'a Directory,
    policy: &ChannelPolicy,
) -> ChannelDecision<'a> {
    let Some(name) = directory.channel_name(channel_id) else {
        return ChannelDecision {
            included: true,
            display_name: channel_id,
        };
    };

    let whitelisted = policy.whitelist.is_sentinel() || policy.whitelist.contains(name);
    let blacklisted = !policy.blacklist.is_sentinel() && policy.blacklist.contains(name);

    ChannelDecision {
        included: whitelisted && !blacklisted,
        display_name: name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Directory {
        Directory::builder()
            .with_channel("12345", "channel-name")
            .with_channel("12344", "spam-channel")
            .build()
    }

    fn whitelist(names: &[&str]) -> ChannelPolicy {
        ChannelPolicy::new(ChannelList::new(names.iter().copied()), ChannelList::sentinel())
    }

    #[test]
    fn test_whitelisted_channel() {
        let dir = directory();
        let decision = decide("12345", &dir, &whitelist(&["channel-name"]));
        assert!(decision.included);
        assert_eq!(decision.display_name, "channel-name");
    }

    #[test]
    fn test_channel_not_whitelisted() {
        let dir = directory();
        let decision = decide("12344", &dir, &whitelist(&["channel-name"]));
        assert!(!decision.included);
        assert_eq!(decision.display_name, "spam-channel");
    }

    #[test]
    fn test_unknown_channel_always_included() {
        let dir = directory();
        let decision = decide("123", &dir, &whitelist(&["channel-name"]));
        assert!(decision.included);
        assert_eq!(decision.display_name, "123");

        let policy = ChannelPolicy::new(ChannelList::sentinel(), ChannelList::new(["123"]));
        assert!(decide("123", &dir, &policy).included);
    }

    #[test]
    fn test_sentinel_whitelist_allows_everything() {
        let dir = directory();
        let policy = ChannelPolicy::allow_all();
        assert!(decide("12345", &dir, &policy).included);
        assert!(decide("12344", &dir, &policy).included);
    }

    #[test]
    fn test_empty_whitelist_excludes_known_channels() {
        let dir = directory();
        let policy = ChannelPolicy::new(ChannelList::default(), ChannelList::sentinel());
        assert!(!decide("12345", &dir, &policy).included);
        assert!(decide("999", &dir, &policy).included);
    }

    #[test]
    fn test_blacklist_wins_over_whitelist() {
        let dir = directory();
        let policy = ChannelPolicy::new(
            ChannelList::new(["channel-name", "spam-channel"]),
            ChannelList::new(["spam-channel"]),
        );
        assert!(decide("12345", &dir, &policy).included);
        assert!(!decide("12344", &dir, &policy).included);

        let policy =
            ChannelPolicy::new(ChannelList::sentinel(), ChannelList::new(["spam-channel"]));
        assert!(!decide("12344", &dir, &policy).included);
    }

    #[test]
    fn test_sentinel_needs_single_empty_entry() {
        assert!(ChannelList::sentinel().is_sentinel());
        assert!(!ChannelList::new(["", "general"]).is_sentinel());
        assert!(!ChannelList::default().is_sentinel());
    }

    #[test]
    fn test_decision_is_repeatable() {
        let dir = directory();
        let policy = whitelist(&["channel-name"]);
        for id in ["12345", "12344", "123"] {
            assert_eq!(decide(id, &dir, &policy), decide(id, &dir, &policy));
        }
    }
}
