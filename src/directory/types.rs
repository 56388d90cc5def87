//! Directory listing types

use serde::{Deserialize, Serialize};

/// A single id → display name pair from a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Platform identifier (e.g., C09NU1KFXHT, U09JDBT2MCM)
    pub id: String,

    /// Human-readable name (channel name or user display name)
    pub display_name: String,
}

impl DirectoryEntry {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A direct-message channel and the user on the other side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImChannel {
    /// DM channel id (e.g., D024BE91L)
    pub channel_id: String,

    /// Peer user id
    pub user_id: String,
}

impl ImChannel {
    pub fn new(channel_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// One page of a cursor-based listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Continuation token; `None` when this is the last page
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        // Slack signals the last page with an empty cursor string
        let next_cursor = next_cursor.filter(|c| !c.trim().is_empty());
        Self { items, next_cursor }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cursor_means_last_page() {
        let page = Page::new(vec![DirectoryEntry::new("C1", "general")], Some(String::new()));
        assert!(page.next_cursor.is_none());

        let page: Page<ImChannel> = Page::new(vec![], Some("  ".to_string()));
        assert!(page.next_cursor.is_none());

        let page: Page<ImChannel> = Page::new(vec![], Some("dGVhbTpDMDYx".to_string()));
        assert_eq!(page.next_cursor.as_deref(), Some("dGVhbTpDMDYx"));
    }
}
