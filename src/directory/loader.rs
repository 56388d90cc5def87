//! Paginated directory loading

use crate::directory::snapshot::{Directory, DirectoryBuilder};
use crate::directory::types::{DirectoryEntry, ImChannel, Page};
use crate::error::{MoonslaError, Result};
use crate::logging::Timer;
use std::future::Future;

/// Remote listings the directory is built from.
///
/// Each call returns one page; passing the previous page's cursor fetches
/// the next one.
pub trait DirectorySource {
    fn list_channels(
        &self,
        cursor: Option<String>,
    ) -> impl Future<Output = Result<Page<DirectoryEntry>>> + Send;

    fn list_users(
        &self,
        cursor: Option<String>,
    ) -> impl Future<Output = Result<Page<DirectoryEntry>>> + Send;

    fn list_ims(&self, cursor: Option<String>)
    -> impl Future<Output = Result<Page<ImChannel>>> + Send;
}

/// Fetch every page of a listing, one after another
async fn collect_pages<T, F, Fut>(listing: &str, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages = 0usize;

    loop {
        let page = fetch(cursor.take()).await.map_err(|e| {
            MoonslaError::Directory(format!("{listing} listing failed on page {}: {e}", pages + 1))
        })?;
        pages += 1;

        tracing::debug!(
            listing = listing,
            page = pages,
            items = page.items.len(),
            has_more = page.next_cursor.is_some(),
            "Fetched listing page"
        );

        items.extend(page.items);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(items)
}

/// Build the session directory from a source.
///
/// Must finish before streaming starts; any listing failure is fatal.
pub async fn load_directory<S: DirectorySource>(source: &S) -> Result<Directory> {
    let _timer = Timer::new("load_directory");
    let mut builder = DirectoryBuilder::default();

    let channels = collect_pages("channels", |cursor| source.list_channels(cursor)).await?;
    tracing::info!(count = channels.len(), "Found channels");
    builder.extend_channels(channels);

    let users = collect_pages("users", |cursor| source.list_users(cursor)).await?;
    tracing::info!(count = users.len(), "Found users");
    builder.extend_users(users);

    let ims = collect_pages("ims", |cursor| source.list_ims(cursor)).await?;
    tracing::info!(count = ims.len(), "Found DMs");
    builder.extend_ims(ims);

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory listings split into fixed-size pages
    #[derive(Default)]
    struct FakeSource {
        channels: Vec<Vec<DirectoryEntry>>,
        users: Vec<Vec<DirectoryEntry>>,
        ims: Vec<Vec<ImChannel>>,
        fail_users: bool,
        seen_cursors: Mutex<Vec<Option<String>>>,
    }

    impl FakeSource {
        fn page<T: Clone>(&self, pages: &[Vec<T>], cursor: Option<String>) -> Page<T> {
            self.seen_cursors.lock().unwrap().push(cursor.clone());
            let index: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
            let items = pages.get(index).cloned().unwrap_or_default();
            let next = (index + 1 < pages.len()).then(|| (index + 1).to_string());
            Page::new(items, next)
        }
    }

    impl DirectorySource for FakeSource {
        async fn list_channels(&self, cursor: Option<String>) -> Result<Page<DirectoryEntry>> {
            Ok(self.page(&self.channels, cursor))
        }

        async fn list_users(&self, cursor: Option<String>) -> Result<Page<DirectoryEntry>> {
            if self.fail_users {
                return Err(MoonslaError::SlackApi("invalid_auth".to_string()));
            }
            Ok(self.page(&self.users, cursor))
        }

        async fn list_ims(&self, cursor: Option<String>) -> Result<Page<ImChannel>> {
            Ok(self.page(&self.ims, cursor))
        }
    }

    #[test]
    fn test_load_follows_cursors_until_exhausted() {
        let source = FakeSource {
            channels: vec![
                vec![DirectoryEntry::new("C1", "general")],
                vec![DirectoryEntry::new("C2", "random")],
                vec![DirectoryEntry::new("C3", "rust")],
            ],
            users: vec![vec![DirectoryEntry::new("U1", "Ada Lovelace")]],
            ims: vec![vec![ImChannel::new("D1", "U1")]],
            ..Default::default()
        };

        let dir = tokio_test::block_on(load_directory(&source)).unwrap();

        assert_eq!(dir.counts(), (3, 1, 1));
        assert_eq!(dir.resolve_channel("C3"), "rust");
        assert_eq!(dir.resolve_dm("D1"), Some("Ada Lovelace"));

        let cursors = source.seen_cursors.lock().unwrap().clone();
        assert_eq!(
            &cursors[..3],
            &[None, Some("1".to_string()), Some("2".to_string())]
        );
    }

    #[test]
    fn test_listing_failure_is_fatal() {
        let source = FakeSource {
            channels: vec![vec![DirectoryEntry::new("C1", "general")]],
            fail_users: true,
            ..Default::default()
        };

        let err = tokio_test::block_on(load_directory(&source)).unwrap_err();
        assert!(matches!(err, MoonslaError::Directory(_)));
        assert!(err.is_auth_failure());
    }
}
