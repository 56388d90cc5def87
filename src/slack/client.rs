use crate::config::SlackConfig;
use crate::directory::{DirectoryEntry, DirectorySource, ImChannel, Page};
use crate::error::{MoonslaError, Result};
use slack_morphism::prelude::*;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Page size requested from the listing endpoints
const PAGE_LIMIT: u16 = 200;

/// A DM has the token owner and at most one peer
const IM_MEMBER_LIMIT: u16 = 2;

pub struct SlackClient {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
    app_token: SlackApiToken,
    /// User id the web token belongs to, looked up once via `auth.test`
    own_user_id: OnceCell<String>,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| MoonslaError::SlackApi(e.to_string()))?;

        let client = Arc::new(slack_morphism::SlackClient::new(connector));
        let token = SlackApiToken::new(config.token.into());
        let app_token = SlackApiToken::new(config.app_token.into());

        Ok(Self {
            client,
            token,
            app_token,
            own_user_id: OnceCell::new(),
        })
    }

    pub fn get_client(&self) -> Arc<SlackHyperClient> {
        self.client.clone()
    }

    pub fn get_app_token(&self) -> &SlackApiToken {
        &self.app_token
    }

    /// One page of public and private channels, archived ones excluded
    pub async fn list_channels_page(&self, cursor: Option<String>) -> Result<Page<DirectoryEntry>> {
        let response = self
            .conversations_page(
                cursor,
                vec![SlackConversationType::Public, SlackConversationType::Private],
            )
            .await?;

        let entries = response
            .channels
            .into_iter()
            .map(|c| {
                let id = c.id.to_string();
                let name = c
                    .name_normalized
                    .or(c.name)
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| id.clone());
                DirectoryEntry::new(id, name)
            })
            .collect();

        Ok(Page::new(entries, next_cursor(response.response_metadata)))
    }

    /// One page of direct-message channels with their peer user
    ///
    /// `conversations.list` does not carry the peer, so each DM's members are
    /// fetched and the one that is not the token owner is kept.
    pub async fn list_im_page(&self, cursor: Option<String>) -> Result<Page<ImChannel>> {
        let response = self
            .conversations_page(cursor, vec![SlackConversationType::Im])
            .await?;
        let own_user_id = self.own_user_id().await?;

        let mut ims = Vec::with_capacity(response.channels.len());
        for channel in response.channels {
            let members = self.im_members(&channel.id).await?;
            match im_peer(&members, own_user_id) {
                Some(peer) => ims.push(ImChannel::new(channel.id.to_string(), peer)),
                None => tracing::debug!(channel_id = %channel.id, "DM without members skipped"),
            }
        }

        Ok(Page::new(ims, next_cursor(response.response_metadata)))
    }

    async fn own_user_id(&self) -> Result<&str> {
        let id = self
            .own_user_id
            .get_or_try_init(|| async {
                let session = self.client.open_session(&self.token);
                let response = session
                    .auth_test()
                    .await
                    .map_err(|e| MoonslaError::SlackApi(e.to_string()))?;
                tracing::debug!(user_id = %response.user_id, "Token owner resolved");
                Ok::<_, MoonslaError>(response.user_id.to_string())
            })
            .await?;
        Ok(id)
    }

    async fn im_members(&self, channel: &SlackChannelId) -> Result<Vec<String>> {
        let session = self.client.open_session(&self.token);
        let request = SlackApiConversationsMembersRequest::new()
            .with_channel(channel.clone())
            .with_limit(IM_MEMBER_LIMIT);

        let response = session
            .conversations_members(&request)
            .await
            .map_err(|e| MoonslaError::SlackApi(e.to_string()))?;

        Ok(response.members.into_iter().map(|m| m.to_string()).collect())
    }

    /// One page of workspace members
    ///
    /// Users are shown by their real name, then their handle.
    pub async fn list_users_page(&self, cursor: Option<String>) -> Result<Page<DirectoryEntry>> {
        let session = self.client.open_session(&self.token);

        let mut request = SlackApiUsersListRequest::new().with_limit(PAGE_LIMIT);
        if let Some(cursor) = cursor {
            request = request.with_cursor(SlackCursorId(cursor));
        }

        let response = session
            .users_list(&request)
            .await
            .map_err(|e| MoonslaError::SlackApi(e.to_string()))?;

        let entries = response
            .members
            .into_iter()
            .map(|u| {
                let id = u.id.to_string();
                let name = u
                    .real_name
                    .filter(|n| !n.is_empty())
                    .or(u.name)
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| id.clone());
                DirectoryEntry::new(id, name)
            })
            .collect();

        Ok(Page::new(entries, next_cursor(response.response_metadata)))
    }

    async fn conversations_page(
        &self,
        cursor: Option<String>,
        types: Vec<SlackConversationType>,
    ) -> Result<SlackApiConversationsListResponse> {
        let session = self.client.open_session(&self.token);

        let mut request = SlackApiConversationsListRequest::new()
            .with_exclude_archived(true)
            .with_limit(PAGE_LIMIT)
            .with_types(types);
        if let Some(cursor) = cursor {
            request = request.with_cursor(SlackCursorId(cursor));
        }

        session
            .conversations_list(&request)
            .await
            .map_err(|e| MoonslaError::SlackApi(e.to_string()))
    }
}

/// The member of a DM that is not the token owner.
///
/// A DM with yourself only lists your own id, which is then the peer.
fn im_peer(members: &[String], own_user_id: &str) -> Option<String> {
    members
        .iter()
        .find(|m| m.as_str() != own_user_id)
        .or_else(|| members.first())
        .cloned()
}

fn next_cursor(metadata: Option<SlackResponseMetadata>) -> Option<String> {
    metadata.and_then(|m| m.next_cursor).map(|c| c.0)
}

impl DirectorySource for SlackClient {
    async fn list_channels(&self, cursor: Option<String>) -> Result<Page<DirectoryEntry>> {
        self.list_channels_page(cursor).await
    }

    async fn list_users(&self, cursor: Option<String>) -> Result<Page<DirectoryEntry>> {
        self.list_users_page(cursor).await
    }

    async fn list_ims(&self, cursor: Option<String>) -> Result<Page<ImChannel>> {
        self.list_im_page(cursor).await
    }
}
