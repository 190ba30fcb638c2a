//! Conversion functions from snapshot models to API DTOs

use crate::api::dto::*;
use crate::config::AppConfig;
use crate::data::{Account, Post};

/// Convert Account to AccountResponse
pub fn account_to_response(account: &Account, config: &AppConfig) -> AccountResponse {
    let base_url = config.server.base_url();

    AccountResponse {
        id: account.id.clone(),
        username: account.username.clone(),
        acct: account.username.clone(), // Local account, no @domain
        display_name: account
            .display_name
            .clone()
            .unwrap_or_else(|| account.username.clone()),
        locked: false, // Single user instance, not locked
        bot: false,
        discoverable: true,
        group: false,
        created_at: account.created_at,
        note: account.note.clone().unwrap_or_default(),
        url: format!("{}/@{}", base_url, account.username),
        avatar: account
            .avatar
            .clone()
            .unwrap_or_else(|| format!("{}/default-avatar.png", base_url)),
        avatar_static: account
            .avatar
            .clone()
            .unwrap_or_else(|| format!("{}/default-avatar.png", base_url)),
        header: account
            .header
            .clone()
            .unwrap_or_else(|| format!("{}/default-header.png", base_url)),
        header_static: account
            .header
            .clone()
            .unwrap_or_else(|| format!("{}/default-header.png", base_url)),
        followers_count: 0,
        following_count: 0,
        statuses_count: account.statuses_count,
        last_status_at: None,
        emojis: vec![],
        fields: vec![],
    }
}

/// Convert Post to StatusResponse
pub fn post_to_response(post: &Post, account: &Account, config: &AppConfig) -> StatusResponse {
    let base_url = config.server.base_url();
    let url = format!("{}/statuses/{}", base_url, post.id);

    StatusResponse {
        id: post.id.clone(),
        created_at: post.created_at,
        in_reply_to_id: None,
        in_reply_to_account_id: None,
        sensitive: post.sensitive,
        spoiler_text: String::new(),
        visibility: post.visibility.as_str().to_string(),
        language: None,
        uri: url.clone(),
        url,
        replies_count: post.replies_count,
        reblogs_count: post.reblogs_count,
        favourites_count: post.favourites_count,
        content: post.content_html.clone(),
        reblog: None,
        account: account_to_response(account, config),
        media_attachments: vec![],
        mentions: vec![],
        tags: vec![],
        emojis: vec![],
        card: None,
        poll: None,
    }
}
