//! Guild member directory, fetched once from the Discord REST API.

use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
pub const MEMBER_PAGE_LIMIT: usize = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub platform_id: String,
    pub nickname: Option<String>,
    pub username: String,
}

impl Member {
    /// Guild nickname when set, account username otherwise.
    pub fn display_name(&self) -> &str {
        match self.nickname.as_deref() {
            Some(nick) if !nick.is_empty() => nick,
            _ => &self.username,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GuildMemberPayload {
    #[serde(default)]
    user: Option<UserPayload>,
    #[serde(default)]
    nick: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    username: String,
}

pub fn parse_members(body: &str) -> anyhow::Result<Vec<Member>> {
    let payload: Vec<GuildMemberPayload> =
        serde_json::from_str(body).context("failed to parse guild member list")?;
    Ok(payload
        .into_iter()
        .filter_map(|m| {
            let user = m.user?;
            Some(Member {
                platform_id: user.id,
                nickname: m.nick,
                username: user.username,
            })
        })
        .collect())
}

pub fn fetch_members(api_base: &str, guild_id: &str, token: &str) -> anyhow::Result<Vec<Member>> {
    let url = format!(
        "{}/guilds/{}/members?limit={}",
        api_base.trim_end_matches('/'),
        guild_id,
        MEMBER_PAGE_LIMIT
    );

    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build http client")?;

    tracing::debug!(guild_id, "requesting guild members");
    let response = client
        .get(&url)
        .header(reqwest::header::AUTHORIZATION, format!("Bot {}", token))
        .send()
        .with_context(|| format!("guild member request failed for guild {}", guild_id))?
        .error_for_status()
        .with_context(|| format!("guild member request rejected for guild {}", guild_id))?;

    let body = response
        .text()
        .context("failed to read guild member response")?;
    let members = parse_members(&body)?;

    if members.len() >= MEMBER_PAGE_LIMIT {
        tracing::warn!(
            limit = MEMBER_PAGE_LIMIT,
            "member list hit the page limit; members past it are not matched"
        );
    }
    tracing::info!(count = members.len(), "fetched guild members");
    Ok(members)
}

/// First member, in directory order, whose display name contains
/// `full_name` ignoring case.
pub fn find_member<'a>(members: &'a [Member], full_name: &str) -> Option<&'a Member> {
    let needle = full_name.to_lowercase();
    members
        .iter()
        .find(|m| m.display_name().to_lowercase().contains(&needle))
}
