//! Per-account preferences stored as typed columns.

use crate::error::{ApiError, ApiResult};
use crate::orm::account_settings;
use chrono::Utc;
use sea_orm::{entity::*, ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedScope {
    Following,
    All,
}

impl FeedScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "following" => Some(Self::Following),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Following => "following",
            Self::All => "all",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileVisibility {
    Public,
    Connections,
    Private,
}

impl ProfileVisibility {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "connections" => Some(Self::Connections),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Connections => "connections",
            Self::Private => "private",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountSettings {
    pub default_feed: FeedScope,
    pub email_notifications: bool,
    pub show_online_status: bool,
    pub profile_visibility: ProfileVisibility,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            default_feed: FeedScope::Following,
            email_notifications: true,
            show_online_status: true,
            profile_visibility: ProfileVisibility::Public,
        }
    }
}

impl From<account_settings::Model> for AccountSettings {
    fn from(m: account_settings::Model) -> Self {
        let defaults = Self::default();
        Self {
            default_feed: FeedScope::parse(&m.default_feed).unwrap_or(defaults.default_feed),
            email_notifications: m.email_notifications,
            show_online_status: m.show_online_status,
            profile_visibility: ProfileVisibility::parse(&m.profile_visibility)
                .unwrap_or(defaults.profile_visibility),
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub default_feed: Option<String>,
    pub email_notifications: Option<bool>,
    pub show_online_status: Option<bool>,
    pub profile_visibility: Option<String>,
}

impl SettingsUpdate {
    pub fn apply(&self, mut settings: AccountSettings) -> ApiResult<AccountSettings> {
        if let Some(feed) = &self.default_feed {
            settings.default_feed = FeedScope::parse(feed.trim())
                .ok_or_else(|| ApiError::bad_request("default_feed must be 'following' or 'all'"))?;
        }
        if let Some(visibility) = &self.profile_visibility {
            settings.profile_visibility =
                ProfileVisibility::parse(visibility.trim()).ok_or_else(|| {
                    ApiError::bad_request(
                        "profile_visibility must be 'public', 'connections' or 'private'",
                    )
                })?;
        }
        if let Some(v) = self.email_notifications {
            settings.email_notifications = v;
        }
        if let Some(v) = self.show_online_status {
            settings.show_online_status = v;
        }
        Ok(settings)
    }
}

/// Stored settings, or the defaults when the user never saved any.
pub async fn get_settings<C>(db: &C, user_id: i32) -> Result<AccountSettings, DbErr>
where
    C: ConnectionTrait,
{
    Ok(account_settings::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .map(AccountSettings::from)
        .unwrap_or_default())
}

pub async fn update_settings<C>(
    db: &C,
    user_id: i32,
    update: &SettingsUpdate,
) -> ApiResult<AccountSettings>
where
    C: ConnectionTrait,
{
    let existing = account_settings::Entity::find_by_id(user_id).one(db).await?;
    let current = existing
        .clone()
        .map(AccountSettings::from)
        .unwrap_or_default();
    let next = update.apply(current)?;

    let row = account_settings::ActiveModel {
        user_id: Set(user_id),
        default_feed: Set(next.default_feed.as_str().to_string()),
        email_notifications: Set(next.email_notifications),
        show_online_status: Set(next.show_online_status),
        profile_visibility: Set(next.profile_visibility.as_str().to_string()),
        updated_at: Set(Utc::now().naive_utc()),
    };

    if existing.is_some() {
        row.update(db).await?;
    } else {
        row.insert(db).await?;
    }

    Ok(next)
}
