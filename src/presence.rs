//! Online status approximated from the last request time.

use crate::error::{ApiError, ApiResult};
use crate::orm::users;
use crate::settings;
use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::{entity::*, ConnectionTrait};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct Presence {
    pub user_id: i32,
    pub is_online: bool,
    /// Withheld when the user hides their status.
    pub last_active_at: Option<NaiveDateTime>,
}

pub fn is_online(last_active_at: Option<NaiveDateTime>, now: NaiveDateTime, window_seconds: i64) -> bool {
    match last_active_at {
        // A timestamp slightly in the future is clock skew, not absence.
        Some(at) => now.signed_duration_since(at) <= Duration::seconds(window_seconds),
        None => false,
    }
}

/// Presence of `user_id` as seen by `viewer_id`. Users always see their own.
pub async fn presence_of<C>(
    db: &C,
    viewer_id: Option<i32>,
    user_id: i32,
    window_seconds: i64,
) -> ApiResult<Presence>
where
    C: ConnectionTrait,
{
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .filter(|u| !u.is_hidden)
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let visible = viewer_id == Some(user_id)
        || settings::get_settings(db, user_id).await?.show_online_status;

    if !visible {
        return Ok(Presence {
            user_id,
            is_online: false,
            last_active_at: None,
        });
    }

    Ok(Presence {
        user_id,
        is_online: is_online(user.last_active_at, Utc::now().naive_utc(), window_seconds),
        last_active_at: user.last_active_at,
    })
}

#[cfg(test)]
mod tests {
    use super::is_online;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_window_edges() {
        let now = NaiveDate::from_ymd(2024, 5, 1).and_hms(12, 0, 0);
        assert!(is_online(Some(now), now, 300));
        assert!(is_online(Some(now - Duration::seconds(300)), now, 300));
        assert!(!is_online(Some(now - Duration::seconds(301)), now, 300));
        assert!(is_online(Some(now + Duration::seconds(5)), now, 300));
        assert!(!is_online(None, now, 300));
    }
}
