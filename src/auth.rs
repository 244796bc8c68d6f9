//! Capability context and password hashing.
//!
//! A `Capabilities` value is built once per request by the client context
//! middleware and passed explicitly into every domain operation that needs
//! an authorization decision.

use crate::orm::{ambassadors, users};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use serde::Serialize;
use std::collections::HashMap;

/// Role held by an ambassador inside one community.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbassadorRole {
    Admin,
    Moderator,
}

impl AmbassadorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "moderator" => Some(Self::Moderator),
            _ => None,
        }
    }
}

/// What the current principal is allowed to do.
#[derive(Clone, Debug, Serialize)]
pub struct Capabilities {
    pub user_id: i32,
    pub username: String,
    pub role_id: i32,
    /// Communities the user is an ambassador of.
    pub ambassador_of: HashMap<i32, AmbassadorRole>,
}

impl Capabilities {
    pub fn new(user_id: i32, username: impl Into<String>, role_id: i32) -> Self {
        Self {
            user_id,
            username: username.into(),
            role_id,
            ambassador_of: HashMap::new(),
        }
    }

    pub fn with_ambassadorship(mut self, community_id: i32, role: AmbassadorRole) -> Self {
        self.ambassador_of.insert(community_id, role);
        self
    }

    /// Loads the capability context of an existing user.
    pub async fn load<C>(db: &C, user_id: i32) -> Result<Option<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        let user = match users::Entity::find_by_id(user_id).one(db).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        let rows = ambassadors::Entity::find()
            .filter(ambassadors::Column::UserId.eq(user_id))
            .all(db)
            .await?;

        let mut caps = Self::new(user.id, user.username, user.role_id);
        for row in rows {
            match AmbassadorRole::parse(&row.role) {
                Some(role) => {
                    // An admin row wins over a moderator row for the same community.
                    let entry = caps.ambassador_of.entry(row.community_id).or_insert(role);
                    if role == AmbassadorRole::Admin {
                        *entry = role;
                    }
                }
                None => log::warn!(
                    "Ignoring ambassador row {} with unknown role {:?}",
                    row.id,
                    row.role
                ),
            }
        }

        Ok(Some(caps))
    }

    pub fn is_super_admin(&self) -> bool {
        self.role_id == users::ROLE_SUPER_ADMIN
    }

    pub fn ambassador_role(&self, community_id: i32) -> Option<AmbassadorRole> {
        self.ambassador_of.get(&community_id).copied()
    }

    /// Super-admins moderate everything; ambassadors moderate their community.
    pub fn can_moderate(&self, community_id: Option<i32>) -> bool {
        if self.is_super_admin() {
            return true;
        }
        community_id.map_or(false, |id| self.ambassador_of.contains_key(&id))
    }

    /// Admin rights are a superset of moderator rights.
    pub fn is_community_admin(&self, community_id: i32) -> bool {
        self.is_super_admin() || self.ambassador_role(community_id) == Some(AmbassadorRole::Admin)
    }
}

pub fn hash_password(password: &str) -> Result<String, DbErr> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbErr::Custom(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}
