//! user_profiles 读写

use chrono::Utc;
use sea_orm::{EntityTrait, SqlErr};
use serde::Deserialize;
use tracing::debug;

use super::converters::{model_to_profile, profile_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{AuraError, Result};
use crate::storage::UserProfile;

use migration::entities::user_profile;

/// 部分更新，None 表示不改
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub notify_new_partnership: Option<bool>,
    pub shortener_enabled: Option<bool>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.notify_new_partnership.is_none()
            && self.shortener_enabled.is_none()
    }
}

impl SeaOrmStorage {
    pub async fn get_profile(&self, email: &str) -> Result<Option<UserProfile>> {
        let db = &self.db;
        let model = retry::with_retry("get_profile", self.retry_config, || async {
            user_profile::Entity::find_by_id(email).one(db).await
        })
        .await?;
        Ok(model.map(model_to_profile))
    }

    /// 插入新资料；并发首次访问时已存在则读回现有记录
    pub async fn insert_profile(&self, profile: &UserProfile) -> Result<UserProfile> {
        match user_profile::Entity::insert(profile_to_active_model(profile, true))
            .exec(&self.db)
            .await
        {
            Ok(_) => {
                debug!("Profile created for {}", profile.email);
                Ok(profile.clone())
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => self
                .get_profile(&profile.email)
                .await?
                .ok_or_else(|| AuraError::not_found(format!("Profile not found: {}", profile.email))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_profile(&self, email: &str, patch: &ProfilePatch) -> Result<UserProfile> {
        use sea_orm::ActiveValue::{NotSet, Set};

        let update = user_profile::ActiveModel {
            email: Set(email.to_string()),
            full_name: match patch.full_name {
                Some(ref name) if name.trim().is_empty() => Set(None),
                Some(ref name) => Set(Some(name.trim().to_string())),
                None => NotSet,
            },
            notify_new_partnership: patch.notify_new_partnership.map_or(NotSet, Set),
            shortener_enabled: patch.shortener_enabled.map_or(NotSet, Set),
            created_at: NotSet,
            updated_at: Set(Utc::now()),
        };

        let model = user_profile::Entity::update(update)
            .exec(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => {
                    AuraError::not_found(format!("Profile not found: {}", email))
                }
                other => AuraError::from(other),
            })?;
        Ok(model_to_profile(model))
    }
}
