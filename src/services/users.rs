//! 当前用户与资料
//!
//! 身份来自会话 token，资料存在 user_profiles，首次访问时自动创建。

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::config::AuthConfig;
use crate::errors::{AuraError, Result};
use crate::storage::{SeaOrmStorage, UserProfile, backend::ProfilePatch};

/// 已认证的调用方
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub email: String,
    pub name: Option<String>,
    pub is_admin: bool,
}

impl Identity {
    pub fn new(email: impl Into<String>, name: Option<String>, auth: &AuthConfig) -> Self {
        let email = email.into();
        let is_admin = auth.is_admin(&email);
        Self {
            email,
            name,
            is_admin,
        }
    }

    /// 非管理员返回 Forbidden
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AuraError::forbidden("Admin access required"))
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub email: String,
    pub full_name: Option<String>,
    pub is_admin: bool,
    pub profile: UserProfile,
}

pub struct UserService {
    storage: Arc<SeaOrmStorage>,
}

impl UserService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 读资料，没有就建一份（短链集成默认开启）
    pub async fn ensure_profile(&self, identity: &Identity) -> Result<UserProfile> {
        if let Some(profile) = self.storage.get_profile(&identity.email).await? {
            return Ok(profile);
        }

        let now = Utc::now();
        let profile = UserProfile {
            email: identity.email.clone(),
            full_name: identity.name.clone(),
            notify_new_partnership: true,
            shortener_enabled: true,
            created_at: now,
            updated_at: now,
        };
        info!("Creating profile for {}", identity.email);
        self.storage.insert_profile(&profile).await
    }

    pub async fn me(&self, identity: &Identity) -> Result<MeResponse> {
        let profile = self.ensure_profile(identity).await?;
        Ok(to_me(identity, profile))
    }

    pub async fn update_my_user_data(
        &self,
        identity: &Identity,
        patch: &ProfilePatch,
    ) -> Result<MeResponse> {
        let profile = self.ensure_profile(identity).await?;
        if patch.is_empty() {
            return Ok(to_me(identity, profile));
        }

        let updated = self.storage.update_profile(&identity.email, patch).await?;
        Ok(to_me(identity, updated))
    }
}

fn to_me(identity: &Identity, profile: UserProfile) -> MeResponse {
    MeResponse {
        email: identity.email.clone(),
        full_name: profile.full_name.clone().or_else(|| identity.name.clone()),
        is_admin: identity.is_admin,
        profile,
    }
}
