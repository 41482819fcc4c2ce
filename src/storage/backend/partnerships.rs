//! partnerships 读写

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use super::converters::{model_to_partnership, partnership_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{AuraError, Result};
use crate::storage::models::{PartnerType, Partnership, PartnershipStatus};

use migration::entities::partnership;

/// 合作记录过滤条件
#[derive(Default, Clone, Debug)]
pub struct PartnershipFilter {
    pub created_by: Option<String>,
    pub partner_type: Option<PartnerType>,
    /// 为空表示不限状态
    pub statuses: Vec<PartnershipStatus>,
    /// 额外包含所有 active 记录（"自己的 + 公开的"）
    pub include_all_active: bool,
}

impl PartnershipFilter {
    fn condition(&self) -> Condition {
        let mut scoped = Condition::all();
        if let Some(ref owner) = self.created_by {
            scoped = scoped.add(partnership::Column::CreatedBy.eq(owner.clone()));
        }
        if !self.statuses.is_empty() {
            scoped = scoped.add(
                partnership::Column::Status.is_in(self.statuses.iter().map(|s| s.to_string())),
            );
        }

        let mut cond = if self.include_all_active {
            Condition::any().add(scoped).add(
                partnership::Column::Status.eq(PartnershipStatus::Active.to_string()),
            )
        } else {
            scoped
        };

        if let Some(t) = self.partner_type {
            cond = Condition::all().add(cond).add(match t {
                // 缺失 partner_type 的旧记录算 affiliate
                PartnerType::Affiliate => Condition::any()
                    .add(partnership::Column::PartnerType.eq(t.to_string()))
                    .add(partnership::Column::PartnerType.is_null()),
                PartnerType::Business => {
                    Condition::all().add(partnership::Column::PartnerType.eq(t.to_string()))
                }
            });
        }
        cond
    }
}

impl SeaOrmStorage {
    pub async fn get_partnership(&self, id: &str) -> Result<Option<Partnership>> {
        let db = &self.db;
        let model = retry::with_retry(
            &format!("get_partnership({})", id),
            self.retry_config,
            || async { partnership::Entity::find_by_id(id).one(db).await },
        )
        .await?;
        Ok(model.map(model_to_partnership))
    }

    /// 按创建时间倒序列出
    pub async fn list_partnerships(&self, filter: &PartnershipFilter) -> Result<Vec<Partnership>> {
        let db = &self.db;
        let cond = filter.condition();
        let models = retry::with_retry("list_partnerships", self.retry_config, || async {
            partnership::Entity::find()
                .filter(cond.clone())
                .order_by_desc(partnership::Column::CreatedAt)
                .all(db)
                .await
        })
        .await?;
        Ok(models.into_iter().map(model_to_partnership).collect())
    }

    pub async fn insert_partnership(&self, p: &Partnership) -> Result<()> {
        partnership::Entity::insert(partnership_to_active_model(p, true))
            .exec(&self.db)
            .await
            .map_err(|e| {
                AuraError::database_operation(format!(
                    "Failed to insert partnership for {}: {}",
                    p.website, e
                ))
            })?;
        info!(
            "Partnership created: {} ({}, {})",
            p.id,
            p.effective_type(),
            p.status
        );
        Ok(())
    }

    /// 只改状态和 updated_at
    pub async fn update_partnership_status(
        &self,
        id: &str,
        status: PartnershipStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Partnership> {
        use sea_orm::ActiveValue::Set;

        let update = partnership::ActiveModel {
            id: Set(id.to_string()),
            status: Set(status.to_string()),
            updated_at: Set(updated_at),
            ..Default::default()
        };

        let model = partnership::Entity::update(update)
            .exec(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => {
                    AuraError::not_found(format!("Partnership not found: {}", id))
                }
                other => AuraError::from(other),
            })?;

        info!("Partnership {} status -> {}", id, status);
        Ok(model_to_partnership(model))
    }
}
