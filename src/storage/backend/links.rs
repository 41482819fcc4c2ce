//! short_links 读写

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait,
};
use tracing::{debug, info};

use super::converters::{model_to_shortlink, shortlink_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{AuraError, Result};
use crate::storage::ShortLink;

use migration::entities::{click_log, short_link};

/// 链接过滤条件
#[derive(Default, Clone, Debug)]
pub struct LinkFilter {
    /// 只看某个用户创建的
    pub created_by: Option<String>,
    /// 只看挂在某个合作方下的
    pub partner_id: Option<String>,
}

impl LinkFilter {
    pub fn owned_by(email: &str) -> Self {
        Self {
            created_by: Some(email.to_string()),
            ..Default::default()
        }
    }

    fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(ref owner) = self.created_by {
            cond = cond.add(short_link::Column::CreatedBy.eq(owner.clone()));
        }
        if let Some(ref partner_id) = self.partner_id {
            cond = cond.add(short_link::Column::PartnerId.eq(partner_id.clone()));
        }
        cond
    }
}

impl SeaOrmStorage {
    /// 跳转用的按 code 查询，不重试
    pub async fn find_link_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        let model = short_link::Entity::find()
            .filter(short_link::Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_shortlink))
    }

    pub async fn get_link(&self, id: &str) -> Result<Option<ShortLink>> {
        let db = &self.db;
        let model = retry::with_retry(&format!("get_link({})", id), self.retry_config, || async {
            short_link::Entity::find_by_id(id).one(db).await
        })
        .await?;
        Ok(model.map(model_to_shortlink))
    }

    pub async fn code_exists(&self, code: &str) -> Result<bool> {
        let count = short_link::Entity::find()
            .filter(short_link::Column::Code.eq(code))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// 按创建时间倒序列出
    pub async fn list_links(&self, filter: &LinkFilter) -> Result<Vec<ShortLink>> {
        let db = &self.db;
        let cond = filter.condition();
        let models = retry::with_retry("list_links", self.retry_config, || async {
            short_link::Entity::find()
                .filter(cond.clone())
                .order_by_desc(short_link::Column::CreatedAt)
                .all(db)
                .await
        })
        .await?;

        debug!("Loaded {} links", models.len());
        Ok(models.into_iter().map(model_to_shortlink).collect())
    }

    /// 插入新链接，code 冲突时返回 Conflict
    pub async fn insert_link(&self, link: &ShortLink) -> Result<()> {
        let active_model = shortlink_to_active_model(link, true);

        match short_link::Entity::insert(active_model).exec(&self.db).await {
            Ok(_) => {
                info!("Short link created: {} -> {}", link.code, link.destination_url);
                Ok(())
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                AuraError::conflict(format!("Short code '{}' is already taken", link.code)),
            ),
            Err(e) => Err(AuraError::database_operation(format!(
                "Failed to insert link '{}': {}",
                link.code, e
            ))),
        }
    }

    /// 记录外部短链服务返回的 id 与短地址
    pub async fn set_link_provider(
        &self,
        id: &str,
        provider_link_id: &str,
        provider_short_url: &str,
    ) -> Result<()> {
        use sea_orm::ActiveValue::Set;

        let update = short_link::ActiveModel {
            id: Set(id.to_string()),
            provider_link_id: Set(Some(provider_link_id.to_string())),
            provider_short_url: Set(Some(provider_short_url.to_string())),
            ..Default::default()
        };
        short_link::Entity::update(update).exec(&self.db).await?;
        Ok(())
    }

    /// 连同 click_logs 一起删除，放在同一事务里
    pub async fn delete_link(&self, id: &str) -> Result<()> {
        let txn = self.db.begin().await?;

        let logs = click_log::Entity::delete_many()
            .filter(click_log::Column::LinkId.eq(id))
            .exec(&txn)
            .await?;
        let result = short_link::Entity::delete_by_id(id).exec(&txn).await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AuraError::not_found(format!("Link not found: {}", id)));
        }

        txn.commit().await?;
        info!(
            "Short link deleted: {} ({} click logs removed)",
            id, logs.rows_affected
        );
        Ok(())
    }
}
