//! 点击计数与 click_logs
//!
//! 计数用 `click_count = click_count + 1`，并发点击不会丢失。

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, EntityTrait, ExprTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
    sea_query::Expr,
};
use tracing::debug;

use super::{ClickSink, SeaOrmStorage, retry};
use crate::errors::{AuraError, Result};
use crate::storage::models::{ClickBreakdown, ClickEvent, CountEntry, ShortLink};

use migration::entities::{click_log, short_link};

/// 分组统计结果行
#[derive(Debug, FromQueryResult)]
struct GroupRow {
    name: Option<String>,
    count: i64,
}

impl From<GroupRow> for CountEntry {
    fn from(row: GroupRow) -> Self {
        CountEntry {
            name: row.name.unwrap_or_else(|| "unknown".to_string()),
            count: row.count,
        }
    }
}

#[async_trait]
impl ClickSink for SeaOrmStorage {
    async fn record_click(&self, event: ClickEvent) -> Result<()> {
        let txn = self.db.begin().await?;

        let updated = short_link::Entity::update_many()
            .col_expr(
                short_link::Column::ClickCount,
                Expr::col(short_link::Column::ClickCount).add(Expr::val(1i64)),
            )
            .filter(short_link::Column::Id.eq(event.link_id.as_str()))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AuraError::not_found(format!(
                "Link vanished before click was recorded: {}",
                event.code
            )));
        }

        click_log::Entity::insert(click_log::ActiveModel {
            id: NotSet,
            link_id: Set(event.link_id.clone()),
            code: Set(event.code.clone()),
            clicked_at: Set(Utc::now()),
            referrer: Set(event.referrer),
            user_agent: Set(event.user_agent),
            ip_address: Set(event.ip_address),
            source: Set(event.source),
        })
        .exec(&txn)
        .await?;

        txn.commit().await?;
        debug!("Click recorded for {}", event.code);
        Ok(())
    }
}

impl SeaOrmStorage {
    /// 单个链接的点击分布：计数器总数 + click_logs 中的来源统计
    pub async fn click_breakdown(&self, link: &ShortLink, limit: u64) -> Result<ClickBreakdown> {
        let db = &self.db;
        let link_id = link.id.as_str();

        let logged_clicks = retry::with_retry("count_click_logs", self.retry_config, || async {
            click_log::Entity::find()
                .filter(click_log::Column::LinkId.eq(link_id))
                .count(db)
                .await
        })
        .await?;

        let top_referrers = retry::with_retry("top_referrers", self.retry_config, || async {
            click_log::Entity::find()
                .select_only()
                .column_as(click_log::Column::Referrer, "name")
                .column_as(click_log::Column::Id.count(), "count")
                .filter(click_log::Column::LinkId.eq(link_id))
                .group_by(click_log::Column::Referrer)
                .order_by_desc(Expr::cust("count"))
                .limit(limit)
                .into_model::<GroupRow>()
                .all(db)
                .await
        })
        .await?;

        let top_sources = retry::with_retry("top_sources", self.retry_config, || async {
            click_log::Entity::find()
                .select_only()
                .column_as(click_log::Column::Source, "name")
                .column_as(click_log::Column::Id.count(), "count")
                .filter(click_log::Column::LinkId.eq(link_id))
                .group_by(click_log::Column::Source)
                .order_by_desc(Expr::cust("count"))
                .limit(limit)
                .into_model::<GroupRow>()
                .all(db)
                .await
        })
        .await?;

        Ok(ClickBreakdown {
            link_id: link.id.clone(),
            code: link.code.clone(),
            total_clicks: link.click_count,
            logged_clicks: logged_clicks as i64,
            top_referrers: top_referrers.into_iter().map(CountEntry::from).collect(),
            top_sources: top_sources.into_iter().map(CountEntry::from).collect(),
        })
    }
}
