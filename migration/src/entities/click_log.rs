//! Append-only click events, one row per redirect resolution

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "click_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub link_id: String,
    pub code: String,
    pub clicked_at: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    /// Traffic source (utm_source param, ref:{domain}, or direct)
    pub source: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
