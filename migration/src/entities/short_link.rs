use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "short_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_type = "Text")]
    pub destination_url: String,
    pub title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub campaign: Option<String>,
    /// JSON 数组文本，例如 `["summer","shoes"]`
    #[sea_orm(column_type = "Text")]
    pub tags: String,
    pub status: String,
    pub click_count: i64,
    pub partner_id: Option<String>,
    pub partner_type: Option<String>,
    pub provider_link_id: Option<String>,
    pub provider_short_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
