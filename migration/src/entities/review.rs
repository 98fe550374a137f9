use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    pub platform: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub product_image: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub product_gif: Option<String>,
    pub price: Option<String>,
    pub rating: Option<f64>,
    /// JSON array
    #[sea_orm(column_type = "Text")]
    pub tags: String,
    /// JSON array
    #[sea_orm(column_type = "Text")]
    pub aliases: String,
    pub published_at: DateTimeUtc,
    pub review_url: String,
    #[sea_orm(column_type = "Text")]
    pub affiliate_url: String,
    #[sea_orm(column_type = "Text")]
    pub pros: String,
    #[sea_orm(column_type = "Text")]
    pub cons: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
