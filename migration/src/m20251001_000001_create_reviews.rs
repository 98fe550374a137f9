use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 列表字段（tags/aliases/pros/cons）以 JSON 文本保存，兼容三种后端
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Review::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Review::Title).text().not_null())
                    .col(ColumnDef::new(Review::Platform).string_len(16).not_null())
                    .col(ColumnDef::new(Review::ProductImage).text().null())
                    .col(ColumnDef::new(Review::ProductGif).text().null())
                    .col(ColumnDef::new(Review::Price).string().null())
                    .col(ColumnDef::new(Review::Rating).double().null())
                    .col(ColumnDef::new(Review::Tags).text().not_null())
                    .col(ColumnDef::new(Review::Aliases).text().not_null())
                    .col(
                        ColumnDef::new(Review::PublishedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Review::ReviewUrl).string_len(768).not_null())
                    .col(ColumnDef::new(Review::AffiliateUrl).text().not_null())
                    .col(ColumnDef::new(Review::Pros).text().not_null())
                    .col(ColumnDef::new(Review::Cons).text().not_null())
                    .col(
                        ColumnDef::new(Review::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Review::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Review {
    #[sea_orm(iden = "reviews")]
    Table,
    Id,
    Title,
    Platform,
    ProductImage,
    ProductGif,
    Price,
    Rating,
    Tags,
    Aliases,
    PublishedAt,
    ReviewUrl,
    AffiliateUrl,
    Pros,
    Cons,
    CreatedAt,
    UpdatedAt,
}
