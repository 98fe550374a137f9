use sea_orm_migration::prelude::*;

use super::m20251001_000001_create_reviews::Review;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 列表按发布时间倒序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reviews_published_at")
                    .table(Review::Table)
                    .col(Review::PublishedAt)
                    .to_owned(),
            )
            .await?;

        // TikTok 链接精确查找
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reviews_review_url")
                    .table(Review::Table)
                    .col(Review::ReviewUrl)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_reviews_review_url").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_reviews_published_at").to_owned())
            .await
    }
}
