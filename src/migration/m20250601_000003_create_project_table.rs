use sea_orm::Schema;
use sea_orm_migration::prelude::*;

use crate::entity::project::{Column, Entity};

const ORGANIZATION_KEY_INDEX: &str = "idx-projects-organization_id-key";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager
            .create_table(
                schema
                    .create_table_from_entity(Entity)
                    .if_not_exists()
                    .to_owned()
            )
            .await?;

        // 프로젝트 키는 조직 안에서만 유일
        manager
            .create_index(
                Index::create()
                    .name(ORGANIZATION_KEY_INDEX)
                    .table(Entity)
                    .col(Column::OrganizationId)
                    .col(Column::Key)
                    .unique()
                    .if_not_exists()
                    .to_owned()
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(ORGANIZATION_KEY_INDEX).table(Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Entity).to_owned())
            .await
    }
}
