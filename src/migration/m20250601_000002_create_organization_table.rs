use sea_orm::Schema;
use sea_orm_migration::prelude::*;

use crate::entity::{organization, organization_member};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(
                schema
                    .create_table_from_entity(organization::Entity)
                    .if_not_exists()
                    .to_owned()
            )
            .await?;

        // 멤버 테이블은 users, organizations 양쪽을 참조
        manager
            .create_table(
                schema
                    .create_table_from_entity(organization_member::Entity)
                    .if_not_exists()
                    .to_owned()
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(organization_member::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(organization::Entity).to_owned())
            .await
    }
}
