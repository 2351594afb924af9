use sea_orm::Schema;
use sea_orm_migration::prelude::*;

use crate::entity::issue::{Column, Entity};

const BOARD_INDEX: &str = "idx-issues-sprint_id-status-order";

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

        // 보드 조회는 항상 sprint_id + status + order 순서
        manager
            .create_index(
                Index::create()
                    .name(BOARD_INDEX)
                    .table(Entity)
                    .col(Column::SprintId)
                    .col(Column::Status)
                    .col(Column::Order)
                    .if_not_exists()
                    .to_owned()
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(BOARD_INDEX).table(Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Entity).to_owned())
            .await
    }
}
