use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Legacy rows stay NULL here; the bootstrap admin claims them on startup.
        if !manager.has_column("qr_codes", "owner_user_id").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(QrCodes::Table)
                        .add_column(ColumnDef::new(QrCodes::OwnerUserId).integer().null())
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_qr_codes_owner_user_id")
                    .table(QrCodes::Table)
                    .col(QrCodes::OwnerUserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .name("idx_qr_codes_owner_user_id")
                    .table(QrCodes::Table)
                    .to_owned(),
            )
            .await?;

        if manager.has_column("qr_codes", "owner_user_id").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(QrCodes::Table)
                        .drop_column(QrCodes::OwnerUserId)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum QrCodes {
    Table,
    OwnerUserId,
}
