use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Base schema. Every statement is `IF NOT EXISTS` so databases created by
/// earlier deployments (which have the tables but no migration ledger) are
/// adopted as-is. `qr_codes.owner_user_id` arrives in the next migration.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .string()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QrCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QrCodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QrCodes::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(QrCodes::CurrentUrl).string().null())
                    .col(
                        ColumnDef::new(QrCodes::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(QrCodes::Description).string().null())
                    .col(ColumnDef::new(QrCodes::CreatedAt).string().not_null())
                    .col(ColumnDef::new(QrCodes::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_qr_codes_code")
                    .table(QrCodes::Table)
                    .col(QrCodes::Code)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QrAccessLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QrAccessLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QrAccessLogs::QrCodeId).integer().not_null())
                    .col(ColumnDef::new(QrAccessLogs::AccessedAt).string().not_null())
                    .col(ColumnDef::new(QrAccessLogs::IpAddress).string().null())
                    .col(ColumnDef::new(QrAccessLogs::UserAgent).string().null())
                    .col(ColumnDef::new(QrAccessLogs::Referer).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_qr_access_logs_qr_code_id")
                            .from(QrAccessLogs::Table, QrAccessLogs::QrCodeId)
                            .to(QrCodes::Table, QrCodes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_logs_qr_code_id")
                    .table(QrAccessLogs::Table)
                    .col(QrAccessLogs::QrCodeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QrAccessLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QrCodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum QrCodes {
    Table,
    Id,
    Code,
    CurrentUrl,
    Status,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum QrAccessLogs {
    Table,
    Id,
    QrCodeId,
    AccessedAt,
    IpAddress,
    UserAgent,
    Referer,
}
