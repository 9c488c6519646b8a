use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One row per resolution attempt against `/r/{code}`. Append-only.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "qr_access_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub qr_code_id: i32,
    pub accessed_at: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::qr_codes::Entity",
        from = "Column::QrCodeId",
        to = "super::qr_codes::Column::Id"
    )]
    QrCode,
}

impl Related<super::qr_codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QrCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
