use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "qr_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// User-chosen token embedded in `/r/{code}`. Immutable once created.
    #[sea_orm(unique)]
    pub code: String,

    pub current_url: Option<String>,

    /// `active` or `inactive`
    pub status: String,

    pub description: Option<String>,

    /// Nullable for rows created before ownership existed.
    pub owner_user_id: Option<i32>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerUserId",
        to = "super::users::Column::Id"
    )]
    Owner,

    #[sea_orm(has_many = "super::qr_access_logs::Entity")]
    AccessLogs,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::qr_access_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
