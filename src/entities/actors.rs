use sea_orm::entity::prelude::*;

/// Cached actor profile. The flat columns mirror `data` for lookup and must be
/// rewritten together with it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "actors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub birthday: Option<String>,
    pub age: Option<String>,
    pub height: Option<String>,
    pub bust: Option<String>,
    pub waistline: Option<String>,
    pub hipline: Option<String>,
    pub birthplace: Option<String>,
    pub hobby: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub data: String,
    pub last_updated: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
