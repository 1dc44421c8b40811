use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "url_location_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub short_key: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub location: String,
    pub hits: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
