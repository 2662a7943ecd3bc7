use sea_orm::entity::prelude::*;

use crate::{
    errors::MigrationError,
    metadata::ExecutedMigrationRecord,
    types::{Direction, MigrationId},
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "migration_versions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub version: String,

    #[sea_orm(default = "chrono::Utc::now().naive_utc()")]
    pub executed_at: DateTime,

    #[sea_orm(default_value = "UP")]
    pub direction: Direction,

    pub execution_time_ms: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ExecutedMigrationRecord {
    type Error = MigrationError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MigrationId::parse(&model.version)?,
            executed_at: model.executed_at,
            direction: model.direction,
            execution_time_ms: model.execution_time_ms,
        })
    }
}
