//! Report timeline entity (one row per status reached).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::report::ReportStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report_timeline")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub report_id: String,

    pub status: ReportStatus,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Officer handling the report
    #[sea_orm(nullable)]
    pub assigned_to: Option<String>,

    #[sea_orm(nullable)]
    pub department: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::report::Entity",
        from = "Column::ReportId",
        to = "super::report::Column::Id",
        on_delete = "Cascade"
    )]
    Report,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
