use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "parametros_seteos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub nombre_parametro: String,
    pub valor_parametro: String,
    pub valor: Option<String>,
    pub tipo_dato: Option<String>,
    pub descripcion: Option<String>,
    pub ultima_modificacion: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Current time as stored in `ultima_modificacion`: RFC 3339, UTC, microsecond precision.
pub fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
