use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sea_orm::{
    ActiveModelTrait as _, ActiveValue, ColumnTrait as _, DatabaseTransaction, DbErr, EntityTrait as _,
    QueryFilter as _, QueryOrder as _, SqlErr,
};
use tracing::info;

use crate::database::parameter::{self, current_timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Parameter {
    pub id: i64,
    pub name: String,
    pub value: String,
    pub legacy_value: Option<String>,
    pub data_type: Option<String>,
    pub description: Option<String>,
    pub last_modified: Option<String>,
}

impl From<parameter::Model> for Parameter {
    fn from(value: parameter::Model) -> Self {
        Self {
            id: value.id,
            name: value.nombre_parametro,
            value: value.valor_parametro,
            legacy_value: value.valor,
            data_type: value.tipo_dato,
            description: value.descripcion,
            last_modified: value.ultima_modificacion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewParameter {
    pub name: String,
    pub value: String,
    pub data_type: Option<String>,
    pub description: Option<String>,
}

/// Fields to overwrite on an existing parameter. `None` leaves a field untouched; for the nullable
/// fields `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParameterPatch {
    pub name: Option<String>,
    pub value: Option<String>,
    pub data_type: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

impl ParameterPatch {
    fn into_active_model(self, last_modified: String) -> parameter::ActiveModel {
        parameter::ActiveModel {
            id: ActiveValue::NotSet,
            nombre_parametro: set_if_present(self.name),
            valor_parametro: set_if_present(self.value),
            valor: ActiveValue::NotSet,
            tipo_dato: set_if_present(self.data_type),
            descripcion: set_if_present(self.description),
            ultima_modificacion: ActiveValue::Set(Some(last_modified)),
        }
    }
}

fn set_if_present<V>(value: Option<V>) -> ActiveValue<V>
where
    V: Into<sea_orm::Value>,
{
    match value {
        Some(value) => ActiveValue::Set(value),
        None => ActiveValue::NotSet,
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub(crate) trait ParameterService {
    async fn get_all(&self, transaction: &DatabaseTransaction) -> Result<Vec<Parameter>>;
    async fn get(&self, transaction: &DatabaseTransaction, id: i64) -> Result<Parameter>;
    async fn create(&self, transaction: &DatabaseTransaction, new_parameter: NewParameter) -> Result<Parameter>;
    async fn update(&self, transaction: &DatabaseTransaction, id: i64, patch: ParameterPatch) -> Result<Parameter>;
    async fn delete(&self, transaction: &DatabaseTransaction, id: i64) -> Result<()>;
}

pub(crate) struct SqliteParameterService;

#[async_trait]
impl ParameterService for SqliteParameterService {
    async fn get_all(&self, transaction: &DatabaseTransaction) -> Result<Vec<Parameter>> {
        let parameters =
            parameter::Entity::find().order_by_asc(parameter::Column::Id).all(transaction).await?;

        Ok(parameters.into_iter().map(Parameter::from).collect())
    }

    async fn get(&self, transaction: &DatabaseTransaction, id: i64) -> Result<Parameter> {
        let parameter = parameter::Entity::find_by_id(id).one(transaction).await?.ok_or(Error::ParameterNotFound(id))?;

        Ok(parameter.into())
    }

    async fn create(&self, transaction: &DatabaseTransaction, new_parameter: NewParameter) -> Result<Parameter> {
        let created = parameter::ActiveModel {
            id: ActiveValue::NotSet,
            nombre_parametro: ActiveValue::Set(new_parameter.name),
            valor_parametro: ActiveValue::Set(new_parameter.value),
            valor: ActiveValue::NotSet,
            tipo_dato: ActiveValue::Set(new_parameter.data_type),
            descripcion: ActiveValue::Set(new_parameter.description),
            ultima_modificacion: ActiveValue::Set(Some(current_timestamp())),
        }
        .insert(transaction)
        .await?;

        info!("parameter(id: {}, name: {}) created.", created.id, created.nombre_parametro);

        Ok(created.into())
    }

    async fn update(&self, transaction: &DatabaseTransaction, id: i64, patch: ParameterPatch) -> Result<Parameter> {
        let result = parameter::Entity::update_many()
            .set(patch.into_active_model(current_timestamp()))
            .filter(parameter::Column::Id.eq(id))
            .exec(transaction)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::ParameterNotFound(id));
        }

        info!("parameter(id: {id}) updated.");

        self.get(transaction, id).await
    }

    async fn delete(&self, transaction: &DatabaseTransaction, id: i64) -> Result<()> {
        let result = parameter::Entity::delete_by_id(id).exec(transaction).await?;
        if result.rows_affected == 0 {
            return Err(Error::ParameterNotFound(id));
        }

        info!("parameter(id: {id}) deleted.");

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error("parameter(id: {0}) does not exist")]
    ParameterNotFound(i64),
    #[error("parameter name already exists")]
    ParameterNameConflicted,
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<DbErr> for Error {
    fn from(value: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = value.sql_err() {
            Self::ParameterNameConflicted
        } else {
            Self::Anyhow(value.into())
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, Error>;
