use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait as _};
use tracing::error;

use crate::{
    database::{close_connection, ConnectionProvider},
    domain::{self, parameter::ParameterService},
};

use self::{
    command::{CreatingParameterCommand, UpdatingParameterCommand},
    data::ParameterData,
};

pub mod command;
pub mod data;

#[async_trait]
pub(crate) trait ParameterUseCase {
    async fn get_all(&self) -> Result<Vec<ParameterData>>;
    async fn get(&self, id: i64) -> Result<ParameterData>;
    async fn create(&self, cmd: CreatingParameterCommand) -> Result<ParameterData>;
    async fn update(&self, id: i64, cmd: UpdatingParameterCommand) -> Result<ParameterData>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Runs every call on its own connection, opened at the start of the call and closed before it
/// returns, whatever the outcome.
pub(crate) struct ParameterUseCaseImpl {
    connection_provider: Arc<dyn ConnectionProvider + Sync + Send>,
    parameter_service: Arc<dyn ParameterService + Sync + Send>,
}

impl ParameterUseCaseImpl {
    pub fn new(
        connection_provider: Arc<dyn ConnectionProvider + Sync + Send>,
        parameter_service: Arc<dyn ParameterService + Sync + Send>,
    ) -> Self {
        Self { connection_provider, parameter_service }
    }

    async fn open_connection(&self) -> Result<DatabaseConnection> {
        self.connection_provider.open().await.ok_or(Error::StorageUnavailable)
    }
}

#[async_trait]
impl ParameterUseCase for ParameterUseCaseImpl {
    async fn get_all(&self) -> Result<Vec<ParameterData>> {
        let connection = self.open_connection().await?;
        let result = async {
            let transaction = begin(&connection).await?;
            let result = self.parameter_service.get_all(&transaction).await;
            finish(transaction, result).await
        }
        .await;
        close_connection(connection).await;

        Ok(result?.into_iter().map(ParameterData::from).collect())
    }

    async fn get(&self, id: i64) -> Result<ParameterData> {
        let connection = self.open_connection().await?;
        let result = async {
            let transaction = begin(&connection).await?;
            let result = self.parameter_service.get(&transaction, id).await;
            finish(transaction, result).await
        }
        .await;
        close_connection(connection).await;

        Ok(result?.into())
    }

    async fn create(&self, cmd: CreatingParameterCommand) -> Result<ParameterData> {
        let connection = self.open_connection().await?;
        let result = async {
            let transaction = begin(&connection).await?;
            let result = self.parameter_service.create(&transaction, cmd.into()).await;
            finish(transaction, result).await
        }
        .await;
        close_connection(connection).await;

        Ok(result?.into())
    }

    async fn update(&self, id: i64, cmd: UpdatingParameterCommand) -> Result<ParameterData> {
        let connection = self.open_connection().await?;
        let result = async {
            let transaction = begin(&connection).await?;
            let result = self.parameter_service.update(&transaction, id, cmd.into()).await;
            finish(transaction, result).await
        }
        .await;
        close_connection(connection).await;

        Ok(result?.into())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let connection = self.open_connection().await?;
        let result = async {
            let transaction = begin(&connection).await?;
            let result = self.parameter_service.delete(&transaction, id).await;
            finish(transaction, result).await
        }
        .await;
        close_connection(connection).await;

        result
    }
}

async fn begin(connection: &DatabaseConnection) -> Result<DatabaseTransaction> {
    Ok(connection.begin().await.map_err(domain::parameter::Error::from)?)
}

/// Commits on success and rolls back on failure.
async fn finish<T>(transaction: DatabaseTransaction, result: domain::parameter::Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            transaction.commit().await.map_err(domain::parameter::Error::from)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_error) = transaction.rollback().await {
                error!(error = %rollback_error, "failed to roll back transaction.");
            }
            Err(e.into())
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("missing required fields: nombre_parametro, valor_parametro")]
    MissingRequiredFields,
    #[error("no data provided for update")]
    EmptyUpdate,
    #[error("no valid fields to update")]
    NoUpdatableFields,
    #[error("invalid value for field '{0}'")]
    InvalidFieldValue(&'static str),
    #[error("parameter not found")]
    ParameterNotFound,
    #[error("parameter name already exists")]
    ParameterNameConflicted,
    #[error("database connection error")]
    StorageUnavailable,
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<domain::parameter::Error> for Error {
    fn from(value: domain::parameter::Error) -> Self {
        match value {
            domain::parameter::Error::ParameterNotFound(_) => Self::ParameterNotFound,
            domain::parameter::Error::ParameterNameConflicted => Self::ParameterNameConflicted,
            domain::parameter::Error::Anyhow(e) => Self::Anyhow(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
