use sea_orm::{
    ColumnTrait as _, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait as _, QueryFilter as _,
    TransactionTrait as _,
};
use sea_orm_migration::{prelude::*, schema::*};
use tracing::{error, info};

use super::parameter::{self, current_timestamp};

const TABLE_NAME: &str = "parametros_seteos";

#[derive(DeriveIden, Clone, Copy)]
pub enum ParametrosSeteos {
    Table,
    Id,
    NombreParametro,
    ValorParametro,
    Valor,
    TipoDato,
    Descripcion,
    UltimaModificacion,
}

/// Columns added after the table was first shipped, in the order they are applied.
const OPTIONAL_COLUMNS: [(ParametrosSeteos, &str); 3] = [
    (ParametrosSeteos::TipoDato, "tipo_dato"),
    (ParametrosSeteos::Descripcion, "descripcion"),
    (ParametrosSeteos::UltimaModificacion, "ultima_modificacion"),
];

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct MigrationReport {
    pub added_columns: Vec<&'static str>,
    pub backfilled_rows: u64,
}

impl MigrationReport {
    pub fn has_changes(&self) -> bool {
        !self.added_columns.is_empty() || self.backfilled_rows > 0
    }
}

/// Creates `parametros_seteos` with its baseline columns. Existing tables are left untouched.
pub(crate) async fn ensure_table(connection: &DatabaseConnection) -> Result<(), DbErr> {
    let manager = SchemaManager::new(connection);

    manager
        .create_table(
            Table::create()
                .table(ParametrosSeteos::Table)
                .if_not_exists()
                .col(pk_auto(ParametrosSeteos::Id))
                .col(text_uniq(ParametrosSeteos::NombreParametro))
                .col(text(ParametrosSeteos::ValorParametro))
                .col(text_null(ParametrosSeteos::Valor))
                .take(),
        )
        .await?;

    info!("table '{TABLE_NAME}' verified.");

    Ok(())
}

/// Adds any missing optional column and backfills `ultima_modificacion` when it is introduced.
///
/// A failure on one column is logged and does not stop the others. Everything runs in a single
/// transaction which is committed only if something changed.
pub(crate) async fn ensure_columns(connection: &DatabaseConnection) -> Result<MigrationReport, DbErr> {
    let transaction = connection.begin().await?;
    let mut report = MigrationReport::default();

    {
        let manager = SchemaManager::new(&transaction);

        for (column, name) in OPTIONAL_COLUMNS {
            match add_column_if_missing(&manager, column, name).await {
                Ok(true) => {
                    info!("column '{name}' added to '{TABLE_NAME}'.");
                    report.added_columns.push(name);
                }
                Ok(false) => {}
                Err(e) => {
                    error!(error = %e, "failed to add column '{name}' to '{TABLE_NAME}'.");
                    continue;
                }
            }

            if matches!(column, ParametrosSeteos::UltimaModificacion) && report.added_columns.contains(&name) {
                match backfill_last_modified(&transaction).await {
                    Ok(rows) => {
                        info!(rows, "column '{name}' backfilled for existing rows.");
                        report.backfilled_rows = rows;
                    }
                    Err(e) => error!(error = %e, "failed to backfill column '{name}'."),
                }
            }
        }
    }

    if report.has_changes() {
        transaction.commit().await?;
    } else {
        transaction.rollback().await?;
    }

    info!(?report, "schema migration of '{TABLE_NAME}' completed.");

    Ok(report)
}

async fn add_column_if_missing(
    manager: &SchemaManager<'_>,
    column: ParametrosSeteos,
    name: &str,
) -> Result<bool, DbErr> {
    if manager.has_column(TABLE_NAME, name).await? {
        return Ok(false);
    }

    manager.alter_table(Table::alter().table(ParametrosSeteos::Table).add_column(text_null(column)).to_owned()).await?;

    Ok(true)
}

async fn backfill_last_modified(transaction: &DatabaseTransaction) -> Result<u64, DbErr> {
    let result = parameter::Entity::update_many()
        .col_expr(parameter::Column::UltimaModificacion, Expr::value(current_timestamp()))
        .filter(parameter::Column::UltimaModificacion.is_null())
        .exec(transaction)
        .await?;

    Ok(result.rows_affected)
}
