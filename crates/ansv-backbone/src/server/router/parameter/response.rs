use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::{
    application::parameter::{self, data::ParameterData},
    server::response::{error_payload, handle_internal_server_error},
};

impl IntoResponse for parameter::Error {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            parameter::Error::Anyhow(e) => return handle_internal_server_error(e).into_response(),
            parameter::Error::MissingRequiredFields
            | parameter::Error::EmptyUpdate
            | parameter::Error::NoUpdatableFields
            | parameter::Error::InvalidFieldValue(_) => StatusCode::BAD_REQUEST,
            parameter::Error::ParameterNotFound => StatusCode::NOT_FOUND,
            parameter::Error::ParameterNameConflicted => StatusCode::CONFLICT,
            parameter::Error::StorageUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, error_payload(&self.to_string())).into_response()
    }
}

/// Row shape used by the collection listing. The legacy `valor` column is left out.
#[derive(Serialize)]
pub(super) struct ParameterSummaryResponse {
    pub id: i64,
    pub nombre_parametro: String,
    pub valor_parametro: String,
    pub tipo_dato: Option<String>,
    pub descripcion: Option<String>,
    pub ultima_modificacion: Option<String>,
}

impl From<ParameterData> for ParameterSummaryResponse {
    fn from(value: ParameterData) -> Self {
        Self {
            id: value.id,
            nombre_parametro: value.name,
            valor_parametro: value.value,
            tipo_dato: value.data_type,
            descripcion: value.description,
            ultima_modificacion: value.last_modified,
        }
    }
}

/// Full row, including the legacy `valor` column.
#[derive(Serialize)]
pub(super) struct ParameterResponse {
    pub id: i64,
    pub nombre_parametro: String,
    pub valor_parametro: String,
    pub valor: Option<String>,
    pub tipo_dato: Option<String>,
    pub descripcion: Option<String>,
    pub ultima_modificacion: Option<String>,
}

impl From<ParameterData> for ParameterResponse {
    fn from(value: ParameterData) -> Self {
        Self {
            id: value.id,
            nombre_parametro: value.name,
            valor_parametro: value.value,
            valor: value.legacy_value,
            tipo_dato: value.data_type,
            descripcion: value.description,
            ultima_modificacion: value.last_modified,
        }
    }
}
