use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};

use crate::{
    application::{
        parameter::{
            self,
            command::{CreatingParameterCommand, UpdatingParameterCommand},
            ParameterUseCase,
        },
        Application,
    },
    server::response::message_payload,
};

use self::response::{ParameterResponse, ParameterSummaryResponse};

mod response;

type JsonFields = Result<Json<Map<String, Value>>, JsonRejection>;
type ParameterId = Result<Path<i64>, PathRejection>;

pub(crate) fn router(application: Arc<Application>) -> axum::Router {
    Router::new()
        .route("/api/parametros_seteos", get(handle_get_parameters).post(handle_post_parameter))
        .route(
            "/api/parametros_seteos/:parameter_id",
            get(handle_get_parameter).put(handle_put_parameter).delete(handle_delete_parameter),
        )
        .with_state(application)
}

#[debug_handler]
async fn handle_get_parameters(
    State(application): State<Arc<Application>>,
) -> Result<impl IntoResponse, parameter::Error> {
    let parameters = application.parameter().get_all().await?;

    let payload: Vec<ParameterSummaryResponse> = parameters.into_iter().map(|data| data.into()).collect();

    Ok((StatusCode::OK, Json(payload)))
}

#[debug_handler]
async fn handle_get_parameter(
    parameter_id: ParameterId,
    State(application): State<Arc<Application>>,
) -> Result<impl IntoResponse, parameter::Error> {
    let parameter = application.parameter().get(id_of(parameter_id)?).await?;
    let response: ParameterResponse = parameter.into();

    Ok(Json(response))
}

#[debug_handler]
async fn handle_post_parameter(
    State(application): State<Arc<Application>>,
    payload: JsonFields,
) -> Result<impl IntoResponse, parameter::Error> {
    let cmd = CreatingParameterCommand::from_fields(fields_of(payload))?;
    let parameter = application.parameter().create(cmd).await?;
    let response: ParameterResponse = parameter.into();

    Ok((StatusCode::CREATED, Json(response)))
}

#[debug_handler]
async fn handle_put_parameter(
    parameter_id: ParameterId,
    State(application): State<Arc<Application>>,
    payload: JsonFields,
) -> Result<impl IntoResponse, parameter::Error> {
    let parameter_id = id_of(parameter_id)?;
    let cmd = UpdatingParameterCommand::from_fields(fields_of(payload))?;
    let parameter = application.parameter().update(parameter_id, cmd).await?;
    let response: ParameterResponse = parameter.into();

    Ok(Json(response))
}

#[debug_handler]
async fn handle_delete_parameter(
    parameter_id: ParameterId,
    State(application): State<Arc<Application>>,
) -> Result<impl IntoResponse, parameter::Error> {
    application.parameter().delete(id_of(parameter_id)?).await?;

    Ok((StatusCode::OK, message_payload("parameter deleted")))
}

/// A body that is missing or not a JSON object counts as absent.
fn fields_of(payload: JsonFields) -> Option<Map<String, Value>> {
    payload.ok().map(|Json(fields)| fields)
}

/// An id segment that is not an integer addresses no row.
fn id_of(parameter_id: ParameterId) -> parameter::Result<i64> {
    parameter_id.map(|Path(id)| id).map_err(|_| parameter::Error::ParameterNotFound)
}
