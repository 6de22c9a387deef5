use std::sync::Arc;

use axum::{routing::get, Router};
use tracing::info;

use crate::{application::Application, config::ApplicationConfig};

mod response;
mod router;

pub(super) struct ServerConfig {
    pub port: u16,
}

impl From<&ApplicationConfig> for ServerConfig {
    fn from(value: &ApplicationConfig) -> Self {
        Self { port: value.port }
    }
}

pub(crate) fn app(application: Arc<Application>) -> Router {
    Router::new()
        .route("/health", get(|| async { "" }))
        .merge(router::parameter::router(application))
        .merge(router::admin::router())
}

pub(super) async fn run(application: Application, config: ServerConfig) -> anyhow::Result<()> {
    let app = app(Arc::new(application));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("starting backbone server on {}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use sea_orm::ConnectionTrait as _;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt as _;

    use crate::{
        application::{prepare_schema, Application},
        config::DatabaseConfig,
        database::{parameter::current_timestamp, ConnectionProvider as _, SqliteConnectionProvider},
        domain::parameter::SqliteParameterService,
    };

    use super::app;

    const COLLECTION: &str = "/api/parametros_seteos";

    async fn test_app() -> (TempDir, Router) {
        let temp_dir = tempfile::tempdir().expect("creating temp dir should be successful");
        let connection_provider = Arc::new(SqliteConnectionProvider::new(&DatabaseConfig {
            path: temp_dir.path().join("soporte_db.db"),
        }));
        prepare_schema(connection_provider.as_ref()).await.expect("preparing schema should be successful");

        let application = Application::new(connection_provider, Arc::new(SqliteParameterService));

        (temp_dir, app(Arc::new(application)))
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("building request should be successful"),
            None => request.body(Body::empty()).expect("building request should be successful"),
        };

        let response = router.clone().oneshot(request).await.expect("router request should be successful");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("reading body should be successful");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };

        (status, value)
    }

    async fn create_max_retries(router: &Router) -> Value {
        let (status, body) = send(
            router,
            Method::POST,
            COLLECTION,
            Some(json!({"nombre_parametro": "max_retries", "valor_parametro": "5"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    fn item_uri(body: &Value) -> String {
        format!("{COLLECTION}/{}", body["id"].as_i64().expect("id should be an integer"))
    }

    #[tokio::test]
    async fn when_parameter_is_created_then_optional_fields_are_null_and_timestamp_is_set() {
        let (_temp_dir, router) = test_app().await;
        let before = current_timestamp();

        let body = create_max_retries(&router).await;

        assert!(body["id"].as_i64().is_some());
        assert_eq!(body["nombre_parametro"], "max_retries");
        assert_eq!(body["valor_parametro"], "5");
        assert_eq!(body["tipo_dato"], Value::Null);
        assert_eq!(body["descripcion"], Value::Null);
        let last_modified = body["ultima_modificacion"].as_str().expect("timestamp should be set");
        assert!(last_modified >= before.as_str());
    }

    #[tokio::test]
    async fn when_parameter_name_already_exists_then_create_returns_conflict_and_keeps_original() {
        let (_temp_dir, router) = test_app().await;
        let created = create_max_retries(&router).await;

        let (status, body) = send(
            &router,
            Method::POST,
            COLLECTION,
            Some(json!({"nombre_parametro": "max_retries", "valor_parametro": "9"})),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
        let (_, stored) = send(&router, Method::GET, &item_uri(&created), None).await;
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn when_required_fields_are_missing_then_create_returns_bad_request() {
        let (_temp_dir, router) = test_app().await;

        let (status, body) =
            send(&router, Method::POST, COLLECTION, Some(json!({"nombre_parametro": "max_retries"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        let (_, list) = send(&router, Method::GET, COLLECTION, None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn when_body_is_not_json_then_create_returns_bad_request() {
        let (_temp_dir, router) = test_app().await;

        let (status, body) = send(&router, Method::POST, COLLECTION, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn when_description_is_updated_then_other_fields_are_kept_and_timestamp_refreshed() {
        let (_temp_dir, router) = test_app().await;
        let created = create_max_retries(&router).await;

        let (status, body) =
            send(&router, Method::PUT, &item_uri(&created), Some(json!({"descripcion": "tuning knob"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valor_parametro"], "5");
        assert_eq!(body["nombre_parametro"], "max_retries");
        assert_eq!(body["descripcion"], "tuning knob");
        assert!(body["ultima_modificacion"].as_str() >= created["ultima_modificacion"].as_str());
    }

    #[tokio::test]
    async fn when_value_is_updated_then_only_value_and_timestamp_change() {
        let (_temp_dir, router) = test_app().await;
        let (_, created) = send(
            &router,
            Method::POST,
            COLLECTION,
            Some(json!({
                "nombre_parametro": "timeout",
                "valor_parametro": "30",
                "tipo_dato": "int",
                "descripcion": "seconds"
            })),
        )
        .await;

        let (status, body) = send(&router, Method::PUT, &item_uri(&created), Some(json!({"valor_parametro": "X"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valor_parametro"], "X");
        for field in ["id", "nombre_parametro", "tipo_dato", "descripcion", "valor"] {
            assert_eq!(body[field], created[field], "field {field} should be unchanged");
        }
    }

    #[tokio::test]
    async fn when_update_has_only_unknown_keys_then_it_is_rejected_and_row_is_untouched() {
        let (_temp_dir, router) = test_app().await;
        let created = create_max_retries(&router).await;

        let (status, body) =
            send(&router, Method::PUT, &item_uri(&created), Some(json!({"valor": "legacy", "color": "red"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        let (_, stored) = send(&router, Method::GET, &item_uri(&created), None).await;
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn when_update_body_is_empty_then_it_is_rejected() {
        let (_temp_dir, router) = test_app().await;
        let created = create_max_retries(&router).await;

        let (status, _) = send(&router, Method::PUT, &item_uri(&created), Some(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn when_updated_parameter_does_not_exist_then_update_returns_not_found() {
        let (_temp_dir, router) = test_app().await;

        let (status, body) =
            send(&router, Method::PUT, &format!("{COLLECTION}/999"), Some(json!({"valor_parametro": "X"}))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn when_update_renames_to_existing_name_then_update_returns_conflict() {
        let (_temp_dir, router) = test_app().await;
        create_max_retries(&router).await;
        let (_, other) = send(
            &router,
            Method::POST,
            COLLECTION,
            Some(json!({"nombre_parametro": "timeout", "valor_parametro": "30"})),
        )
        .await;

        let (status, _) =
            send(&router, Method::PUT, &item_uri(&other), Some(json!({"nombre_parametro": "max_retries"}))).await;

        assert_eq!(status, StatusCode::CONFLICT);
        let (_, stored) = send(&router, Method::GET, &item_uri(&other), None).await;
        assert_eq!(stored, other);
    }

    #[tokio::test]
    async fn when_parameter_is_deleted_twice_then_second_delete_returns_not_found() {
        let (_temp_dir, router) = test_app().await;
        let created = create_max_retries(&router).await;

        let (first, body) = send(&router, Method::DELETE, &item_uri(&created), None).await;
        let (second, _) = send(&router, Method::DELETE, &item_uri(&created), None).await;

        assert_eq!(first, StatusCode::OK);
        assert!(body["message"].is_string());
        assert_eq!(second, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn when_parameter_does_not_exist_then_get_returns_not_found() {
        let (_temp_dir, router) = test_app().await;

        let (status, body) = send(&router, Method::GET, &format!("{COLLECTION}/42"), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn when_listing_then_legacy_value_is_excluded_but_get_one_includes_it() {
        let (_temp_dir, router) = test_app().await;
        let first = create_max_retries(&router).await;
        send(&router, Method::POST, COLLECTION, Some(json!({"nombre_parametro": "timeout", "valor_parametro": "30"})))
            .await;

        let (status, list) = send(&router, Method::GET, COLLECTION, None).await;
        let (_, single) = send(&router, Method::GET, &item_uri(&first), None).await;

        assert_eq!(status, StatusCode::OK);
        let items = list.as_array().expect("list should be an array");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["nombre_parametro"], "max_retries");
        assert_eq!(items[1]["nombre_parametro"], "timeout");
        assert!(items.iter().all(|item| item.get("valor").is_none()));
        assert!(single.get("valor").is_some());
    }

    #[tokio::test]
    async fn when_admin_page_is_requested_then_html_is_served() {
        let (_temp_dir, router) = test_app().await;

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/admin/parametros_seteos")
                    .body(Body::empty())
                    .expect("building request should be successful"),
            )
            .await
            .expect("router request should be successful");

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().expect("header should be text").to_owned();
        assert!(content_type.starts_with("text/html"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("reading body should be successful");
        assert!(String::from_utf8_lossy(&bytes).contains("parametros-table"));
    }

    #[tokio::test]
    async fn when_id_is_not_an_integer_then_item_routes_return_not_found_with_json_error() {
        let (_temp_dir, router) = test_app().await;

        for uri in [format!("{COLLECTION}/abc"), format!("{COLLECTION}/99999999999999999999")] {
            let (get_status, get_body) = send(&router, Method::GET, &uri, None).await;
            let (put_status, put_body) = send(&router, Method::PUT, &uri, Some(json!({"valor_parametro": "X"}))).await;
            let (delete_status, delete_body) = send(&router, Method::DELETE, &uri, None).await;

            assert_eq!(get_status, StatusCode::NOT_FOUND, "GET {uri}");
            assert_eq!(put_status, StatusCode::NOT_FOUND, "PUT {uri}");
            assert_eq!(delete_status, StatusCode::NOT_FOUND, "DELETE {uri}");
            assert!(get_body["error"].is_string());
            assert!(put_body["error"].is_string());
            assert!(delete_body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn when_id_exceeds_32_bits_then_the_row_is_still_addressable() {
        let (temp_dir, router) = test_app().await;
        let connection = SqliteConnectionProvider::new(&DatabaseConfig { path: temp_dir.path().join("soporte_db.db") })
            .open()
            .await
            .expect("opening connection should be successful");
        connection
            .execute_unprepared(
                "INSERT INTO parametros_seteos (id, nombre_parametro, valor_parametro) VALUES (3000000000, 'big', '1')",
            )
            .await
            .expect("inserting row should be successful");
        connection.close().await.expect("closing connection should be successful");

        let (status, body) = send(&router, Method::GET, &format!("{COLLECTION}/3000000000"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 3_000_000_000_i64);
        assert_eq!(body["nombre_parametro"], "big");
    }

    #[tokio::test]
    async fn when_database_cannot_be_opened_then_api_returns_internal_server_error_with_json_error() {
        let temp_dir = tempfile::tempdir().expect("creating temp dir should be successful");
        let connection_provider = Arc::new(SqliteConnectionProvider::new(&DatabaseConfig {
            path: temp_dir.path().join("missing").join("soporte_db.db"),
        }));
        let router = app(Arc::new(Application::new(connection_provider, Arc::new(SqliteParameterService))));

        let (list_status, list_body) = send(&router, Method::GET, COLLECTION, None).await;
        let (create_status, create_body) = send(
            &router,
            Method::POST,
            COLLECTION,
            Some(json!({"nombre_parametro": "max_retries", "valor_parametro": "5"})),
        )
        .await;

        assert_eq!(list_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(list_body["error"].is_string());
        assert_eq!(create_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(create_body["error"].is_string());
    }
}
