use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

const ADMIN_PAGE: &str = include_str!("../../../../static/parametros_seteos.html");
const ADMIN_SCRIPT: &str = include_str!("../../../../static/js/script.js");

pub(crate) fn router() -> axum::Router {
    Router::new()
        .route("/admin/parametros_seteos", get(handle_get_admin_page))
        .route("/static/js/script.js", get(handle_get_admin_script))
}

async fn handle_get_admin_page() -> Html<&'static str> {
    Html(ADMIN_PAGE)
}

async fn handle_get_admin_script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], ADMIN_SCRIPT)
}
