use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;
use utoipauto::utoipauto;

#[utoipauto(paths = "./gridcast-server/src")]
#[derive(OpenApi)]
#[openapi(info(
    description = "gridcast-server exposes endpoints to manage a company's stream rooms"
))]
pub struct ApiDoc;

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
