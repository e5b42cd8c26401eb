use crate::routes::{downloads, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "tunedl-server",
    description = "Asynchronous URL-to-audio download service",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(downloads::DownloadsApi::openapi());
    root
}
