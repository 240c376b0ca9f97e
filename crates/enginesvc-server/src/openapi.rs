use utoipa::OpenApi;

use enginesvc_core::transport::{ErrorBody, GetEngineResponse, RegisterEngineResponse};
use enginesvc_core::Engine;

#[derive(OpenApi)]
#[openapi(
    paths(crate::routes::register_engine, crate::routes::get_engine),
    components(schemas(Engine, RegisterEngineResponse, GetEngineResponse, ErrorBody)),
    tags((name = "engines", description = "Engine registry"))
)]
pub struct ApiDoc;
