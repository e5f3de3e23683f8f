use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct MemoryRecordDoc { pub key: String, pub value: String }

#[derive(ToSchema)]
pub struct KeyDoc { pub key: String }

#[derive(ToSchema)]
pub struct ChatRequestDoc { pub prompt: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::memory::list,
        crate::routes::memory::add,
        crate::routes::memory::get,
        crate::routes::memory::delete,
        crate::routes::chat::chat,
    ),
    components(
        schemas(
            HealthResponse,
            MemoryRecordDoc,
            KeyDoc,
            ChatRequestDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "memory"),
        (name = "chat")
    )
)]
pub struct ApiDoc;
