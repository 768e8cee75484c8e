use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health,
        crate::handlers::list_categories,
        crate::handlers::create_category,
        crate::handlers::delete_category,
        crate::handlers::list_ideas,
        crate::handlers::create_idea,
        crate::handlers::update_idea,
        crate::handlers::delete_idea,
        crate::handlers::process_idea
    ),
    components(
        schemas(
            sparks_core::types::Idea,
            sparks_core::types::Category,
            sparks_core::types::AiResult,
            sparks_core::types::IdeaDraft,
            sparks_core::types::IdeaPatch,
            sparks_core::types::Priority,
            sparks_core::types::Status,
            crate::handlers::HealthResponse,
            crate::handlers::ProcessRequest,
            crate::handlers::CreateCategoryRequest,
            crate::error::ErrorResponse
        )
    ),
    tags(
        (name = "sparks", description = "Idea capture API")
    )
)]
pub struct ApiDoc;
