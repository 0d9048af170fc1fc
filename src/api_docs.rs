use crate::errors::{ErrorResponse, FieldIssue};
use crate::handlers;
use crate::models::{ApiResponse, DeleteUserRequest};
use utoipa::OpenApi;

/// OpenAPI description of the HTTP surface, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(title = "Logistics Dashboard API"),
    paths(
        handlers::health,
        handlers::delete_user,
        handlers::get_lead,
        handlers::search_leads,
        handlers::list_orders,
        handlers::list_inventory,
        handlers::list_users,
    ),
    components(schemas(ApiResponse, ErrorResponse, FieldIssue, DeleteUserRequest)),
    tags(
        (name = "users", description = "User management"),
        (name = "crm", description = "CRM lead lookup and search"),
        (name = "collections", description = "Dashboard collections"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route() {
        let spec = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = spec["paths"].as_object().unwrap();

        for path in [
            "/health",
            "/api/users/delete",
            "/api/crm/lead",
            "/api/crm/leads/search",
            "/api/orders",
            "/api/inventory",
            "/api/users",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }
}
