use crate::config::Config;
use crate::crm_client::CrmClient;
use crate::db::Database;
use crate::db_storage::CollectionReader;
use crate::errors::{AppError, ResultExt};
use crate::identity_client::IdentityClient;
use crate::models::*;
use crate::validation::{required_param, validate_delete_user};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Every client is built once at startup and handed to the router; handlers
/// never reach for process-wide globals.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Firestore administrative client.
    pub db: Database,
    /// Typed read access to the dashboard collections.
    pub collections: CollectionReader,
    /// Identity provider (Firebase Authentication) admin client.
    pub identity: IdentityClient,
    /// CRM lead API client.
    pub crm: CrmClient,
}

impl AppState {
    /// Builds every client from the configuration.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let tokens = crate::credentials::AccessTokenProvider::from_config(&config)?;
        let db = Database::new(&config, tokens.clone())?;
        let identity = IdentityClient::new(&config, tokens)?;
        let crm = CrmClient::from_config(&config)?;

        Ok(Self {
            collections: CollectionReader::new(db.clone()),
            config,
            db,
            identity,
            crm,
        })
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-logistics-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/users/delete
///
/// Deletes the identity-provider account for `uid`, then the `users/{uid}`
/// document. The two deletes are independent: if the second fails the first
/// is not rolled back.
///
/// # Returns
///
/// * `200` - both deletes succeeded.
/// * `400` - body failed validation.
/// * `500` - account missing ("User not found") or any other failure.
#[utoipa::path(
    post,
    path = "/api/users/delete",
    tag = "users",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "User deleted", body = ApiResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "User not found or internal error", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        AppError::Validation(vec![crate::errors::FieldIssue::new(
            "body",
            rejection.body_text(),
        )])
    })?;
    let DeleteUserRequest { uid } = validate_delete_user(&body)?;

    tracing::info!("POST /api/users/delete - uid: {}", uid);

    state
        .identity
        .delete_user(&uid)
        .await
        .map_err(collapse_delete_error)?;

    state
        .db
        .delete_document(UserRecord::COLLECTION, &uid)
        .await
        .with_context(|| format!("deleting users/{}", uid))
        .map_err(|e| {
            tracing::error!("Identity account {} deleted but its document was not: {}", uid, e);
            collapse_delete_error(e)
        })?;

    tracing::info!("User {} deleted", uid);
    Ok(Json(ApiResponse::ok(
        format!("User {} deleted successfully", uid),
        None,
    )))
}

/// Keeps "user not found" distinct; everything else becomes a generic 500.
fn collapse_delete_error(err: AppError) -> AppError {
    match err.root() {
        AppError::UserNotFound(uid) => AppError::UserNotFound(uid.clone()),
        _ => AppError::InternalError(err.to_string()),
    }
}

/// GET /api/crm/lead?leadId=
///
/// Looks a lead up in the CRM and relays the record verbatim.
#[utoipa::path(
    get,
    path = "/api/crm/lead",
    tag = "crm",
    responses(
        (status = 200, description = "Lead found", body = ApiResponse),
        (status = 400, description = "Missing leadId", body = ErrorResponse),
        (status = 404, description = "Lead not found or CRM error", body = ErrorResponse),
        (status = 500, description = "CRM call failed", body = ErrorResponse)
    )
)]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeadQueryParams>,
) -> Result<Json<ApiResponse>, AppError> {
    let lead_id = required_param("leadId", params.lead_id)?;
    tracing::info!("GET /api/crm/lead - leadId: {}", lead_id);

    match state.crm.get_lead(&lead_id).await? {
        Some(lead) => Ok(Json(ApiResponse::ok(
            "Lead retrieved successfully",
            Some(lead),
        ))),
        None => Err(AppError::NotFound(
            "Lead not found or CRM error".to_string(),
        )),
    }
}

/// GET /api/crm/leads/search?query=
///
/// Searches CRM leads. The message reports how many leads came back in
/// `_embedded.leads`; the payload itself is relayed verbatim.
#[utoipa::path(
    get,
    path = "/api/crm/leads/search",
    tag = "crm",
    responses(
        (status = 200, description = "Search completed", body = ApiResponse),
        (status = 400, description = "Missing query", body = ErrorResponse),
        (status = 500, description = "No results, CRM error or call failure", body = ErrorResponse)
    )
)]
pub async fn search_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeadSearchParams>,
) -> Result<Json<ApiResponse>, AppError> {
    let query = required_param("query", params.query)?;
    tracing::info!("GET /api/crm/leads/search - query: {}", query);

    let Some(result) = state.crm.search_leads(&query).await? else {
        return Err(AppError::Upstream(
            "No leads found or CRM error".to_string(),
        ));
    };

    let count = embedded_lead_count(&result);
    tracing::info!("CRM search '{}' returned {} lead(s)", query, count);

    Ok(Json(ApiResponse::ok(
        format!("Found {} leads", count),
        Some(result),
    )))
}

/// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "collections",
    responses((status = 200, description = "All orders; empty when the read fails"))
)]
pub async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.collections.orders().await)
}

/// GET /api/inventory
#[utoipa::path(
    get,
    path = "/api/inventory",
    tag = "collections",
    responses((status = 200, description = "All inventory items; empty when the read fails"))
)]
pub async fn list_inventory(State(state): State<Arc<AppState>>) -> Json<Vec<InventoryItem>> {
    Json(state.collections.inventory().await)
}

/// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "collections",
    responses((status = 200, description = "All user profiles; empty when the read fails"))
)]
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<UserRecord>> {
    Json(state.collections.users().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_keeps_user_not_found() {
        use crate::errors::ResultExt;

        let err: Result<(), AppError> = Err(AppError::UserNotFound("u1".into()));
        let err = err.context("deleting account").unwrap_err();

        assert!(matches!(
            collapse_delete_error(err),
            AppError::UserNotFound(uid) if uid == "u1"
        ));
    }

    #[test]
    fn test_collapse_hides_other_errors() {
        let err = AppError::ExternalApiError("Firestore returned 503".into());
        assert!(matches!(
            collapse_delete_error(err),
            AppError::InternalError(_)
        ));
    }
}
