use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

// ============ Collection Records ============

/// A record type stored in a fixed top-level collection.
pub trait CollectionRecord: DeserializeOwned {
    /// Name of the collection the records live in.
    const COLLECTION: &'static str;
}

/// An order document. Fields are schemaless and passed through as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Database-assigned document identifier.
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CollectionRecord for Order {
    const COLLECTION: &'static str = "orders";
}

/// An inventory item document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Database-assigned document identifier.
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CollectionRecord for InventoryItem {
    const COLLECTION: &'static str = "inventory";
}

/// A user profile document, keyed by the identity-provider `uid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Same value as the identity-provider `uid`.
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CollectionRecord for UserRecord {
    const COLLECTION: &'static str = "users";
}

// ============ API Request Models ============

/// Body of `POST /api/users/delete`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct DeleteUserRequest {
    /// Identity-provider user identifier.
    pub uid: String,
}

/// Query parameters of `GET /api/crm/lead`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadQueryParams {
    /// CRM lead identifier.
    #[serde(rename = "leadId")]
    pub lead_id: Option<String>,
}

/// Query parameters of `GET /api/crm/leads/search`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadSearchParams {
    /// Free-text search forwarded to the CRM.
    pub query: Option<String>,
}

// ============ API Response Models ============

/// Successful response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    /// Upstream payload, relayed verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Number of leads in a CRM search payload (`_embedded.leads`), 0 if absent.
pub fn embedded_lead_count(payload: &Value) -> usize {
    payload
        .pointer("/_embedded/leads")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_lead_count() {
        assert_eq!(
            embedded_lead_count(&json!({"_embedded": {"leads": [{}, {}, {}]}})),
            3
        );
        assert_eq!(embedded_lead_count(&json!({"_embedded": {}})), 0);
        assert_eq!(embedded_lead_count(&json!({"_embedded": {"leads": "x"}})), 0);
        assert_eq!(embedded_lead_count(&json!([])), 0);
    }

    #[test]
    fn test_record_flattens_fields() {
        let order: Order = serde_json::from_value(json!({
            "id": "ord-1",
            "status": "in_transit",
            "items": 4
        }))
        .unwrap();

        assert_eq!(order.id, "ord-1");
        assert_eq!(order.fields["status"], "in_transit");
        assert!(!order.fields.contains_key("id"));

        let back = serde_json::to_value(&order).unwrap();
        assert_eq!(back, json!({"id": "ord-1", "status": "in_transit", "items": 4}));
    }

    #[test]
    fn test_lead_query_uses_camel_case() {
        let params: LeadQueryParams = serde_json::from_value(json!({"leadId": "17"})).unwrap();
        assert_eq!(params.lead_id.as_deref(), Some("17"));
    }
}
