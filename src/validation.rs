use crate::errors::{AppError, FieldIssue};
use crate::models::DeleteUserRequest;
use serde_json::Value;

/// Validates the body of a user deletion request.
///
/// `uid` must be present, a string, and non-empty. Every problem is reported
/// as a field-level issue.
pub fn validate_delete_user(body: &Value) -> Result<DeleteUserRequest, AppError> {
    let Some(object) = body.as_object() else {
        return Err(AppError::Validation(vec![FieldIssue::new(
            "uid",
            "Expected an object with a uid field",
        )]));
    };

    match object.get("uid") {
        None | Some(Value::Null) => Err(AppError::Validation(vec![FieldIssue::new(
            "uid",
            "uid is required",
        )])),
        Some(Value::String(uid)) if uid.is_empty() => Err(AppError::Validation(vec![
            FieldIssue::new("uid", "uid must not be empty"),
        ])),
        Some(Value::String(uid)) => Ok(DeleteUserRequest { uid: uid.clone() }),
        Some(_) => Err(AppError::Validation(vec![FieldIssue::new(
            "uid",
            "uid must be a string",
        )])),
    }
}

/// Returns the value of a required, non-empty query parameter.
pub fn required_param(name: &str, value: Option<String>) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing required query parameter: {}", name)))
}

/// True for `.` and `..`, which URL path handling drops instead of encoding.
///
/// An identifier like this can never address a single record.
pub fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dot_segments_detected() {
        assert!(is_dot_segment("."));
        assert!(is_dot_segment(".."));
        assert!(!is_dot_segment("..."));
        assert!(!is_dot_segment(".hidden"));
        assert!(!is_dot_segment("u-1"));
    }

    fn issue_fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(issues) => issues.into_iter().map(|i| i.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_uid_accepted() {
        let request = validate_delete_user(&json!({"uid": "u-123"})).unwrap();
        assert_eq!(request.uid, "u-123");
    }

    #[test]
    fn test_empty_uid_rejected() {
        let err = validate_delete_user(&json!({"uid": ""})).unwrap_err();
        assert_eq!(issue_fields(err), vec!["uid"]);
    }

    #[test]
    fn test_missing_or_mistyped_uid_rejected() {
        for body in [json!({}), json!({"uid": null}), json!({"uid": 42}), json!("uid")] {
            let err = validate_delete_user(&body).unwrap_err();
            assert_eq!(issue_fields(err), vec!["uid"]);
        }
    }

    #[test]
    fn test_required_param() {
        assert_eq!(required_param("leadId", Some("9".into())).unwrap(), "9");
        assert!(matches!(
            required_param("leadId", Some("  ".into())),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            required_param("query", None),
            Err(AppError::BadRequest(msg)) if msg.contains("query")
        ));
    }
}
