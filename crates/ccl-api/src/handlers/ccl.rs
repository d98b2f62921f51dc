//! Client care letter HTTP handlers.
//!
//! - `POST /api/ccl` with `{ matterId, draftJson }`
//! - `PATCH /api/ccl/:matterId` with `{ draftJson }`
//! - `GET /api/ccl/:matterId`
//!
//! Create and update share one contract: `200 { ok: true, url }`, `400` for an
//! invalid payload, `500` when generation fails.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use ccl_core::{resolve_value, Draft, MergedFieldMap};

use crate::{ApiError, AppState};

const MATTER_ID_FIELD: &str = "matterId";
const DRAFT_FIELD: &str = "draftJson";

/// Response for create and update.
#[derive(Debug, Serialize)]
pub struct GenerateCclResponse {
    pub ok: bool,
    pub url: String,
}

/// Response for the read path. Absence is a normal `exists: false` answer.
#[derive(Debug, Serialize)]
pub struct ReadCclResponse {
    pub ok: bool,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<MergedFieldMap>,
}

fn payload_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Draft, ApiError> {
    match payload {
        Ok(Json(Value::Object(body))) => Ok(body),
        Ok(_) => Err(ApiError::BadRequest("Invalid payload".to_string())),
        Err(rejection) => {
            debug!(subsystem = "api", error = %rejection, "Rejected request body");
            Err(ApiError::BadRequest("Invalid payload".to_string()))
        }
    }
}

fn draft_object(body: &Draft) -> Result<&Draft, ApiError> {
    match body.get(DRAFT_FIELD) {
        Some(Value::Object(draft)) => Ok(draft),
        _ => Err(ApiError::BadRequest(format!(
            "{} must be an object",
            DRAFT_FIELD
        ))),
    }
}

/// Generate a CCL for the matter named in the body.
pub async fn create_ccl(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateCclResponse>, ApiError> {
    let body = payload_object(payload)?;
    let matter_id = resolve_value(body.get(MATTER_ID_FIELD), "");
    let draft = draft_object(&body)?;

    let url = state.ccl.generate(&matter_id, draft).await?;
    Ok(Json(GenerateCclResponse { ok: true, url }))
}

/// Regenerate the CCL for the matter in the path.
pub async fn update_ccl(
    State(state): State<AppState>,
    Path(matter_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateCclResponse>, ApiError> {
    let body = payload_object(payload)?;
    let draft = draft_object(&body)?;

    let url = state.ccl.generate(&matter_id, draft).await?;
    Ok(Json(GenerateCclResponse { ok: true, url }))
}

/// Report whether a CCL exists and return its merged-field snapshot.
pub async fn get_ccl(
    State(state): State<AppState>,
    Path(matter_id): Path<String>,
) -> Result<Json<ReadCclResponse>, ApiError> {
    let status = state.ccl.read(&matter_id).await?;
    Ok(Json(ReadCclResponse {
        ok: true,
        exists: status.exists,
        url: status.url,
        json: status.snapshot,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Draft {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_payload_must_be_object() {
        assert!(payload_object(Ok(Json(json!([1, 2])))).is_err());
        assert!(payload_object(Ok(Json(json!({ "matterId": "1" })))).is_ok());
    }

    #[test]
    fn test_draft_must_be_object() {
        let body = object(json!({ "draftJson": "not-an-object" }));
        assert!(matches!(draft_object(&body), Err(ApiError::BadRequest(_))));

        let body = object(json!({}));
        assert!(draft_object(&body).is_err());

        let body = object(json!({ "draftJson": {} }));
        assert!(draft_object(&body).unwrap().is_empty());
    }

    #[test]
    fn test_read_response_omits_absent_fields() {
        let value = serde_json::to_value(ReadCclResponse {
            ok: true,
            exists: false,
            url: None,
            json: None,
        })
        .unwrap();
        assert_eq!(value, json!({ "ok": true, "exists": false }));
    }
}
