use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use services::ServiceError;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// ```json
/// {
///   "success": true,
///   "data": { "id": 1, "title": "Printer offline" },
///   "message": "Ticket retrieved successfully"
/// }
/// ```
///
/// Errors carry a machine-readable `code` as well:
///
/// ```json
/// {
///   "success": false,
///   "data": {},
///   "message": "Assignee must be an active IT staff member",
///   "code": "INVALID_ASSIGNEE"
/// }
/// ```
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Constructs a success response with the given data and message.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            code: None,
        }
    }

    /// Constructs an error response with a message and default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }
}

/// Placeholder payload for responses without data. Serializes as `{}`.
#[derive(Serialize, Default)]
pub struct Empty {}

/// Route-boundary error: every `ServiceError` becomes a status code plus the
/// JSON envelope.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(ServiceError::validation(message))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Unauthenticated
            | ServiceError::InvalidCredentials
            | ServiceError::AccountDeactivated => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_)
            | ServiceError::InvalidAssignee(_)
            | ServiceError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) | ServiceError::Db(_) | ServiceError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        let body = ApiResponse::<Empty>::error(message).with_code(self.0.code());
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: ServiceError) -> (StatusCode, Value) {
        let res = ApiError(err).into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn errors_carry_status_and_code() {
        let (status, json) = body_of(ServiceError::AccountDeactivated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "ACCOUNT_DEACTIVATED");

        let (status, json) =
            body_of(ServiceError::InvalidAssignee("Assignee must be staff".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_ASSIGNEE");
        assert_eq!(json["message"], "Assignee must be staff");

        let (status, _) = body_of(ServiceError::Conflict("dup".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, json) = body_of(ServiceError::Internal("disk on fire".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Internal server error");
        assert_eq!(json["code"], "INTERNAL_ERROR");
    }

    #[test]
    fn success_omits_code() {
        let json = serde_json::to_value(ApiResponse::success(1, "ok")).unwrap();
        assert!(json.get("code").is_none());
        assert_eq!(json["data"], 1);
    }
}
