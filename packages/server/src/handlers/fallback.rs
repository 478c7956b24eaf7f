use axum::http::{HeaderName, Method, StatusCode, header};

use crate::error::AppError;

/// Any method a route does not register.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Any path outside the API.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not found".into())
}

/// Answer a bare `OPTIONS` request (one without CORS preflight headers) with
/// an empty 200 listing the route's methods.
pub fn options_response(methods: &[Method]) -> (StatusCode, [(HeaderName, String); 2]) {
    let allow = methods
        .iter()
        .map(Method::as_str)
        .chain(std::iter::once("OPTIONS"))
        .collect::<Vec<_>>()
        .join(", ");
    (
        StatusCode::OK,
        [
            (header::ALLOW, allow.clone()),
            (header::ACCESS_CONTROL_ALLOW_METHODS, allow),
        ],
    )
}
