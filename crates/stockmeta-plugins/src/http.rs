use stockmeta_core::{AppError, AppResult};

/// Longest error body carried into an [`AppError::Service`]
const MAX_ERROR_BODY_CHARS: usize = 300;

pub(crate) fn transport_error(service: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout(format!("{} request exceeded its deadline", service))
    } else {
        AppError::Network(format!("Failed to send request to {}: {}", service, err))
    }
}

/// Pass a success response through; turn anything else into `AppError::Service`
pub(crate) async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(AppError::Service {
        service,
        status: status.as_u16(),
        body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}

pub(crate) async fn read_body(service: &str, response: reqwest::Response) -> AppResult<String> {
    response
        .text()
        .await
        .map_err(|e| transport_error(service, e))
}
