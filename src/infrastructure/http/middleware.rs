//! HTTP Middleware
//!
//! HTTP 状态码错误与慢请求日志中间件

use std::time::{Duration, Instant};

use axum::{extract::Request, middleware::Next, response::Response};

/// 超过该耗时的非生成类请求记为慢请求
const SLOW_REQUEST: Duration = Duration::from_secs(2);

/// HTTP 状态码错误日志中间件
///
/// 状态码为 4xx/5xx 时记录日志；业务错误（errno != 0）在 ApiError::into_response() 中记录。
/// 大纲生成接口会同步等待 LLM，不计入慢请求。
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP client error"
        );
    } else if started.elapsed() > SLOW_REQUEST && !uri.path().contains("/outline/") {
        tracing::warn!(
            method = %method,
            uri = %uri,
            elapsed_ms = elapsed_ms,
            "Slow request"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use tower::util::ServiceExt;

    async fn rejected() -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }

    async fn crashed() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    #[tokio::test]
    async fn test_status_passes_through() {
        let app = Router::new()
            .route("/api/novel/get", post(rejected))
            .route("/api/novel/outline/generate", post(crashed))
            .layer(axum::middleware::from_fn(error_logging_middleware));

        let response = app
            .clone()
            .oneshot(
                HttpRequest::post("/api/novel/get")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .oneshot(
                HttpRequest::post("/api/novel/outline/generate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
