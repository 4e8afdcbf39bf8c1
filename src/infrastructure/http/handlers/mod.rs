//! HTTP Handlers

mod dimensions;
mod novel;
mod ping;
mod reference;
mod session;

pub use dimensions::*;
pub use novel::*;
pub use ping::*;
pub use reference::*;
pub use session::*;

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        Router,
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    /// 发送 JSON POST 并解析响应体
    pub async fn post_json(app: &Router, uri: &str, body: Value) -> Value {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        read_json(app, request).await
    }

    pub async fn get_json(app: &Router, uri: &str) -> Value {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        read_json(app, request).await
    }

    async fn read_json(app: &Router, request: Request<Body>) -> Value {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), 200);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
