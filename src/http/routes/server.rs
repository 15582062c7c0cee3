//! Routes serving information about the server itself

use crate::config::VERSION;
use axum::{routing::get, Json, Router};
use serde::Serialize;

/// Server identifier
const SERVER_NAME: &str = "FIFA Player Stats Server";

/// Router function creates a new router with all the underlying
/// routes for this file.
///
/// Prefix: /api/server
pub fn router() -> Router {
    Router::new().route("/", get(server_details))
}

/// Response detailing the information about this server
#[derive(Serialize)]
struct ServerDetails {
    name: &'static str,
    version: &'static str,
}

/// GET /api/server
///
/// Allows clients to identify the server and its version
async fn server_details() -> Json<ServerDetails> {
    Json(ServerDetails {
        name: SERVER_NAME,
        version: VERSION,
    })
}

#[cfg(test)]
mod test {
    use super::router;
    use crate::config::VERSION;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_server_details() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["version"], VERSION);
        assert_eq!(value["name"], "FIFA Player Stats Server");
    }
}
