use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};

/// Methods allowed for cross origin requests
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Middleware layer function for appending CORS headers to requests
/// and responding to preflight requests
///
/// `req`  The request to handle
/// `next` The next layer to use
pub async fn cors_layer(req: Request, next: Next) -> Response {
    let mut res: Response = if req.method() == Method::OPTIONS {
        let mut res = Response::default();
        *res.status_mut() = StatusCode::NO_CONTENT;
        let headers = res.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        );
        res
    } else {
        next.run(req).await
    };

    res.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    res
}

#[cfg(test)]
mod test {
    use super::{cors_layer, ALLOWED_METHODS};
    use axum::{
        body::Body,
        http::{
            header::{
                ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
                ACCESS_CONTROL_ALLOW_ORIGIN,
            },
            Method, Request, StatusCode,
        },
        middleware::from_fn,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async {}))
            .layer(from_fn(cors_layer))
    }

    #[tokio::test]
    async fn test_options() {
        let req = Request::builder()
            .uri("/")
            .method(Method::OPTIONS)
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let headers = res.headers();
        let allowed_methods = headers
            .get(ACCESS_CONTROL_ALLOW_METHODS)
            .expect("Missing allowed methods header");
        assert_eq!(allowed_methods.to_str().unwrap(), ALLOWED_METHODS);

        let allowed_headers = headers
            .get(ACCESS_CONTROL_ALLOW_HEADERS)
            .expect("Missing allowed headers header");
        assert_eq!(allowed_headers.to_str().unwrap(), "*");

        let allowed_origin = headers
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("Missing allowed origin header");
        assert_eq!(allowed_origin.to_str().unwrap(), "*");
    }

    #[tokio::test]
    async fn test_get() {
        let req = Request::builder()
            .uri("/")
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);

        let allowed_origin = res
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("Missing allowed origin header");
        assert_eq!(allowed_origin.to_str().unwrap(), "*");
    }
}
