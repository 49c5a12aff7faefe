//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::Request,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// Bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest body, in bytes, that is read into memory for logging.
///
/// Larger requests are rejected with 413 Payload Too Large. Larger responses
/// are passed through without logging their body.
pub const LOG_BODY_READ_LIMIT: usize = 2 * 1024 * 1024;

/// JSON fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "token"];

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords and tokens in JSON bodies and the `Authorization` header are
/// never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    if exceeds_read_limit(&body) {
        tracing::info!(
            "Rejected request {} {} with a body over {LOG_BODY_READ_LIMIT} bytes",
            parts.method,
            parts.uri
        );
        return Error::PayloadTooLarge(LOG_BODY_READ_LIMIT).into_response();
    }

    // Chunked bodies carry no length up front, so the limit is enforced while reading.
    let body_bytes = match axum::body::to_bytes(body, LOG_BODY_READ_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::info!("Could not read request body within {LOG_BODY_READ_LIMIT} bytes: {error}");
            return Error::PayloadTooLarge(LOG_BODY_READ_LIMIT).into_response();
        }
    };

    log_request(
        &parts.method,
        &parts.uri,
        &parts.headers,
        &body_for_log(&body_bytes),
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();

    if !fits_read_limit(&body) {
        log_response(parts.status, &parts.headers, "<not logged, too large or streamed>");
        return Response::from_parts(parts, body);
    }

    let body_bytes = match axum::body::to_bytes(body, LOG_BODY_READ_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_response(parts.status, &parts.headers, &body_for_log(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Whether `body` is known to be longer than [LOG_BODY_READ_LIMIT] bytes.
fn exceeds_read_limit(body: &Body) -> bool {
    body.size_hint().lower() > LOG_BODY_READ_LIMIT as u64
}

/// Whether `body` is known to fit in [LOG_BODY_READ_LIMIT] bytes.
fn fits_read_limit(body: &Body) -> bool {
    body.size_hint()
        .upper()
        .is_some_and(|upper| upper <= LOG_BODY_READ_LIMIT as u64)
}

/// Render a body for the logs with sensitive JSON fields redacted.
fn body_for_log(body: &Bytes) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(mut json) => {
            redact(&mut json);
            json.to_string()
        }
        Err(_) => String::from_utf8_lossy(body).to_string(),
    }
}

fn redact(json: &mut Value) {
    match json {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *value = Value::String(REDACTED.to_owned());
                } else {
                    redact(value);
                }
            }
        }
        Value::Array(values) => values.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Headers without the ones that carry credentials.
fn loggable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();
    headers.remove(AUTHORIZATION);
    headers
}

/// The longest prefix of `text` that fits in `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_request(
    method: &axum::http::Method,
    uri: &axum::http::Uri,
    headers: &HeaderMap,
    body: &str,
) {
    let headers = loggable_headers(headers);

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {method} {uri} {headers:?}\nbody: {}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full request body: {body}");
    } else {
        tracing::info!("Received request: {method} {uri} {headers:?}\nbody: {body}");
    }
}

fn log_response(status: StatusCode, headers: &HeaderMap, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {status} {headers:?}\nbody: {}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full response body: {body}");
    } else {
        tracing::info!("Sending response: {status} {headers:?}\nbody: {body}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        body::{Body, Bytes},
        http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION},
        middleware,
        routing::post,
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{
        LOG_BODY_READ_LIMIT, body_for_log, exceeds_read_limit, fits_read_limit, logging_middleware,
        loggable_headers, truncate,
    };

    #[test]
    fn redacts_passwords_and_tokens() {
        let body = Bytes::from(r#"{"username":"alice","password":"hunter22","token":"abc"}"#);

        let logged: Value = serde_json::from_str(&body_for_log(&body)).unwrap();

        assert_eq!(
            logged,
            json!({"username": "alice", "password": "********", "token": "********"})
        );
    }

    #[test]
    fn redacts_nested_fields() {
        let body = Bytes::from(r#"[{"user":{"password":"hunter22"}}]"#);

        let logged = body_for_log(&body);

        assert!(!logged.contains("hunter22"));
    }

    #[test]
    fn non_json_bodies_are_logged_as_text() {
        let body = Bytes::from("plain text");

        assert_eq!(body_for_log(&body), "plain text");
    }

    #[test]
    fn drops_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        headers.insert("x-request-id", HeaderValue::from_static("42"));

        let headers = loggable_headers(&headers);

        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get("x-request-id").is_some());
    }

    #[test]
    fn truncates_on_character_boundary() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        async fn echo(Json(body): Json<Value>) -> Json<Value> {
            Json(body)
        }

        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let body = json!({"password": "hunter22", "note": "x".repeat(100)});

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), body);
    }

    #[test]
    fn read_limit_uses_body_length() {
        let small = Body::from(vec![b'x'; 16]);
        let large = Body::from(vec![b'x'; LOG_BODY_READ_LIMIT + 1]);

        assert!(!exceeds_read_limit(&small));
        assert!(fits_read_limit(&small));
        assert!(exceeds_read_limit(&large));
        assert!(!fits_read_limit(&large));
    }

    #[tokio::test]
    async fn rejects_oversized_request_bodies() {
        async fn echo(body: Bytes) -> Bytes {
            body
        }

        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/echo")
            .bytes(Bytes::from(vec![b'x'; LOG_BODY_READ_LIMIT + 1]))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.json::<Value>()["error"].is_string());
    }
}
