//! HTTP façade over the schema query engine.
//!
//! The server keeps a frozen snapshot (plus registry and species catalog)
//! in memory behind `Arc` and answers each request independently; no state
//! is shared between requests beyond those read-only structures.
//!
//! Surface:
//!
//! - `GET /data/schema/{className}` — FULL page (cap 25)
//! - `GET /data/schema/{className}/min` — MINIMAL page (cap 20000)
//! - `GET /data/schema/{className}/reference` — REFERENCE page (cap 20000)
//! - `GET /data/schema/{className}/count` — exact count
//! - `GET /healthz`
//!
//! Error mapping: engine user errors (unknown class, invalid filter, invalid
//! page) are 400; a well-formed query with an empty page is 404; backend
//! failure or timeout is 503. Engine calls run on the blocking pool under a
//! per-request timeout so a slow backend cannot pin a worker; on timeout the
//! handler stops waiting and reports the backend unavailable.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;
use url::form_urlencoded;

use pathatlas_schema::{
    BackendError, ProjectionLevel, SchemaBackend, SchemaQueryError, SchemaQueryService,
};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Ceiling on one engine call, backend time included.
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: ([127, 0, 0, 1], 8701).into(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

struct ServerState<B> {
    service: Arc<SchemaQueryService<B>>,
    request_timeout: Duration,
}

/// Bind and serve until the process is stopped.
pub async fn serve<B>(config: ServerConfig, service: Arc<SchemaQueryService<B>>) -> Result<()>
where
    B: SchemaBackend + 'static,
{
    let state = Arc::new(ServerState {
        service,
        request_timeout: config.request_timeout,
    });

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|e| anyhow!("failed to bind {}: {e}", config.listen))?;
    let bound = listener
        .local_addr()
        .map_err(|e| anyhow!("failed to read bound addr: {e}"))?;

    tracing::info!(addr = %bound, "schema query server listening");

    loop {
        let (stream, _peer) = listener
            .accept()
            .await
            .map_err(|e| anyhow!("accept failed: {e}"))?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle_request(req, state.clone()));
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                tracing::debug!(error = %e, "connection error");
            }
        });
    }
}

// ============================================================================
// Routing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaRoute {
    Records(ProjectionLevel),
    Count,
}

/// Parse `/data/schema/{className}[/min|/reference|/count]`.
fn parse_schema_route(path: &str) -> Option<(String, SchemaRoute)> {
    let rest = path.strip_prefix("/data/schema/")?;
    let mut segments = rest.split('/');
    let class = segments.next().filter(|s| !s.is_empty())?;
    let route = match segments.next() {
        None => SchemaRoute::Records(ProjectionLevel::Full),
        Some("min") => SchemaRoute::Records(ProjectionLevel::Minimal),
        Some("reference") => SchemaRoute::Records(ProjectionLevel::Reference),
        Some("count") => SchemaRoute::Count,
        Some(_) => return None,
    };
    if segments.next().is_some() {
        return None;
    }
    Some((class.to_string(), route))
}

#[derive(Debug, Default, PartialEq, Eq)]
struct QueryParams {
    species: Option<String>,
    page: Option<i64>,
    offset: Option<i64>,
}

fn parse_query_params(query: Option<&str>) -> Result<QueryParams, String> {
    let mut params = QueryParams::default();
    let Some(query) = query else {
        return Ok(params);
    };
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "species" => params.species = Some(value.into_owned()),
            "page" => params.page = Some(parse_int_param("page", &value)?),
            "offset" => params.offset = Some(parse_int_param("offset", &value)?),
            // Unknown parameters are ignored, matching the wider API surface.
            _ => {}
        }
    }
    Ok(params)
}

fn parse_int_param(name: &str, raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("parameter `{name}` must be an integer (got `{raw}`)"))
}

// ============================================================================
// Handlers
// ============================================================================

async fn handle_request<B>(
    req: Request<Incoming>,
    state: Arc<ServerState<B>>,
) -> Result<Response<Full<Bytes>>, hyper::Error>
where
    B: SchemaBackend + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let resp = match (&method, path.as_str()) {
        (&Method::GET, "/healthz") => text_response(StatusCode::OK, "ok\n"),
        (&Method::GET, path) => match parse_schema_route(path) {
            Some((class, SchemaRoute::Records(level))) => {
                handle_schema_records(&state, class, level, query.as_deref()).await
            }
            Some((class, SchemaRoute::Count)) => {
                handle_schema_count(&state, class, query.as_deref()).await
            }
            None => json_error(StatusCode::NOT_FOUND, "unknown endpoint"),
        },
        _ => json_error(StatusCode::METHOD_NOT_ALLOWED, "only GET is supported"),
    };

    tracing::debug!(%method, %path, status = resp.status().as_u16(), "request handled");
    Ok(resp)
}

async fn handle_schema_records<B>(
    state: &ServerState<B>,
    class: String,
    level: ProjectionLevel,
    query: Option<&str>,
) -> Response<Full<Bytes>>
where
    B: SchemaBackend + 'static,
{
    let params = match parse_query_params(query) {
        Ok(params) => params,
        Err(msg) => return json_error(StatusCode::BAD_REQUEST, &msg),
    };
    let Some(page) = params.page else {
        return json_error(StatusCode::BAD_REQUEST, "missing required parameter `page`");
    };
    let Some(offset) = params.offset else {
        return json_error(StatusCode::BAD_REQUEST, "missing required parameter `offset`");
    };

    let species = params.species;
    let outcome = {
        let class = class.clone();
        run_engine(state, move |service| {
            service.records(&class, species.as_deref(), page, offset, level)
        })
        .await
    };

    match outcome {
        Err(e) => json_error(status_for(&e), &e.to_string()),
        Ok(result) if result.is_empty() => json_error(
            StatusCode::NOT_FOUND,
            &format!("no entries found for class `{class}`"),
        ),
        Ok(result) => json_response(StatusCode::OK, &result.records),
    }
}

async fn handle_schema_count<B>(
    state: &ServerState<B>,
    class: String,
    query: Option<&str>,
) -> Response<Full<Bytes>>
where
    B: SchemaBackend + 'static,
{
    let params = match parse_query_params(query) {
        Ok(params) => params,
        Err(msg) => return json_error(StatusCode::BAD_REQUEST, &msg),
    };

    let species = params.species;
    let species_label = species.clone();
    let outcome = {
        let class = class.clone();
        run_engine(state, move |service| {
            service.count_entries(&class, species.as_deref())
        })
        .await
    };

    match outcome {
        Err(e) => json_error(status_for(&e), &e.to_string()),
        // A species was named and nothing is annotated for it: the count
        // endpoint reports that as not-found rather than a bare zero.
        Ok(0) if species_label.is_some() => json_error(
            StatusCode::NOT_FOUND,
            &format!(
                "no entries have been found for species `{}`",
                species_label.as_deref().unwrap_or_default()
            ),
        ),
        Ok(count) => json_response(StatusCode::OK, &count),
    }
}

/// Run one engine call on the blocking pool under the per-request timeout.
///
/// Timeout and worker loss both surface as `BackendUnavailable`: the caller
/// gets a retryable 503 either way, never a fabricated empty result.
async fn run_engine<B, T, F>(state: &ServerState<B>, op: F) -> Result<T, SchemaQueryError>
where
    B: SchemaBackend + 'static,
    T: Send + 'static,
    F: FnOnce(&SchemaQueryService<B>) -> Result<T, SchemaQueryError> + Send + 'static,
{
    let service = state.service.clone();
    let task = tokio::task::spawn_blocking(move || op(service.as_ref()));

    match tokio::time::timeout(state.request_timeout, task).await {
        Err(_elapsed) => Err(SchemaQueryError::BackendUnavailable(BackendError::Timeout)),
        Ok(Err(join_err)) => Err(SchemaQueryError::BackendUnavailable(BackendError::Io(
            format!("query worker failed: {join_err}"),
        ))),
        Ok(Ok(result)) => result,
    }
}

fn status_for(err: &SchemaQueryError) -> StatusCode {
    match err {
        SchemaQueryError::TypeNotFound { .. }
        | SchemaQueryError::InvalidFilter(_)
        | SchemaQueryError::InvalidPage(_) => StatusCode::BAD_REQUEST,
        SchemaQueryError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

// ============================================================================
// Response helpers
// ============================================================================

fn text_response(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from_static(b"internal error"))))
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{\"error\":\"serialize\"}".to_vec());
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from_static(b"{\"error\":\"internal\"}"))))
}

fn json_error(status: StatusCode, msg: &str) -> Response<Full<Bytes>> {
    let v = serde_json::json!({ "error": msg });
    json_response(status, &v)
}
