//! Callback listener for the provider's SMS webhook

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode, header::CONTENT_TYPE},
};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use twicat_core::RunContext;

use crate::error::{FormError, Result, WebhookError};
use crate::form::FormValues;
use crate::sink::{IncomingMessage, MessageSink};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Listener state shared with the handler
#[derive(Clone)]
struct ListenerState {
    sink: Arc<dyn MessageSink>,
}

/// HTTP listener bound to an OS-assigned port
pub struct CallbackListener {
    listener: TcpListener,
    port: u16,
    state: ListenerState,
    ctx: RunContext,
}

impl CallbackListener {
    /// Bind `host` on a free port. Nothing is served until [`serve`](Self::serve).
    pub async fn bind(host: &str, sink: Arc<dyn MessageSink>, ctx: RunContext) -> Result<Self> {
        let listener = TcpListener::bind((host, 0))
            .await
            .map_err(|source| WebhookError::Bind {
                addr: format!("{}:0", host),
                source,
            })?;
        let port = listener.local_addr()?.port();

        debug!(port, "Callback listener bound");

        Ok(Self {
            listener,
            port,
            state: ListenerState { sink },
            ctx,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve on the current task until the run context is cancelled
    pub async fn serve(self) -> Result<()> {
        info!("Starting callback listener on port {}", self.port);

        let app = Router::new()
            .fallback(handle_callback)
            .with_state(self.state);

        let ctx = self.ctx;
        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move { ctx.cancelled().await })
            .await?;

        debug!("Callback listener stopped");
        Ok(())
    }
}

/// Collect the form values of a request.
///
/// The body is only read for POST, PUT and PATCH with a urlencoded content
/// type. Query values always apply and come after body values.
fn request_form(
    method: &Method,
    headers: &HeaderMap,
    query: Option<&str>,
    body: &[u8],
) -> std::result::Result<FormValues, FormError> {
    let mut form = FormValues::default();

    if matches!(*method, Method::POST | Method::PUT | Method::PATCH) && is_urlencoded(headers) {
        let body = std::str::from_utf8(body).map_err(|_| FormError::Utf8)?;
        form = FormValues::parse(body)?;
    }
    if let Some(query) = query {
        form.extend(FormValues::parse(query)?);
    }

    Ok(form)
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Handle any request: parse the form and print `From` and `Body`.
///
/// Unparsable forms are dropped with a 200 so one bad request never takes
/// the listener down.
async fn handle_callback(
    State(state): State<ListenerState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    match request_form(&method, &headers, query.as_deref(), &body) {
        Ok(form) => {
            let message = IncomingMessage::from_form(&form);
            debug!(from = %message.from, "Received SMS callback");
            state.sink.message(&message);
        }
        Err(e) => {
            warn!("Received a message but couldn't parse body: {}", e);
            state.sink.malformed();
        }
    }
    StatusCode::OK
}
