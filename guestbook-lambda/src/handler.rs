use crate::{
    event::EventShape,
    request::{into_request, ProxyRequest},
    response::LambdaResponse,
    AdapterError,
};
use guestbook::App;
use lamedh_runtime::{Context, Error, Handler};
use serde_json::Value;
use std::{future::Future, pin::Pin, sync::Arc};
use tracing::{debug, info_span, Instrument};

/// Serves one gateway event with `app`.
///
/// The response is shaped for the gateway that sent the event.
pub async fn dispatch(app: &App, event: Value) -> Result<LambdaResponse, AdapterError> {
    let origin = EventShape::detect(&event).request_origin();
    let request = into_request(ProxyRequest::from_event(event)?)?;
    debug!(?origin, method = %request.method(), uri = %request.uri(), "dispatching gateway event");
    let response = app.handle(request).await;
    Ok(LambdaResponse::from_response(&origin, response))
}

/// Lambda runtime handler sharing one [`App`] across invocations
#[derive(Debug, Clone)]
pub struct GuestbookHandler {
    app: Arc<App>,
}

impl GuestbookHandler {
    /// Handler serving `app`
    pub fn new(app: Arc<App>) -> Self {
        GuestbookHandler { app }
    }
}

impl Handler<Value, LambdaResponse> for GuestbookHandler {
    type Error = Error;
    type Fut = Pin<Box<dyn Future<Output = Result<LambdaResponse, Error>> + Send + 'static>>;

    fn call(&mut self, event: Value, context: Context) -> Self::Fut {
        let app = Arc::clone(&self.app);
        let span = info_span!("invocation", request_id = %context.request_id);
        let fut = async move { dispatch(&app, event).await.map_err(Error::from) };
        Box::pin(fut.instrument(span))
    }
}
