use crate::{
    config::{Diagnostics, Settings, StoreKind},
    entry::{self, NewEntry},
    error::AppError,
    render,
    response::{Html, IntoResponse, Redirect},
    store::{store_factory, DynamoStore, GuestbookStore, Health, MemoryStore, StoreError, StoreHandle},
    volume::VolumeMarker,
    Request, Response,
};
use bytes::Bytes;
use chrono::Utc;
use http::{Method, StatusCode};
use std::sync::Arc;
use tracing::{debug, info};

/// The guestbook application
///
/// Owns everything request handling needs. Share it behind an `Arc`.
#[derive(Debug)]
pub struct App {
    diagnostics: Diagnostics,
    store: StoreHandle,
    volume: VolumeMarker,
}

impl App {
    /// Assembles an application from its parts
    pub fn new(diagnostics: Diagnostics, store: StoreHandle, volume: VolumeMarker) -> Self {
        App {
            diagnostics,
            store,
            volume,
        }
    }

    /// Builds the application described by `settings`, reading diagnostics
    /// from the environment and connecting the configured store.
    pub async fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        let store = match settings.store {
            StoreKind::Memory => StoreHandle::fixed(Arc::new(MemoryStore::new())),
            StoreKind::Dynamodb => {
                let table = settings.table_name.clone();
                let endpoint = settings.dynamodb_endpoint.clone();
                StoreHandle::connect(store_factory(move || {
                    let table = table.clone();
                    let endpoint = endpoint.clone();
                    async move {
                        let store = DynamoStore::connect(&table, endpoint.as_deref()).await;
                        Ok(Arc::new(store) as Arc<dyn GuestbookStore>)
                    }
                }))
                .await?
            }
        };
        info!(
            store = ?settings.store,
            table = %settings.table_name,
            volume = %settings.volume_path.display(),
            "guestbook configured"
        );
        Ok(App::new(
            Diagnostics::from_env(),
            store,
            VolumeMarker::new(settings.volume_path.clone()),
        ))
    }

    /// Diagnostics shown on every page
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The store handle requests go through
    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Serves one request. Failures are rendered as error responses, so this
    /// always produces a response.
    pub async fn handle(&self, request: Request) -> Response {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let mut response = match self.route(request).await {
            Ok(response) => response,
            Err(err) => err.into_response(),
        };
        if method == Method::HEAD {
            *response.body_mut() = Bytes::new();
        }
        info!(%method, %path, status = response.status().as_u16(), "request served");
        response
    }

    async fn route(&self, request: Request) -> Result<Response, AppError> {
        let method = request.method().clone();
        match (method, request.uri().path()) {
            (Method::GET, "/") | (Method::HEAD, "/") => self.index().await,
            (Method::POST, "/submit") => self.submit(request.body()).await,
            (Method::GET, "/entries") => self.entries().await,
            (Method::GET, "/volume") => self.show_volume().await,
            (Method::POST, "/volume") => self.append_volume().await,
            (Method::GET, "/healthz") => self.health().await,
            (Method::GET, "/node") => Ok(format!(
                "Running on node: {}",
                self.diagnostics.node_name
            )
            .into_response()),
            (_, path) => Err(match allowed_methods(path) {
                Some(allow) => AppError::MethodNotAllowed { allow },
                None => AppError::NotFound(path.to_string()),
            }),
        }
    }

    async fn sorted_entries(&self) -> Result<Vec<entry::Entry>, AppError> {
        let mut entries = self.store.current().await.scan_entries().await?;
        entry::sort_newest_first(&mut entries);
        Ok(entries)
    }

    async fn index(&self) -> Result<Response, AppError> {
        let entries = self.sorted_entries().await?;
        Ok(Html(render::index_page(&self.diagnostics, &entries)).into_response())
    }

    async fn submit(&self, body: &Bytes) -> Result<Response, AppError> {
        let submission: NewEntry = serde_urlencoded::from_bytes(body)?;
        let entry = submission.into_entry(Utc::now())?;
        self.store.current().await.put_entry(&entry).await?;
        info!(id = %entry.id, "entry stored");
        Ok(Redirect("/").into_response())
    }

    async fn entries(&self) -> Result<Response, AppError> {
        let entries = self.sorted_entries().await?;
        Ok(serde_json::to_value(&entries)?.into_response())
    }

    async fn show_volume(&self) -> Result<Response, AppError> {
        let ids = self.volume.read_all().await?;
        Ok(Html(render::volume_page(&self.diagnostics, self.volume.path(), &ids)).into_response())
    }

    async fn append_volume(&self) -> Result<Response, AppError> {
        let id = self.volume.append_next().await?;
        info!(id, path = %self.volume.path().display(), "volume marker appended");
        Ok(Redirect("/volume").into_response())
    }

    async fn health(&self) -> Result<Response, AppError> {
        Ok(match self.store.ensure_healthy().await {
            Ok(Health::Healthy) => "ok".into_response(),
            Ok(Health::Reinitialized) => "reinitialized".into_response(),
            Err(err) => {
                debug!(error = %err, "health check could not recover the store");
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response()
            }
        })
    }
}

fn allowed_methods(path: &str) -> Option<&'static str> {
    match path {
        "/" => Some("GET, HEAD"),
        "/submit" => Some("POST"),
        "/volume" => Some("GET, POST"),
        "/entries" | "/healthz" | "/node" => Some("GET"),
        _ => None,
    }
}
