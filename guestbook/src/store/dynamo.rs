use super::{GuestbookStore, StoreError};
use crate::entry::Entry;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client};
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

type Item = HashMap<String, AttributeValue>;

/// Entries kept in a DynamoDB table keyed by the string attribute `id`
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    /// Wraps an existing client
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        DynamoStore {
            client,
            table: table.into(),
        }
    }

    /// Loads AWS configuration from the environment and builds a client,
    /// optionally pointed at a non-default endpoint.
    pub async fn connect(table: &str, endpoint: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;
        debug!(table, region = ?config.region(), "dynamodb client configured");
        Self::new(Client::new(&config), table)
    }

    /// Table entries are read from and written to
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl GuestbookStore for DynamoStore {
    fn put_entry<'a>(&'a self, entry: &'a Entry) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.client
                .put_item()
                .table_name(&self.table)
                .set_item(Some(to_item(entry)))
                .send()
                .await
                .map_err(|err| StoreError::Put {
                    id: entry.id,
                    message: DisplayErrorContext(&err).to_string(),
                })?;
            Ok(())
        })
    }

    fn scan_entries(&self) -> BoxFuture<'_, Result<Vec<Entry>, StoreError>> {
        Box::pin(async move {
            let mut entries = Vec::new();
            let mut start_key = None;
            loop {
                let page = self
                    .client
                    .scan()
                    .table_name(&self.table)
                    .set_exclusive_start_key(start_key.take())
                    .send()
                    .await
                    .map_err(|err| StoreError::Scan {
                        table: self.table.clone(),
                        message: DisplayErrorContext(&err).to_string(),
                    })?;
                for item in page.items() {
                    match from_item(item) {
                        Some(entry) => entries.push(entry),
                        None => warn!(table = %self.table, "skipping malformed guestbook item"),
                    }
                }
                match page.last_evaluated_key {
                    Some(key) if !key.is_empty() => start_key = Some(key),
                    _ => break,
                }
            }
            Ok(entries)
        })
    }

    fn health_check(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.client
                .describe_table()
                .table_name(&self.table)
                .send()
                .await
                .map(|_| ())
                .map_err(|err| StoreError::Unhealthy(DisplayErrorContext(&err).to_string()))
        })
    }
}

fn to_item(entry: &Entry) -> Item {
    let mut item = Item::new();
    item.insert("id".into(), AttributeValue::S(entry.id.to_string()));
    item.insert("name".into(), AttributeValue::S(entry.name.clone()));
    item.insert("message".into(), AttributeValue::S(entry.message.clone()));
    item.insert("created_at".into(), AttributeValue::S(entry.created_at.to_rfc3339()));
    item
}

fn from_item(item: &Item) -> Option<Entry> {
    let text = |key: &str| item.get(key).and_then(|value| value.as_s().ok());
    Some(Entry {
        id: Uuid::parse_str(text("id")?).ok()?,
        name: text("name")?.clone(),
        message: text("message")?.clone(),
        created_at: DateTime::parse_from_rfc3339(text("created_at")?)
            .ok()?
            .with_timezone(&Utc),
    })
}
