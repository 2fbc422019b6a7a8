//! Cloud Firestore backend over the REST v1 API.
//!
//! Layout: collection `inventory`, one document per item with the document id
//! equal to the normalized item name and a single integer field `quantity`.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use stockroom_inventory::{InventoryItem, ItemName, Quantity};

use super::{InventoryStore, StoreError, parse_stored_key};
use crate::config::FirestoreConfig;

/// Collection holding the inventory records.
pub const COLLECTION: &str = "inventory";

const QUANTITY_FIELD: &str = "quantity";
const PAGE_SIZE: u32 = 300;

/// Firestore-backed inventory store.
#[derive(Debug, Clone)]
pub struct FirestoreInventoryStore {
    client: Client,
    collection_url: Url,
    api_key: Option<String>,
    bearer_token: Option<String>,
}

impl FirestoreInventoryStore {
    pub fn new(config: &FirestoreConfig) -> Result<Self, StoreError> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &FirestoreConfig) -> Result<Self, StoreError> {
        let collection_url = collection_url(&config.endpoint, &config.project_id)?;
        Ok(Self {
            client,
            collection_url,
            api_key: config.api_key.clone(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    fn document_url(&self, name: &ItemName) -> Result<Url, StoreError> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Backend("firestore endpoint cannot be a base URL".to_string()))?
            .push(name.as_str());
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut req = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            req = req.query(&[("key", key)]);
        }
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }
        req
    }
}

fn collection_url(endpoint: &str, project_id: &str) -> Result<Url, StoreError> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| StoreError::Backend(format!("invalid firestore endpoint: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Backend("firestore endpoint cannot be a base URL".to_string()))?
        .pop_if_empty()
        .extend([
            "projects",
            project_id,
            "databases",
            "(default)",
            "documents",
            COLLECTION,
        ]);
    Ok(url)
}

async fn send(req: RequestBuilder) -> Result<Response, StoreError> {
    req.send()
        .await
        .map_err(|e| StoreError::Network(e.to_string()))
}

async fn error_for_status(resp: Response) -> StoreError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    status_error(status, body)
}

fn status_error(status: StatusCode, body: String) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::PermissionDenied(body),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            StoreError::Network(format!("{status}: {body}"))
        }
        _ => StoreError::Backend(format!("{status}: {body}")),
    }
}

// -------------------------
// Wire format
// -------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    integer_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    double_value: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

fn encode_quantity(quantity: Quantity) -> Document {
    let mut fields = HashMap::new();
    fields.insert(
        QUANTITY_FIELD.to_string(),
        FieldValue {
            integer_value: Some(quantity.get().to_string()),
            double_value: None,
        },
    );
    Document { name: None, fields }
}

fn decode_quantity(doc: &Document) -> Result<Quantity, StoreError> {
    let field = doc
        .fields
        .get(QUANTITY_FIELD)
        .ok_or_else(|| StoreError::Decode("missing quantity field".to_string()))?;

    let raw = match (&field.integer_value, field.double_value) {
        (Some(s), _) => s
            .parse::<u64>()
            .map_err(|e| StoreError::Decode(format!("quantity {s:?}: {e}")))?,
        // Written by a client that stored a whole-number double.
        (None, Some(d)) if d.fract() == 0.0 && d >= 1.0 && d <= u64::MAX as f64 => d as u64,
        _ => return Err(StoreError::Decode("quantity is not a positive integer".to_string())),
    };

    Quantity::new(raw).map_err(|e| StoreError::Decode(e.to_string()))
}

fn decode_document(doc: &Document) -> Result<InventoryItem, StoreError> {
    let path = doc
        .name
        .as_deref()
        .ok_or_else(|| StoreError::Decode("document without a name".to_string()))?;
    // Resource names in response bodies carry the raw document id.
    let id = path.rsplit('/').next().unwrap_or(path);
    let name = parse_stored_key(id)?;
    Ok(InventoryItem::new(name, decode_quantity(doc)?))
}

#[async_trait]
impl InventoryStore for FirestoreInventoryStore {
    async fn list_all(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self
                .request(Method::GET, self.collection_url.clone())
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token)]);
            }

            let resp = send(req).await?;
            if !resp.status().is_success() {
                return Err(error_for_status(resp).await);
            }
            let page: ListDocumentsResponse = resp
                .json()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()))?;

            for doc in &page.documents {
                match decode_document(doc) {
                    Ok(item) => items.push(item),
                    Err(err) => {
                        tracing::warn!(document = ?doc.name, error = %err, "skipping malformed inventory document");
                    }
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = items.len(), "listed inventory documents");
        Ok(items)
    }

    async fn get_quantity(&self, name: &ItemName) -> Result<Option<Quantity>, StoreError> {
        let resp = send(self.request(Method::GET, self.document_url(name)?)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(error_for_status(resp).await);
        }
        let doc: Document = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        decode_quantity(&doc).map(Some)
    }

    async fn set_quantity(&self, name: &ItemName, quantity: Quantity) -> Result<(), StoreError> {
        // PATCH without an update mask replaces the whole document, creating it if needed.
        let req = self
            .request(Method::PATCH, self.document_url(name)?)
            .json(&encode_quantity(quantity));
        let resp = send(req).await?;
        if !resp.status().is_success() {
            return Err(error_for_status(resp).await);
        }
        tracing::debug!(item = %name, quantity = quantity.get(), "wrote inventory document");
        Ok(())
    }

    async fn remove(&self, name: &ItemName) -> Result<(), StoreError> {
        let resp = send(self.request(Method::DELETE, self.document_url(name)?)).await?;
        if !resp.status().is_success() && resp.status() != StatusCode::NOT_FOUND {
            return Err(error_for_status(resp).await);
        }
        tracing::debug!(item = %name, "deleted inventory document");
        Ok(())
    }
}
