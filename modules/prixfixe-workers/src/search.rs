//! Search index definitions, provisioning, and the HTTP index adapter.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use prixfixe_common::DataType;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{debug, info};

use crate::traits::{SearchIndexManager, SearchIndexProvider};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A named index and the document fields it searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: &'static str,
    pub data_type: DataType,
    pub searchable_fields: &'static [&'static str],
}

pub const VALID_INGREDIENTS: IndexDefinition = IndexDefinition {
    name: "valid_ingredients",
    data_type: DataType::ValidIngredient,
    searchable_fields: &["name", "variant", "description", "warning", "iconPath"],
};

pub const VALID_INSTRUMENTS: IndexDefinition = IndexDefinition {
    name: "valid_instruments",
    data_type: DataType::ValidInstrument,
    searchable_fields: &["name", "variant", "description", "iconPath"],
};

pub const VALID_PREPARATIONS: IndexDefinition = IndexDefinition {
    name: "valid_preparations",
    data_type: DataType::ValidPreparation,
    searchable_fields: &["name", "description", "iconPath"],
};

pub const ALL_INDEXES: [IndexDefinition; 3] = [VALID_INGREDIENTS, VALID_INSTRUMENTS, VALID_PREPARATIONS];

// ---------------------------------------------------------------------------
// SearchIndexes
// ---------------------------------------------------------------------------

/// The index managers a worker writes through. Any slot may be empty, in
/// which case that entity's index step is skipped.
#[derive(Clone, Default)]
pub struct SearchIndexes {
    pub valid_ingredients: Option<Arc<dyn SearchIndexManager>>,
    pub valid_instruments: Option<Arc<dyn SearchIndexManager>>,
    pub valid_preparations: Option<Arc<dyn SearchIndexManager>>,
}

impl SearchIndexes {
    /// Build every index through `provider`. The first failure aborts.
    pub async fn provision(provider: &dyn SearchIndexProvider) -> Result<Self> {
        let mut indexes = SearchIndexes::default();
        for definition in ALL_INDEXES {
            let manager = provider.provide(&definition).await.with_context(|| {
                format!(
                    "setting up {}s search index manager",
                    definition.data_type.noun()
                )
            })?;
            info!(index = definition.name, "Search index manager ready");
            indexes.set(definition.data_type, manager);
        }
        Ok(indexes)
    }

    fn set(&mut self, data_type: DataType, manager: Arc<dyn SearchIndexManager>) {
        match data_type {
            DataType::ValidIngredient => self.valid_ingredients = Some(manager),
            DataType::ValidInstrument => self.valid_instruments = Some(manager),
            DataType::ValidPreparation => self.valid_preparations = Some(manager),
            _ => {}
        }
    }

    /// The manager mirroring `data_type`, if it is searchable and configured.
    pub fn for_data_type(&self, data_type: DataType) -> Option<&dyn SearchIndexManager> {
        match data_type {
            DataType::ValidIngredient => self.valid_ingredients.as_deref(),
            DataType::ValidInstrument => self.valid_instruments.as_deref(),
            DataType::ValidPreparation => self.valid_preparations.as_deref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// HttpSearchIndex
// ---------------------------------------------------------------------------

/// Document-store index over HTTP: `PUT`/`DELETE {base}/{index}/_doc/{id}`.
#[derive(Clone)]
pub struct HttpSearchIndex {
    client: Client,
    base_url: String,
    index: &'static str,
}

impl HttpSearchIndex {
    pub fn new(client: Client, base_url: impl Into<String>, index: &'static str) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            index,
        }
    }

    pub fn document_url(&self, id: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index, id)
    }
}

#[async_trait]
impl SearchIndexManager for HttpSearchIndex {
    async fn index(&self, id: &str, document: &serde_json::Value) -> Result<()> {
        let resp = self
            .client
            .put(self.document_url(id))
            .json(document)
            .send()
            .await
            .with_context(|| format!("indexing {id} into {}", self.index))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("search index {} returned {status}: {body}", self.index);
        }

        debug!(index = self.index, id, "Indexed document");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.document_url(id))
            .send()
            .await
            .with_context(|| format!("deleting {id} from {}", self.index))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!(index = self.index, id, "Document already absent");
            return Ok(());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("search index {} returned {status}: {body}", self.index);
        }

        debug!(index = self.index, id, "Deleted document");
        Ok(())
    }
}

/// Creates each index (if missing) with its searchable fields mapped as text.
pub struct HttpSearchIndexProvider {
    client: Client,
    base_url: String,
}

impl HttpSearchIndexProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }
}

/// The create-index body for `definition`.
pub fn index_mapping(definition: &IndexDefinition) -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = definition
        .searchable_fields
        .iter()
        .map(|field| (field.to_string(), json!({ "type": "text" })))
        .collect();
    json!({ "mappings": { "properties": properties } })
}

#[async_trait]
impl SearchIndexProvider for HttpSearchIndexProvider {
    async fn provide(&self, definition: &IndexDefinition) -> Result<Arc<dyn SearchIndexManager>> {
        let index_url = format!("{}/{}", self.base_url, definition.name);

        let exists = self.client.head(&index_url).send().await?.status();
        if exists == StatusCode::NOT_FOUND {
            let resp = self
                .client
                .put(&index_url)
                .json(&index_mapping(definition))
                .send()
                .await?;
            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("creating index {} returned {status}: {body}", definition.name);
            }
            info!(index = definition.name, "Created search index");
        } else if !exists.is_success() {
            anyhow::bail!("checking index {} returned {exists}", definition.name);
        }

        Ok(Arc::new(HttpSearchIndex::new(
            self.client.clone(),
            self.base_url.clone(),
            definition.name,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_searchable_type_has_one_definition() {
        let covered: Vec<DataType> = ALL_INDEXES.iter().map(|d| d.data_type).collect();
        let searchable: Vec<DataType> = DataType::ALL
            .into_iter()
            .filter(DataType::is_searchable)
            .collect();
        assert_eq!(covered, searchable);
    }

    #[test]
    fn document_url_joins_base_index_and_id() {
        let index = HttpSearchIndex::new(Client::new(), "http://search:9200/", "valid_ingredients");
        assert_eq!(
            index.document_url("vi1"),
            "http://search:9200/valid_ingredients/_doc/vi1"
        );
    }

    #[test]
    fn mapping_lists_searchable_fields_as_text() {
        let mapping = index_mapping(&VALID_PREPARATIONS);
        let props = mapping["mappings"]["properties"].as_object().unwrap();
        assert_eq!(props.len(), 3);
        assert_eq!(props["iconPath"]["type"], "text");
    }

    #[test]
    fn empty_indexes_map_nothing() {
        let indexes = SearchIndexes::default();
        for dt in DataType::ALL {
            assert!(indexes.for_data_type(dt).is_none());
        }
    }
}
