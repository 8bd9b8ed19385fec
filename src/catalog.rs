use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TransmuteConfig;
use crate::http::{BackendError, BackendHttpClient};

pub const MATERIALS_PATH: &str = "/api/materials";
const MATERIALS_CACHE_KEY: &str = "materials";

/// Output names offered for completion before the user types anything
pub const OUTPUT_SUGGESTIONS: &[&str] = &[
    "Espada de acero",
    "Poción curativa",
    "Escudo protector",
    "Herramienta",
    "Artefacto",
];

/// One entry of the read-only materials catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub base_value: f64,
    #[serde(default)]
    pub danger_level: String,
}

/// The first few materials plus how many were left out
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPreview {
    pub shown: Vec<Material>,
    pub remaining: usize,
}

impl CatalogPreview {
    pub fn from_materials(mut materials: Vec<Material>, limit: usize) -> Self {
        let remaining = materials.len().saturating_sub(limit);
        materials.truncate(limit);
        Self {
            shown: materials,
            remaining,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MaterialCatalog {
    http: BackendHttpClient,
    preview_limit: usize,
}

impl MaterialCatalog {
    pub fn new(http: BackendHttpClient, preview_limit: usize) -> Self {
        Self { http, preview_limit }
    }

    pub fn from_config(http: BackendHttpClient, config: &TransmuteConfig) -> Self {
        Self::new(http, config.catalog.preview_limit)
    }

    pub fn preview_limit(&self) -> usize {
        self.preview_limit
    }

    /// Full catalog, served from the client cache while it is fresh
    pub async fn fetch(&self) -> Result<Vec<Material>, BackendError> {
        let materials: Vec<Material> = self
            .http
            .get_json_cached(MATERIALS_PATH, Some(MATERIALS_CACHE_KEY.to_string()))
            .await?;
        info!(count = materials.len(), "Materials catalog loaded");
        Ok(materials)
    }

    pub async fn preview(&self) -> Result<CatalogPreview, BackendError> {
        let materials = self.fetch().await?;
        Ok(CatalogPreview::from_materials(materials, self.preview_limit))
    }

    /// Material names for input completion
    pub async fn suggestions(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.fetch().await?.into_iter().map(|m| m.name).collect())
    }
}
