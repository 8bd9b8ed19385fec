use anyhow::Result;

use crate::catalog::{CatalogPreview, MaterialCatalog, OUTPUT_SUGGESTIONS};
use crate::config::TransmuteConfig;
use crate::http::BackendHttpClient;
use crate::presentation::render_catalog;

pub struct MaterialsCommand {
    pub all: bool,
}

impl MaterialsCommand {
    pub fn new(all: bool) -> Self {
        Self { all }
    }

    pub async fn execute(&self, config: &TransmuteConfig) -> Result<()> {
        let catalog = MaterialCatalog::from_config(BackendHttpClient::from_config(config)?, config);

        let preview = if self.all {
            let materials = catalog.fetch().await?;
            let count = materials.len();
            CatalogPreview::from_materials(materials, count)
        } else {
            catalog.preview().await?
        };

        print!("{}", render_catalog(&preview));
        println!();
        println!("🎯 Output ideas: {}", OUTPUT_SUGGESTIONS.join(", "));
        Ok(())
    }
}
