use crate::error::Result;
use canopy_layout::LayoutConfig;
use canopy_model::ProcessingConfig;
use serde::{Deserialize, Serialize};

/// Everything the router needs besides its collaborators.
///
/// ```json
/// { "processing": { "maxChildrenPerGroup": 50 }, "layout": { "nodeSep": 10 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerConfig {
    pub processing: ProcessingConfig,
    pub layout: LayoutConfig,
}

impl WorkerConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.processing.validate()?;
        self.layout.validate()?;
        Ok(())
    }
}
