use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Smallest usable split threshold. With 1, every split would produce as many sections as it
/// had children and re-splitting would never converge.
pub const MIN_CHILDREN_PER_GROUP: usize = 2;

pub const DEFAULT_MAX_CHILDREN_PER_GROUP: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessingConfig {
    /// When `false`, every asset is a root node and no groups are created.
    pub group_by_namespace: bool,
    /// Largest number of direct children a group (or the root scope) may present to one
    /// layout pass before it is split into sections.
    pub max_children_per_group: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            group_by_namespace: true,
            max_children_per_group: DEFAULT_MAX_CHILDREN_PER_GROUP,
        }
    }
}

impl ProcessingConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_children_per_group(mut self, max: usize) -> Self {
        self.max_children_per_group = max;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_children_per_group < MIN_CHILDREN_PER_GROUP {
            return Err(Error::InvalidConfig {
                message: format!(
                    "maxChildrenPerGroup must be at least {MIN_CHILDREN_PER_GROUP}, got {}",
                    self.max_children_per_group
                ),
            });
        }
        Ok(())
    }
}
