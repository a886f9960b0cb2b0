use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Size of a collapsed group.
    pub group_width: f64,
    pub group_height: f64,
    /// Horizontal gap between siblings in one rank.
    pub node_sep: f64,
    /// Vertical gap between ranks.
    pub rank_sep: f64,
    /// Inset between an expanded group's border and its content.
    pub group_padding: f64,
    /// Label band at the top of an expanded group, above the padding.
    pub group_header: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 120.0,
            node_height: 40.0,
            group_width: 160.0,
            group_height: 48.0,
            node_sep: 20.0,
            rank_sep: 50.0,
            group_padding: 16.0,
            group_header: 24.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("nodeWidth", self.node_width),
            ("nodeHeight", self.node_height),
            ("groupWidth", self.group_width),
            ("groupHeight", self.group_height),
            ("nodeSep", self.node_sep),
            ("rankSep", self.rank_sep),
            ("groupPadding", self.group_padding),
            ("groupHeader", self.group_header),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be a finite non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}
