// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

use crate::render::RenderStyle;
use crate::topology::{ChimeraParams, PegasusParams};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UserConfig {
    /// Parameters of the Chimera topology.
    pub chimera: ChimeraParams,
    /// Parameters of the Pegasus topology.
    pub pegasus: PegasusParams,
    /// Style of the Chimera image.
    pub chimera_style: RenderStyle,
    /// Style of the Pegasus image.
    pub pegasus_style: RenderStyle,
    /// Name of the Chimera image file.
    pub chimera_filename: String,
    /// Name of the Pegasus image file.
    pub pegasus_filename: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            chimera: ChimeraParams::default(),
            pegasus: PegasusParams::default(),
            chimera_style: RenderStyle::with_node_color("#377eb8"),
            pegasus_style: RenderStyle::with_node_color("#e41a1c"),
            chimera_filename: String::from("chimera.svg"),
            pegasus_filename: String::from("pegasus.svg"),
        }
    }
}

impl UserConfig {
    pub fn header() -> String {
        String::from("chimera_rows,chimera_columns,chimera_shore_size,pegasus_size")
    }
    pub fn to_csv(&self) -> String {
        format!(
            "{},{},{},{}",
            self.chimera.rows, self.chimera.columns, self.chimera.shore_size, self.pegasus.size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::UserConfig;

    #[test]
    fn test_user_config_template() -> anyhow::Result<()> {
        let config = UserConfig::default();
        assert_eq!("3,3,4,3", config.to_csv());
        assert_eq!(
            UserConfig::header().matches(',').count(),
            config.to_csv().matches(',').count()
        );

        let template = serde_json::to_string_pretty(&config)?;
        let parsed: UserConfig = serde_json::from_str(&template)?;
        assert_eq!(config, parsed);
        Ok(())
    }
}
