//! Settings file of the headless runner.

use std::{fs, path::Path, str::FromStr};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tile_defence_board::{BoardConfig, GridCell};
use tile_defence_core::TowerKind;
use tile_defence_game::GameConfig;

/// Everything a headless session is built from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) game: GameConfig,
    pub(crate) board: BoardConfig,
    pub(crate) towers: Vec<TowerPlacement>,
}

impl Settings {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load settings from {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings toml contents")
    }
}

/// Tower built before the first tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TowerPlacement {
    pub(crate) column: u32,
    pub(crate) row: u32,
    pub(crate) kind: TowerKind,
}

impl TowerPlacement {
    pub(crate) fn cell(&self) -> GridCell {
        GridCell::new(self.column, self.row)
    }
}

impl FromStr for TowerPlacement {
    type Err = anyhow::Error;

    /// Parses `COLUMN,ROW,KIND`, e.g. `3,0,laser`.
    fn from_str(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        let [column, row, kind] = parts.as_slice() else {
            bail!("expected COLUMN,ROW,KIND but got `{value}`");
        };
        let column = column
            .parse()
            .with_context(|| format!("invalid tower column `{column}`"))?;
        let row = row
            .parse()
            .with_context(|| format!("invalid tower row `{row}`"))?;
        let kind = match kind.to_ascii_lowercase().as_str() {
            "laser" => TowerKind::Laser,
            "mortar" => TowerKind::Mortar,
            other => bail!("unknown tower kind `{other}`, expected laser or mortar"),
        };
        Ok(Self { column, row, kind })
    }
}
