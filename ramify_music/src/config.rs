// Generation settings for the `generate` binary.
//
// Everything the arrangement does not hard-code lives in `GeneratorConfig`:
// piece length, tempo, seed, the scale pattern harmonies are built from, how
// inverted random ranges are treated, and where output goes. Settings load
// from a JSON file; any field left out takes its default, and command-line
// flags override whatever the file says (see main.rs).

use crate::error::Result;
use crate::generator::RangePolicy;
use crate::scale::HARMONIC_MINOR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of bars; each bar gets its own harmony and metrum.
    pub bars: usize,
    /// Quarter notes per minute.
    pub tempo_bpm: u16,
    /// Master seed. When absent, one is picked from the clock and logged.
    pub seed: Option<u64>,
    /// Step pattern for every bar's harmony, e.g. "2212221" for major.
    pub scale_steps: String,
    pub range_policy: RangePolicy,
    /// Standard MIDI File to write.
    pub output: PathBuf,
    /// Also dump the composition as JSON here.
    pub export_json: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            bars: 81,
            tempo_bpm: 120,
            seed: None,
            scale_steps: HARMONIC_MINOR.to_string(),
            range_policy: RangePolicy::AsGiven,
            output: PathBuf::from("demo.mid"),
            export_json: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        GeneratorConfig::from_json(&json)
    }
}
