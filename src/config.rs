//! Configuration of the annotation core.

/// Default distance beyond the transcript still reported as up-/downstream.
pub const DEFAULT_FLANK_DISTANCE: u32 = 1_000;

/// Default number of intronic bases next to an exon treated as splice site.
pub const DEFAULT_SPLICE_WINDOW: u32 = 2;

/// Parameters consumed by the coordinate mapper and the classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_builder::Builder,
)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Maximal distance to the transcript for UPSTREAM/DOWNSTREAM calls.
    #[builder(default = "DEFAULT_FLANK_DISTANCE")]
    pub flank_distance: u32,
    /// Width of the canonical splice window on the intronic side.
    #[builder(default = "DEFAULT_SPLICE_WINDOW")]
    pub splice_window: u32,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            flank_distance: DEFAULT_FLANK_DISTANCE,
            splice_window: DEFAULT_SPLICE_WINDOW,
        }
    }
}

impl AnnotatorConfig {
    /// Load configuration from a JSON string; missing keys use the defaults.
    pub fn from_json(json: &str) -> Result<Self, anyhow::Error> {
        serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("could not parse annotator configuration: {}", e))
    }
}
