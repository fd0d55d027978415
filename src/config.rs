use serde::{Serialize, Deserialize};

/// Knobs of a translation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslatorOptions {
    /// Id of the root decomposition.
    pub root_net_id: String,
    /// The net id is this prefix followed by the pool index.
    pub model_id_prefix: String,
    /// Subprocesses nested deeper than this abort the translation.
    pub max_nesting_depth: usize,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            root_net_id: "OryxBPMNtoYAWL_Net".to_string(),
            model_id_prefix: "mymodel".to_string(),
            max_nesting_depth: 64,
        }
    }
}
