use crate::net::Net;
use anyhow::{Context, Result};

/// Renders a finished net into its persisted text form.
pub trait NetSerializer {
    fn serialize(&self, net: &Net) -> Result<String>;
}

/// Pretty-printed JSON, used by the command line and for inspection.
pub struct JsonNetSerializer;

impl NetSerializer for JsonNetSerializer {
    fn serialize(&self, net: &Net) -> Result<String> {
        serde_json::to_string_pretty(net).with_context(|| format!("Failed to serialize net {}", net.id))
    }
}
