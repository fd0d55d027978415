use anyhow::{Result, Context as AnyhowContext};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use crate::config::TranslatorOptions;
use crate::dsl::Diagram;
use crate::net::Resource;

fn load_yaml<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read YAML file from {}", file_path))?;

    serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize YAML content from {}", file_path))
}

pub fn load_diagram_from_yaml(file_path: &str) -> Result<Diagram> {
    load_yaml(file_path)
}

pub fn load_resourcing_from_yaml(file_path: &str) -> Result<HashMap<String, Resource>> {
    load_yaml(file_path)
}

pub fn load_options_from_yaml(file_path: &str) -> Result<TranslatorOptions> {
    load_yaml(file_path)
}
