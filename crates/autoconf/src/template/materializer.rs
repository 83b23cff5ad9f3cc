//! Fetching and parsing the leaves of one template root.
//!
//! Payload conventions:
//!
//! - check names: a JSON array of strings (`["redisdb", "nginx"]`) or a
//!   delimiter-separated list (`redisdb, nginx`). Entries are trimmed and
//!   empty entries dropped.
//! - init configs and instances: a JSON array of objects. A lone object is
//!   wrapped into a one-element list unless wrapping is disabled.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::TemplateLayout;
use crate::check::ConfigData;
use crate::error::MaterializeError;
use crate::path::NamespacePath;
use crate::store::TemplateStore;

/// How leaf payloads are interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Separator for plain-text check name lists
    pub check_name_delimiter: char,

    /// Accept a single top-level object where a list is expected
    pub wrap_single_object: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            check_name_delimiter: ',',
            wrap_single_object: true,
        }
    }
}

/// Typed contents of one template root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Materialized {
    pub check_names: Vec<String>,
    pub init_configs: Vec<ConfigData>,
    pub instances: Vec<ConfigData>,
}

/// Fetch and parse the three leaves under `root`.
///
/// Any failure is reported against the leaf that caused it; the caller is
/// expected to skip this root and carry on with the others.
pub async fn materialize<S>(
    store: &S,
    root: &NamespacePath,
    layout: &TemplateLayout,
    options: &ParseOptions,
) -> Result<Materialized, MaterializeError>
where
    S: TemplateStore + ?Sized,
{
    let names_path = root.join(&layout.check_names);
    let raw_names = fetch(store, "check names", &names_path).await?;
    let check_names = parse_check_names(&names_path, &raw_names, options)?;

    let init_path = root.join(&layout.init_configs);
    let raw_init = fetch(store, "init configs", &init_path).await?;
    let init_configs = parse_config_data("init configs", &init_path, &raw_init, options)?;

    let instances_path = root.join(&layout.instances);
    let raw_instances = fetch(store, "instances", &instances_path).await?;
    let instances = parse_config_data("instances", &instances_path, &raw_instances, options)?;

    debug!(
        path = %root,
        checks = check_names.len(),
        init_configs = init_configs.len(),
        instances = instances.len(),
        "materialized template"
    );

    Ok(Materialized {
        check_names,
        init_configs,
        instances,
    })
}

async fn fetch<S>(
    store: &S,
    leaf: &'static str,
    path: &NamespacePath,
) -> Result<Vec<u8>, MaterializeError>
where
    S: TemplateStore + ?Sized,
{
    store
        .get(path)
        .await
        .map(|node| node.payload)
        .map_err(|source| MaterializeError::Fetch {
            leaf,
            path: path.clone(),
            source,
        })
}

/// Parse the check name leaf stored at `path`.
pub fn parse_check_names(
    path: &NamespacePath,
    raw: &[u8],
    options: &ParseOptions,
) -> Result<Vec<String>, MaterializeError> {
    let text = std::str::from_utf8(raw).map_err(|e| MaterializeError::CheckNames {
        path: path.clone(),
        reason: format!("payload is not valid UTF-8: {e}"),
    })?;
    let text = text.trim();

    let entries: Vec<String> = if text.starts_with('[') {
        serde_json::from_str::<Vec<String>>(text).map_err(|e| MaterializeError::CheckNames {
            path: path.clone(),
            reason: format!("expected a JSON array of strings: {e}"),
        })?
    } else {
        text.split(options.check_name_delimiter)
            .map(str::to_string)
            .collect()
    };

    Ok(entries
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Parse an init config or instance leaf stored at `path`.
pub fn parse_config_data(
    leaf: &'static str,
    path: &NamespacePath,
    raw: &[u8],
    options: &ParseOptions,
) -> Result<Vec<ConfigData>, MaterializeError> {
    let value: Value = serde_json::from_slice(raw).map_err(|source| {
        MaterializeError::ConfigData {
            leaf,
            path: path.clone(),
            source,
        }
    })?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(document) => Ok(document),
                other => Err(MaterializeError::NotADocument {
                    leaf,
                    path: path.clone(),
                    index,
                    found: kind_of(&other),
                }),
            })
            .collect(),
        Value::Object(document) if options.wrap_single_object => Ok(vec![document]),
        other => Err(MaterializeError::UnexpectedShape {
            leaf,
            path: path.clone(),
            found: kind_of(&other),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
