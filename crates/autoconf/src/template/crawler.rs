//! Template root discovery.

use tracing::{debug, warn};

use super::{TemplateLayout, is_valid_template};
use crate::error::DiscoveryError;
use crate::path::NamespacePath;
use crate::store::TemplateStore;

/// List the directories directly under `root` that are valid template roots.
///
/// Only a failure to list `root` itself is returned as an error. A child
/// that cannot be listed is logged and skipped. Results follow the order in
/// which the store returned the children.
pub async fn discover_template_roots<S>(
    store: &S,
    root: &NamespacePath,
    layout: &TemplateLayout,
) -> Result<Vec<NamespacePath>, DiscoveryError>
where
    S: TemplateStore + ?Sized,
{
    let children = store
        .list_children(root)
        .await
        .map_err(|source| DiscoveryError::RootListing {
            root: root.clone(),
            source,
        })?;

    let mut identifiers = Vec::new();
    for child in children {
        let candidate = root.join(&child);
        let nodes = match store.list_children(&candidate).await {
            Ok(nodes) => nodes,
            Err(error) => {
                warn!(path = %candidate, %error, "could not list keys, skipping");
                continue;
            }
        };

        if is_valid_template(&nodes, layout) {
            identifiers.push(candidate);
        } else {
            debug!(path = %candidate, children = nodes.len(), "not a template root");
        }
    }

    Ok(identifiers)
}
