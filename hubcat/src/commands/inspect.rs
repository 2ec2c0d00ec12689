//! The `tags` and `labels` commands: look at a single repository without
//! building a catalog.

use crate::context::AppContext;
use anyhow::{Context, Result, bail};
use libhubcat::Registry;
use std::collections::BTreeMap;

/// Tag used when a reference names none.
pub const DEFAULT_TAG: &str = "latest";

/// Splits `repository[:tag]` into repository and tag.
pub fn parse_reference(reference: &str) -> Result<(&str, &str)> {
    let (repository, tag) = match reference.rsplit_once(':') {
        Some((repository, tag)) if !tag.contains('/') => (repository, tag),
        _ => (reference, DEFAULT_TAG),
    };

    if repository.is_empty() || tag.is_empty() {
        bail!("Invalid reference '{}', expected repository[:tag]", reference);
    }
    Ok((repository, tag))
}

/// Labels of `repository:tag` for the registry's machine, sorted by key.
pub async fn sorted_labels(
    registry: &Registry,
    repository: &str,
    tag: &str,
) -> Result<BTreeMap<String, String>> {
    let token = registry.get_token(repository).await?;
    let labels = registry
        .fetch_tag_labels(repository, tag, &token)
        .await
        .with_context(|| format!("Failed to fetch labels of {}:{}", repository, tag))?;
    Ok(labels.into_iter().collect())
}

/// Handle the tags command
pub async fn handle_tags(ctx: &AppContext, repository: &str) -> Result<()> {
    let listing = ctx
        .registry()?
        .list_tags(repository)
        .await
        .with_context(|| format!("Failed to list tags of {}", repository))?;

    for tag in listing.tags {
        println!("{}", tag);
    }
    Ok(())
}

/// Handle the labels command
pub async fn handle_labels(ctx: &AppContext, reference: &str) -> Result<()> {
    let (repository, tag) = parse_reference(reference)?;
    let labels = sorted_labels(&ctx.registry()?, repository, tag).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&labels).context("Failed to serialize labels")?
    );
    Ok(())
}

#[cfg(test)]
#[path = "inspect_tests.rs"]
mod tests;
