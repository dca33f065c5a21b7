use crate::error::Result;
use crate::format::render_sections;
use crate::sections::{MANIFEST_FILE, SectionIndex};
use anyhow::Context;
use std::path::PathBuf;

/// Parameters for the sections command
#[derive(Debug, Clone)]
pub struct SectionsRequest {
    /// A search directory, or the manifest file itself
    pub path: PathBuf,
}

/// List the sections declared by a search directory's manifest.
pub async fn handle_sections(request: SectionsRequest) -> Result<String> {
    let path = if request.path.is_dir() {
        request.path.join(MANIFEST_FILE)
    } else {
        request.path
    };
    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let index = SectionIndex::parse(&text).with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut output = String::new();
    render_sections(&mut output, &index);
    Ok(output)
}
