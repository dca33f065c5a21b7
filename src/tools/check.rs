use crate::catalog::discover;
use crate::codec::parse_entries;
use crate::config::Config;
use crate::error::Result;
use crate::format::render_report;
use crate::sections::{MANIFEST_FILE, SectionFile, SectionIndex};
use crate::validate::{ValidationOptions, ValidationReport, conflicting_anchors, validate};
use anyhow::Context;
use futures::future::join_all;
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Parameters for the check command
#[derive(Debug, Clone)]
pub struct CheckRequest {
    /// A chunk file, a search directory, or a documentation tree
    pub path: PathBuf,
    /// Overrides `validation.require_anchor` from the config
    pub require_anchor: Option<bool>,
    pub json: bool,
}

/// Result of a check run: rendered output and whether any errors were found.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub output: String,
    pub ok: bool,
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    #[serde(flatten)]
    report: ValidationReport,
    conflicting_anchors: Vec<String>,
}

/// A file that could not be read or parsed, as it appears in `--json` output.
#[derive(Debug, Serialize)]
struct FileFailure {
    path: PathBuf,
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum FileResult {
    Checked(FileReport),
    Failed(FileFailure),
}

/// Validate every chunk file reachable from `request.path`.
///
/// Files that fail to parse count as errors. A manifest that fails to parse
/// is an error for its directory.
pub async fn handle_check(config: &Config, request: CheckRequest) -> Result<CheckOutcome> {
    let mut options = config.validation.clone();
    if let Some(require_anchor) = request.require_anchor {
        options.require_anchor = require_anchor;
    }

    let files = collect_chunk_files(&request.path).await?;
    if files.is_empty() {
        anyhow::bail!("No search data files found under {}", request.path.display());
    }
    tracing::info!("Checking {} search data files", files.len());

    let results = join_all(files.iter().map(|path| check_file(path, &options))).await;

    let mut output = String::new();
    let mut reports = vec![];
    let mut ok = true;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(file_report) => {
                ok &= file_report.report.is_ok();
                if !request.json {
                    render_report(&mut output, &path.display().to_string(), &file_report.report);
                    for anchor in &file_report.conflicting_anchors {
                        let _ = writeln!(output, "  note: anchor '{}' is shared by different titles", anchor);
                    }
                }
                reports.push(FileResult::Checked(file_report));
            }
            Err(e) => {
                ok = false;
                if request.json {
                    reports.push(FileResult::Failed(FileFailure {
                        path: path.clone(),
                        error: format!("{:#}", e),
                    }));
                } else {
                    let _ = writeln!(output, "{}: {:#}", path.display(), e);
                }
            }
        }
    }

    if request.json {
        output = serde_json::to_string_pretty(&reports).context("Failed to serialize reports")?;
        output.push('\n');
    }

    Ok(CheckOutcome { output, ok })
}

async fn check_file(path: &Path, options: &ValidationOptions) -> Result<FileReport> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if path.file_name().is_some_and(|n| n == MANIFEST_FILE) {
        SectionIndex::parse(&text).context("invalid manifest")?;
        return Ok(FileReport {
            path: path.to_path_buf(),
            report: ValidationReport::default(),
            conflicting_anchors: vec![],
        });
    }

    let entries = parse_entries(&text)?;
    let report = validate(&entries, options);
    Ok(FileReport {
        path: path.to_path_buf(),
        report,
        conflicting_anchors: conflicting_anchors(&entries),
    })
}

/// Resolves `path` to the sorted list of chunk (and manifest) files to check.
async fn collect_chunk_files(path: &Path) -> Result<Vec<PathBuf>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to access {}", path.display()))?;
    if metadata.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = vec![];
    for dir in discover(path).await? {
        let mut read_dir = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("Failed to read {}", dir.display()))?;
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name == MANIFEST_FILE || SectionFile::from_file_name(name).is_some() {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}
