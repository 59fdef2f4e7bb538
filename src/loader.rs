//! Input discovery and loading.
//!
//! Resolves a file/directory/pattern input into article documents and
//! probes for the optional supplement and protocol companion files that
//! accompany an article under review.

use crate::models::Document;
use anyhow::{bail, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extensions probed when looking for companion files, in order.
const COMPANION_EXTENSIONS: [&str; 4] = [".txt", ".pdf", ".docx", ""];

/// Supplement and protocol texts found next to an article.
#[derive(Debug, Default)]
pub struct Companions {
    pub supplement: Option<String>,
    pub protocol: Option<String>,
}

impl Companions {
    pub fn any(&self) -> bool {
        self.supplement.is_some() || self.protocol.is_some()
    }
}

/// Find article files for the given input.
///
/// A file path yields that single file. A directory is scanned one
/// level deep for names matching `pattern`, sorted by name. Anything
/// else is treated as `<dir>/<name-pattern>` (e.g. `articles/rct_*.txt`).
pub fn find_article_files(input: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        debug!("Single file provided: {}", input.display());
        return Ok(vec![input.to_path_buf()]);
    }

    if input.is_dir() {
        debug!("Scanning {} for '{}'", input.display(), pattern);
        return Ok(scan_directory(input, pattern));
    }

    // Interpret the last path component as a wildcard pattern.
    if let (Some(parent), Some(name)) = (input.parent(), input.file_name()) {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if parent.is_dir() {
            let name = name.to_string_lossy();
            debug!("Scanning {} for '{}'", parent.display(), name);
            return Ok(scan_directory(parent, &name));
        }
    }

    bail!("Input not found: {}", input.display())
}

fn scan_directory(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if wildcard_match(pattern, &name) {
            files.push(entry.into_path());
        }
    }

    files
}

/// Read article files into documents, numbering them in input order.
///
/// A file that fails to read is skipped with a warning; it never aborts
/// the run.
pub fn read_documents(paths: &[PathBuf]) -> Vec<Document> {
    let mut documents = Vec::new();

    for path in paths {
        match fs::read_to_string(path) {
            Ok(content) => {
                let document = Document::new(documents.len() + 1, path, content);
                info!(
                    "Read article {}: {} ({} characters)",
                    document.number, document.name, document.chars
                );
                documents.push(document);
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
            }
        }
    }

    if !documents.is_empty() {
        let total: usize = documents.iter().map(|d| d.chars).sum();
        info!(
            "Loaded {} of {} files, {} characters total",
            documents.len(),
            paths.len(),
            total
        );
        for document in &documents {
            let share = (document.chars as f64 / total.max(1) as f64) * 100.0;
            debug!(
                "Article {}: {} chars ({:.1}%)",
                document.number, document.chars, share
            );
        }
    }

    documents
}

/// Load the supplement and protocol companions for an article, if present.
///
/// Probes `Supplements/{stem}_supp{ext}` and `Protocols/{stem}_protocol{ext}`
/// next to the article for each known extension. Absence is not an error.
pub fn load_companions(article_path: &Path) -> Companions {
    let stem = article_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base_dir = article_path.parent().unwrap_or_else(|| Path::new("."));

    Companions {
        supplement: probe_companion(base_dir, "Supplements", &format!("{stem}_supp")),
        protocol: probe_companion(base_dir, "Protocols", &format!("{stem}_protocol")),
    }
}

fn probe_companion(base_dir: &Path, subdir: &str, base_name: &str) -> Option<String> {
    for ext in COMPANION_EXTENSIONS {
        let candidate = base_dir.join(subdir).join(format!("{base_name}{ext}"));
        if !candidate.exists() {
            continue;
        }
        match fs::read(&candidate) {
            Ok(bytes) => {
                info!("Found companion file: {}", candidate.display());
                return Some(String::from_utf8_lossy(&bytes).into_owned());
            }
            Err(e) => {
                debug!("Cannot read {}: {}", candidate.display(), e);
            }
        }
    }
    None
}

/// Match a file name against a `*`-wildcard pattern. `*` matches any
/// run of characters, including none; everything else is literal.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == name;
    }

    let mut rest = name;
    let last = parts.len() - 1;

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == last {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(idx) => rest = &rest[idx + part.len()..],
                None => return false,
            }
        }
    }

    true
}
