//! Importers turn files into specification items
//!
//! Each importer claims a set of files by path. The registry is built
//! explicitly at startup; there is no plugin discovery.

mod markdown;
mod specobject;
mod tag;

pub use markdown::MarkdownImporter;
pub use specobject::SpecobjectImporter;
pub use tag::{SUPPORTED_EXTENSIONS, TagImporter};

use eyre::{Result, WrapErr};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracelink_core::{IdentifierError, ItemError, SEPARATOR, SpecificationItem, WILDCARD_TOKEN};
use tracing::{debug, info};

/// Errors that abort the import of a single file
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{file}:{line}: invalid specification item id")]
    Identifier {
        file: String,
        line: usize,
        #[source]
        source: IdentifierError,
    },

    #[error("{file}:{line}: invalid specification item")]
    Item {
        file: String,
        line: usize,
        #[source]
        source: ItemError,
    },

    #[error("{file}:{line}: malformed XML")]
    Xml {
        file: String,
        line: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("{file}:{line}: {message}")]
    Format {
        file: String,
        line: usize,
        message: String,
    },
}

/// Whether `text` is shaped like `<type>~<name>~<revision>`.
///
/// Importers parse such text strictly and fail on errors; anything else
/// (strikethrough, home-relative paths, arrows in code) stays plain text.
/// The revision must be `*` or start with a digit or sign.
pub(crate) fn has_identifier_shape(text: &str) -> bool {
    let mut parts = text.split(SEPARATOR);
    let (Some(artifact_type), Some(name), Some(revision), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if text.contains(char::is_whitespace) {
        return false;
    }

    let type_ok =
        !artifact_type.is_empty() && artifact_type.bytes().all(|b| b.is_ascii_lowercase());
    let name_ok = name.starts_with(|c: char| c.is_ascii_alphanumeric());
    let digits = revision.strip_prefix(['-', '+']).unwrap_or(revision);
    let revision_ok =
        revision == WILDCARD_TOKEN || digits.starts_with(|c: char| c.is_ascii_digit());
    type_ok && name_ok && revision_ok
}

/// A source format that yields specification items
pub trait Importer: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Whether this importer can read the file at `path`
    fn supports(&self, path: &Path) -> bool;

    /// Import all items from `content`. `file` is recorded as the location
    /// of every item.
    fn import(&self, file: &str, content: &str) -> Result<Vec<SpecificationItem>, ImportError>;
}

/// The set of importers available to one run
#[derive(Default)]
pub struct ImporterRegistry {
    importers: Vec<Box<dyn Importer>>,
}

impl ImporterRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the markdown, SpecObject and coverage tag importers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(MarkdownImporter)
            .register(SpecobjectImporter)
            .register(TagImporter);
        registry
    }

    pub fn register(&mut self, importer: impl Importer + 'static) -> &mut Self {
        self.importers.push(Box::new(importer));
        self
    }

    /// The single importer supporting `path`.
    ///
    /// Returns `None` when no importer or more than one importer claims the
    /// file; both cases are logged and the file is skipped.
    pub fn importer_for(&self, path: &Path) -> Option<&dyn Importer> {
        let mut matching = self.importers.iter().filter(|i| i.supports(path));
        let Some(first) = matching.next() else {
            info!("no importer found for {}", path.display());
            return None;
        };
        let others: Vec<&'static str> = matching.map(|i| i.name()).collect();
        if !others.is_empty() {
            info!(
                "more than one importer found for {}: {}, {}",
                path.display(),
                first.name(),
                others.join(", ")
            );
            return None;
        }
        Some(first.as_ref())
    }

    /// Whether exactly one importer claims `path`
    pub fn supports(&self, path: &Path) -> bool {
        self.importers.iter().filter(|i| i.supports(path)).count() == 1
    }
}

/// Collect importable files below `inputs`, sorted for deterministic output.
///
/// Inputs may be files or directories. Directories are walked with
/// gitignore rules applied; `exclude` patterns match paths relative to `root`.
pub fn discover(
    root: &Path,
    inputs: &[PathBuf],
    exclude: &[String],
    registry: &ImporterRegistry,
) -> Result<Vec<PathBuf>> {
    let excluded = crate::exclude_matcher(exclude)?;
    let mut files = Vec::new();

    for input in inputs {
        let input = if input.is_absolute() {
            input.clone()
        } else {
            root.join(input)
        };
        if !input.exists() {
            eyre::bail!("Input path does not exist: {}", input.display());
        }

        let walker = WalkBuilder::new(&input)
            .follow_links(true)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build();

        for entry in walker {
            let entry = entry.wrap_err_with(|| format!("Failed to walk {}", input.display()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = display_path(root, path);
            if excluded.is_match(&relative) {
                continue;
            }

            // explicitly named files go through the registry so the skip is logged
            let explicit = entry.depth() == 0;
            if explicit || registry.supports(path) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    debug!(files = files.len(), "discovered input files");
    Ok(files)
}

/// Import every file with its registered importer.
///
/// Files are read and parsed in parallel; the result keeps the order of
/// `files`, and items keep their order inside each file.
pub fn import_files(
    root: &Path,
    files: &[PathBuf],
    registry: &ImporterRegistry,
) -> Result<Vec<SpecificationItem>> {
    let per_file = files
        .par_iter()
        .map(|path| -> Result<Vec<SpecificationItem>> {
            let Some(importer) = registry.importer_for(path) else {
                return Ok(Vec::new());
            };
            let content = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            let items = importer.import(&display_path(root, path), &content)?;
            debug!(
                importer = importer.name(),
                items = items.len(),
                "imported {}",
                path.display()
            );
            Ok(items)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(per_file.into_iter().flatten().collect())
}

/// Path relative to `root` with forward slashes, as shown in reports
fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
