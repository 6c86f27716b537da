//! Loading template content from outside the engine.
//!
//! The engine itself only ever sees strings. A [`ContentSource`] turns an
//! external reference (a file name, a key) into template text.
//!
//! Two sources are provided:
//!
//! | Source | Reference | Resolves to |
//! |--------|-----------|-------------|
//! | [`FileSource`] | path relative to a root directory | file content |
//! | `HashMap<String, String>` | key | the stored string |
//!
//! File references without an extension get [`TEMPLATE_EXTENSION`]
//! appended, so `"main"` and `"main.tmpl"` load the same file.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, TemplateError};
use crate::template::Template;

/// Extension of template files on disk.
pub const TEMPLATE_EXTENSION: &str = ".tmpl";

/// Supplies raw template text for a reference.
pub trait ContentSource {
    /// Returns the full text behind `reference`.
    ///
    /// # Errors
    ///
    /// [`TemplateError::SourceNotFound`] if the reference does not resolve.
    fn fetch(&self, reference: &str) -> Result<String>;

    /// Where `reference` lives, for diagnostics. `None` if not file-backed.
    fn locate(&self, _reference: &str) -> Option<PathBuf> {
        None
    }
}

impl ContentSource for HashMap<String, String> {
    fn fetch(&self, reference: &str) -> Result<String> {
        self.get(reference)
            .cloned()
            .ok_or_else(|| TemplateError::SourceNotFound {
                reference: reference.to_string(),
            })
    }
}

/// Reads templates from files under a root directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, reference: &str) -> PathBuf {
        let path = self.root.join(reference);
        if path.extension().is_some() {
            path
        } else {
            self.root.join(format!("{reference}{TEMPLATE_EXTENSION}"))
        }
    }
}

impl ContentSource for FileSource {
    fn fetch(&self, reference: &str) -> Result<String> {
        read_file(&self.path_for(reference))
    }

    fn locate(&self, reference: &str) -> Option<PathBuf> {
        Some(self.path_for(reference))
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => TemplateError::SourceNotFound {
            reference: path.display().to_string(),
        },
        _ => TemplateError::Io {
            path: path.to_path_buf(),
            source: err,
        },
    })
}

/// Derives a template name from a file path: the file name without the
/// template extension.
pub fn name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.strip_suffix(TEMPLATE_EXTENSION) {
        Some(stem) => stem.to_string(),
        None => file_name,
    }
}

impl Template {
    /// Loads a template from a file, named after the file.
    ///
    /// `main.tmpl` becomes a template named `main`. The path is recorded as
    /// the template's origin and its parent as the template's directory.
    /// Block rows are not extracted.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::SourceNotFound`] if the file does not exist
    /// - [`TemplateError::Io`] for any other read failure
    pub fn from_file(path: impl AsRef<Path>) -> Result<Template> {
        let path = path.as_ref();
        Self::from_file_named(path, name_from_path(path))
    }

    /// Loads a template from a file under an explicit name.
    pub fn from_file_named(path: impl AsRef<Path>, name: impl Into<String>) -> Result<Template> {
        let path = path.as_ref();
        let content = read_file(path)?;
        log::debug!("loaded template from {}", path.display());

        let mut template = Template::named(name).with_content(content);
        template.origin = Some(path.to_path_buf());
        template.dir = path.parent().map(Path::to_path_buf);
        Ok(template)
    }

    /// Loads a template from `source`, named after `reference`.
    ///
    /// For file-backed sources the resolved path becomes the origin.
    pub fn load(source: &dyn ContentSource, reference: &str) -> Result<Template> {
        let content = source.fetch(reference)?;
        log::debug!("loaded template '{reference}'");

        let mut template =
            Template::named(name_from_path(Path::new(reference))).with_content(content);
        if let Some(path) = source.locate(reference) {
            template.dir = path.parent().map(Path::to_path_buf);
            template.origin = Some(path);
        }
        Ok(template)
    }
}
