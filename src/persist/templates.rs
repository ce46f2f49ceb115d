use std::path::{Path, PathBuf};

use crate::foundation::error::{StickgridError, StickgridResult};
use crate::frame::model::Frame;
use crate::persist::codec::load_frame;

/// Directory of named frame files (poses and backgrounds).
#[derive(Clone, Debug)]
pub struct TemplateDir {
    root: PathBuf,
}

impl TemplateDir {
    /// Open an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> StickgridResult<Self> {
        let root = root.into();
        let meta = std::fs::metadata(&root).map_err(|e| StickgridError::from_fs(e, &root))?;
        if !meta.is_dir() {
            return Err(StickgridError::invalid_argument(format!(
                "template path '{}' is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Directory this set was opened on.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted file names of every `*.json` template.
    pub fn list(&self) -> StickgridResult<Vec<String>> {
        let rd = std::fs::read_dir(&self.root).map_err(|e| StickgridError::from_fs(e, &self.root))?;
        let mut names = Vec::new();
        for entry in rd {
            let entry = entry.map_err(|e| StickgridError::from_fs(e, &self.root))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"));
            if !is_json {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Resolve a template name to a path inside the directory.
    ///
    /// The `.json` extension may be omitted. Names are relative and must not leave the directory.
    pub fn resolve(&self, name: &str) -> StickgridResult<PathBuf> {
        let rel = normalize_template_name(name)?;
        let mut path = self.root.join(&rel);
        if !path.is_file() && Path::new(&rel).extension().is_none() {
            path = self.root.join(format!("{rel}.json"));
        }
        if !path.is_file() {
            return Err(StickgridError::not_found(format!(
                "template '{name}' in '{}'",
                self.root.display()
            )));
        }
        Ok(path)
    }

    /// Load a template by name.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn load(&self, name: &str) -> StickgridResult<Frame> {
        load_frame(&self.resolve(name)?)
    }
}

/// Normalize a template name to a `/`-separated relative path.
pub fn normalize_template_name(name: &str) -> StickgridResult<String> {
    let s = name.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StickgridError::invalid_argument(
            "template names must be relative",
        ));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StickgridError::invalid_argument(
                "template names must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StickgridError::invalid_argument(
            "template name must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/persist/templates.rs"]
mod tests;
