//! Writes generated files below the output directory.

use std::path::{Component, Path, PathBuf};

use metrics::counter;

use crate::infra::error::InfraError;

#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Create the directory when missing; failure here is fatal for a build.
    pub async fn prepare(root: impl Into<PathBuf>) -> Result<Self, InfraError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|err| InfraError::path(root.display(), err))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub async fn write(
        &self,
        relative: &str,
        contents: impl AsRef<[u8]>,
    ) -> Result<PathBuf, InfraError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| InfraError::path(parent.display(), err))?;
        }
        tokio::fs::write(&path, contents)
            .await
            .map_err(|err| InfraError::path(path.display(), err))?;
        counter!("inkpress_pages_written_total").increment(1);
        Ok(path)
    }

    /// Write an HTML page for a site path such as `/blog/hello/`.
    ///
    /// Paths with an empty segment (`/topics//`) are rejected so they cannot
    /// land on their parent's index page.
    pub async fn write_page(&self, site_path: &str, html: &str) -> Result<PathBuf, InfraError> {
        let trimmed = site_path.trim_matches('/');
        if !trimmed.is_empty() && trimmed.split('/').any(str::is_empty) {
            return Err(InfraError::path(site_path, "page path has an empty segment"));
        }
        self.write(&page_file(site_path), html).await
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, InfraError> {
        let relative = Path::new(relative.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !safe || relative.as_os_str().is_empty() {
            return Err(InfraError::path(
                relative.display(),
                "output path must stay inside the output directory",
            ));
        }
        Ok(self.root.join(relative))
    }
}

/// `/` → `index.html`, `/blog/x/` → `blog/x/index.html`, `/404.html` unchanged.
pub fn page_file(site_path: &str) -> String {
    let trimmed = site_path.trim_matches('/');
    if trimmed.is_empty() {
        "index.html".to_string()
    } else if Path::new(trimmed).extension().is_some() {
        trimmed.to_string()
    } else {
        format!("{trimmed}/index.html")
    }
}
