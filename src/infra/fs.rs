//! Filesystem-backed content source.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::debug;
use walkdir::WalkDir;

use crate::application::repos::{ContentSource, RepoError, SourceDocument};
use crate::domain::types::ContentKind;
use crate::infra::error::InfraError;

const DATA_DIR: &str = "data";
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "mdx"];

/// Reads `<root>/<section>/**/*.md(x)` and `<root>/data/*.json`.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    /// Fails when `root` is not an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, InfraError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(InfraError::path(
                root.display(),
                "content root does not exist or is not a directory",
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_paths(&self, kind: ContentKind) -> Result<Vec<PathBuf>, RepoError> {
        let dir = self.root.join(kind.section());
        if !dir.is_dir() {
            debug!(
                target = "infra::fs",
                dir = %dir.display(),
                "content directory missing; treating as empty"
            );
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry.map_err(|err| RepoError::io(&dir, err))?;
            if entry.file_type().is_file() && is_document(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|wanted| ext.eq_ignore_ascii_case(wanted))
        })
}

#[async_trait]
impl ContentSource for FsContentSource {
    async fn list_documents(&self, kind: ContentKind) -> Result<Vec<SourceDocument>, RepoError> {
        let mut documents = Vec::new();
        for path in self.document_paths(kind)? {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| RepoError::io(&path, err))?;
            documents.push(SourceDocument { path, contents });
        }
        Ok(documents)
    }

    async fn read_data(&self, name: &str) -> Result<Option<String>, RepoError> {
        let path = self.root.join(DATA_DIR).join(format!("{name}.json"));
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(RepoError::io(&path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_root_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        assert!(FsContentSource::open(dir.path().join("absent")).is_err());
    }

    #[tokio::test]
    async fn lists_markdown_documents_in_name_order() {
        let dir = TempDir::new().expect("tempdir");
        let blog = dir.path().join("blog");
        fs::create_dir_all(blog.join("nested")).expect("mkdir");
        fs::write(blog.join("b.md"), "b").expect("write");
        fs::write(blog.join("a.MDX"), "a").expect("write");
        fs::write(blog.join("notes.txt"), "skip").expect("write");
        fs::write(blog.join("nested/c.md"), "c").expect("write");

        let source = FsContentSource::open(dir.path()).expect("source");
        let documents = source.list_documents(ContentKind::Blog).await.expect("list");
        let contents: Vec<_> = documents.iter().map(|doc| doc.contents.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);

        let til = source.list_documents(ContentKind::Til).await.expect("list");
        assert!(til.is_empty());
    }

    #[tokio::test]
    async fn data_files_are_optional() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("data")).expect("mkdir");
        fs::write(dir.path().join("data/topics.json"), "[]").expect("write");

        let source = FsContentSource::open(dir.path()).expect("source");
        assert_eq!(
            source.read_data("topics").await.expect("read"),
            Some("[]".to_string())
        );
        assert_eq!(source.read_data("uses").await.expect("read"), None);
    }
}
