//! Stylesheets, scripts and icons embedded in the binary.

use include_dir::{Dir, include_dir};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

static ASSET_VERSION: Lazy<String> = Lazy::new(|| {
    let mut hasher = Sha256::new();
    for (path, contents) in static_files() {
        hasher.update(path.as_bytes());
        hasher.update(contents);
    }
    let digest = hex::encode(hasher.finalize());
    digest[..12].to_string()
});

/// Every embedded file as `(relative path, contents)`, sorted by path.
pub fn static_files() -> Vec<(String, &'static [u8])> {
    let mut files = Vec::new();
    collect(&STATIC_ASSETS, &mut files);
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}

fn collect(dir: &'static Dir<'static>, files: &mut Vec<(String, &'static [u8])>) {
    for file in dir.files() {
        files.push((file.path().to_string_lossy().replace('\\', "/"), file.contents()));
    }
    for child in dir.dirs() {
        collect(child, files);
    }
}

/// Short content hash appended to stylesheet URLs for cache busting.
pub fn asset_version() -> &'static str {
    ASSET_VERSION.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_contains_site_assets() {
        let files = static_files();
        let paths: Vec<_> = files.iter().map(|(path, _)| path.as_str()).collect();
        assert!(paths.contains(&"assets/site.css"));
        assert!(paths.contains(&"favicon.svg"));
    }

    #[test]
    fn version_is_stable_hex() {
        let version = asset_version();
        assert_eq!(version.len(), 12);
        assert!(version.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_eq!(version, asset_version());
    }
}
