//! Hash utilities
//!
//! SHA1 digests used to tell whether two config snapshots differ.

use sha1::{Digest, Sha1};
use std::path::Path;

/// Calculate SHA1 hash of a file
pub fn sha1_file(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let hash = Sha1::digest(&bytes);
    Ok(format!("{:x}", hash))
}

/// Check whether two files have identical contents
pub fn same_contents(a: &Path, b: &Path) -> std::io::Result<bool> {
    Ok(sha1_file(a)? == sha1_file(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sha1_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            sha1_file(&path).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_same_contents() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, "{}").unwrap();
        std::fs::write(&b, "{}").unwrap();
        assert!(same_contents(&a, &b).unwrap());

        std::fs::write(&b, "{ }").unwrap();
        assert!(!same_contents(&a, &b).unwrap());
    }
}
