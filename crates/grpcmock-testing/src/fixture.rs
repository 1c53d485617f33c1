//! Temporary stubs directories.

use std::fs;
use std::path::Path;

use grpcmock_stub::{REQUEST_SUFFIX, RESPONSE_SUFFIX};
use serde_json::Value;
use tempfile::TempDir;

/// A stubs directory removed when dropped.
///
/// # Example
/// ```no_run
/// use grpcmock_testing::StubDir;
/// use serde_json::json;
///
/// let stubs = StubDir::new();
/// stubs.pair("hello__ExampleMethod", &json!({"req": "hi"}), &json!({"res": "hello"}));
/// ```
pub struct StubDir {
    dir: TempDir,
}

impl StubDir {
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        let dir = tempfile::tempdir()
            .unwrap_or_else(|e| panic!("failed to create stubs directory: {e}"));
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<stem>__request.json` and `<stem>__response.json`. `stem` may
    /// contain `/` to place the pair in a subdirectory.
    pub fn pair(&self, stem: &str, request: &Value, response: &Value) -> &Self {
        self.file(&format!("{stem}_{REQUEST_SUFFIX}"), &request.to_string());
        self.file(&format!("{stem}_{RESPONSE_SUFFIX}"), &response.to_string());
        self
    }

    /// Write an arbitrary file relative to the root.
    pub fn file(&self, relative_path: &str, contents: &str) -> &Self {
        let full_path = self.dir.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("failed to create {}: {e}", parent.display()));
        }
        fs::write(&full_path, contents)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", full_path.display()));
        self
    }
}

impl Default for StubDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use grpcmock_stub::StubIndex;
    use serde_json::json;

    use super::*;

    #[test]
    fn should_write_pairs_the_index_understands() {
        let stubs = StubDir::new();
        stubs
            .pair("a__Greet", &json!({"name": "a"}), &json!({"text": "hi a"}))
            .pair("nested/Greet", &json!({}), &json!({"text": "hi"}));

        assert!(stubs.path().join("a__Greet__request.json").is_file());
        assert!(stubs.path().join("nested/Greet__response.json").is_file());

        let index = StubIndex::load(stubs.path()).unwrap();
        assert_eq!(index.methods(), vec!["Greet"]);
        assert_eq!(index.pairs("Greet").len(), 2);
    }
}
