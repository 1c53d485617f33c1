//! Fixture discovery and resolution.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::compare::compare;
use crate::error::StubError;

pub const REQUEST_SUFFIX: &str = "_request.json";
pub const RESPONSE_SUFFIX: &str = "_response.json";

static FILE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.*?__)?(?P<method>.+?)__request\.json$").expect("valid file name pattern")
});

/// One request fixture and the response served when it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePair {
    pub request_path: PathBuf,
    pub response_path: PathBuf,
}

/// Fixture pairs grouped by method name, in traversal order.
#[derive(Debug, Clone, Default)]
pub struct StubIndex {
    methods: HashMap<String, Vec<FixturePair>>,
}

impl StubIndex {
    /// Walk `root` and pair every request fixture with its response.
    ///
    /// Entries are visited sorted by file name, so traversal order is stable
    /// across platforms.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, StubError> {
        let root = root.as_ref();
        let meta = fs::metadata(root).map_err(|source| StubError::Directory {
            path: root.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(StubError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let mut index = Self::default();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy();
            if file_name.ends_with(RESPONSE_SUFFIX) {
                continue;
            }
            let Some(base) = file_name.strip_suffix(REQUEST_SUFFIX) else {
                warn!(
                    path = %path.display(),
                    "skipping file without {REQUEST_SUFFIX:?} suffix"
                );
                continue;
            };

            let response_path = path.with_file_name(format!("{base}{RESPONSE_SUFFIX}"));
            match fs::metadata(&response_path) {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(StubError::MissingResponse {
                        request: path.to_path_buf(),
                        response: response_path,
                    });
                }
                Err(source) => {
                    return Err(StubError::Read {
                        path: response_path,
                        source,
                    });
                }
            }

            let method = method_from_file_name(&file_name)?;
            index.methods.entry(method).or_default().push(FixturePair {
                request_path: path.to_path_buf(),
                response_path,
            });
        }

        debug!(
            root = %root.display(),
            methods = index.methods.len(),
            pairs = index.len(),
            "stub files mapped"
        );
        Ok(index)
    }

    pub fn pairs(&self, method: &str) -> &[FixturePair] {
        self.methods
            .get(method)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Method names with at least one fixture pair, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    /// Total number of fixture pairs.
    pub fn len(&self) -> usize {
        self.methods.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Serve `request` from the first fixture pair of `method` that matches.
    ///
    /// Fixture files are read on every call. A request fixture that is not
    /// valid JSON fails the whole resolution rather than being skipped.
    pub fn resolve<Req, Res>(&self, method: &str, request: &Req) -> Result<Res, StubError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let live = serde_json::to_value(request).map_err(StubError::SerializeRequest)?;

        for pair in self.pairs(method) {
            let fixture: serde_json::Value = serde_json::from_str(&read(&pair.request_path)?)
                .map_err(|source| StubError::InvalidJson {
                    path: pair.request_path.clone(),
                    source,
                })?;
            if !compare(&live, &fixture).is_match() {
                continue;
            }

            let body = read(&pair.response_path)?;
            let response =
                serde_json::from_str(&body).map_err(|source| StubError::DeserializeResponse {
                    path: pair.response_path.clone(),
                    source,
                })?;
            debug!(
                method,
                fixture = %pair.request_path.display(),
                "request served from stub"
            );
            return Ok(response);
        }

        Err(StubError::NoMatchingStub {
            method: method.to_owned(),
        })
    }
}

/// Extract the RPC method from `[<description>__]<Method>__request.json`.
pub fn method_from_file_name(file_name: &str) -> Result<String, StubError> {
    FILE_NAME_PATTERN
        .captures(file_name)
        .and_then(|caps| caps.name("method"))
        .map(|m| m.as_str().to_owned())
        .ok_or_else(|| StubError::InvalidFileName {
            file_name: file_name.to_owned(),
        })
}

pub fn map_stub_files(root: impl AsRef<Path>) -> Result<StubIndex, StubError> {
    StubIndex::load(root)
}

/// Walk `root` afresh and resolve `request` against it.
pub fn resolve_from_dir<Req, Res>(
    root: impl AsRef<Path>,
    method: &str,
    request: &Req,
) -> Result<Res, StubError>
where
    Req: Serialize + ?Sized,
    Res: DeserializeOwned,
{
    StubIndex::load(root)?.resolve(method, request)
}

fn read(path: &Path) -> Result<String, StubError> {
    fs::read_to_string(path).map_err(|source| StubError::Read {
        path: path.to_path_buf(),
        source,
    })
}
