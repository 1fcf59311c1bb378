pub mod npm;

use std::collections::BTreeMap;

use crate::core::{PkgInfo, PkgName};
use crate::error::Result;

/// Everything the registry publishes about one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Package fields other than `version` and `dependencies`.
    pub info: PkgInfo,
    /// Each published version label mapped to its dependency names.
    pub versions: BTreeMap<String, Vec<String>>,
}

pub trait Registry: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<PkgInfo>>;

    /// `Ok(None)` when the registry does not know the package.
    fn package(&self, name: &PkgName) -> Result<Option<PackageMetadata>>;
}
