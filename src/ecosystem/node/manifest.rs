use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::{PkgName, PkgSpec};
use crate::error::{Result, UpmError};

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: Option<BTreeMap<String, String>>,
}

/// Reads `package.json` and merges both dependency groups.
pub fn read_specfile(path: &Path) -> Result<BTreeMap<PkgName, PkgSpec>> {
    let contents = std::fs::read_to_string(path).map_err(|source| UpmError::Specfile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_specfile(&contents).map_err(|source| UpmError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

/// Runtime entries first, then development entries; on a name collision
/// the development spec wins.
pub fn parse_specfile(contents: &str) -> serde_json::Result<BTreeMap<PkgName, PkgSpec>> {
    let manifest: PackageJson = serde_json::from_str(contents)?;
    let mut pkgs = BTreeMap::new();
    let groups = [manifest.dependencies, manifest.dev_dependencies];
    for (name, spec) in groups.into_iter().flatten().flatten() {
        pkgs.insert(PkgName::new(name), PkgSpec::new(spec));
    }
    Ok(pkgs)
}
