use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use crate::core::{PkgName, PkgVersion};
use crate::error::{Result, UpmError};

/// A block header (`"name@range", "name@other":`) directly followed by its
/// indented `version` line. The optional `@` keeps scoped names intact.
const PIN_PATTERN: &str = r#"(?m)^"?(@?[^@ \n"]+).*:\n  version "(.+)"$"#;

pub fn read_lockfile(path: &Path) -> Result<BTreeMap<PkgName, PkgVersion>> {
    let contents = std::fs::read_to_string(path).map_err(|source| UpmError::Lockfile {
        path: path.to_path_buf(),
        source,
    })?;
    extract_pins(&contents)
}

/// Pinned versions per package. Blocks that do not fit the layout are
/// skipped; a name seen twice keeps its last version.
pub fn extract_pins(contents: &str) -> Result<BTreeMap<PkgName, PkgVersion>> {
    let regex =
        Regex::new(PIN_PATTERN).map_err(|err| UpmError::Other(anyhow::Error::new(err)))?;
    let mut pins = BTreeMap::new();
    for caps in regex.captures_iter(contents) {
        pins.insert(PkgName::new(&caps[1]), PkgVersion::new(&caps[2]));
    }
    Ok(pins)
}
