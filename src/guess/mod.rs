pub mod builtins;
pub mod extract;
pub mod normalize;

pub use builtins::{filter_builtins, BuiltinProvider, NodeBuiltins, StaticBuiltins};
pub use extract::{ImportExtractor, IMPORT_PATTERNS};
pub use normalize::normalize;

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::core::PkgName;
use crate::error::Result;
use crate::util::walk::SourceFile;

/// Packages the sources import that are neither local nor runtime built-ins.
pub fn guess_packages(
    files: &[SourceFile],
    builtins: &dyn BuiltinProvider,
) -> Result<BTreeSet<PkgName>> {
    let extractor = ImportExtractor::new()?;
    let mut candidates = BTreeSet::new();
    for raw in extractor.extract_all(files) {
        match normalize(raw) {
            Some(name) => {
                trace!(raw, name = %name, "matched import");
                candidates.insert(name);
            }
            None => trace!(raw, "skipping local import"),
        }
    }

    let builtin_modules = builtins.builtin_modules()?;
    let guessed = filter_builtins(candidates, &builtin_modules);
    debug!(files = files.len(), packages = guessed.len(), "guessed dependencies");
    Ok(guessed)
}
