use crate::core::PkgName;

/// Maps a raw import specifier to the package that provides it.
///
/// Loader prefixes (`css!./x`) are stripped before anything else, so the
/// final segment decides whether the import is local. Relative imports
/// yield `None`; deep imports collapse to `name` or `@scope/name`.
pub fn normalize(raw: &str) -> Option<PkgName> {
    let module = match raw.rfind('!') {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    };
    if module.is_empty() || module.starts_with('.') {
        return None;
    }
    let name = if module.starts_with('@') {
        match module.match_indices('/').nth(1) {
            Some((idx, _)) => &module[..idx],
            None => module,
        }
    } else {
        match module.find('/') {
            Some(idx) => &module[..idx],
            None => module,
        }
    };
    if name.is_empty() {
        return None;
    }
    Some(PkgName::new(name))
}
