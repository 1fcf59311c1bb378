use regex::Regex;

use crate::error::{Result, UpmError};
use crate::util::walk::SourceFile;

/// Import idioms recognized in JavaScript and TypeScript sources. Each has
/// exactly one capture group holding the module specifier.
pub const IMPORT_PATTERNS: [&str; 3] = [
    // import x from "mod"; import * as x from "mod"; export { y } from "mod"
    r#"(?m)from\s*['"]([^'"]+)['"]\s*;?\s*$"#,
    // import "mod";
    r#"(?m)import\s*['"]([^'"]+)['"]\s*;?\s*$"#,
    // require("mod"), import("mod")
    r#"(?m)(?:require|import)\s*\(\s*['"]([^'"{}]+)['"]\s*\)"#,
];

#[derive(Debug, Clone)]
pub struct ImportExtractor {
    regex: Regex,
}

impl ImportExtractor {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(&IMPORT_PATTERNS.join("|"))
            .map_err(|err| UpmError::Other(anyhow::Error::new(err)))?;
        Ok(Self { regex })
    }

    /// Raw specifiers in `text`, in match order.
    pub fn extract<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        self.regex.captures_iter(text).filter_map(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .next()
                .map(|group| group.as_str())
        })
    }

    /// Raw specifiers across `files`, in file order then match order.
    pub fn extract_all<'a>(
        &'a self,
        files: &'a [SourceFile],
    ) -> impl Iterator<Item = &'a str> + 'a {
        files.iter().flat_map(move |file| self.extract(&file.text))
    }
}
