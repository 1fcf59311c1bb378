use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::core::PkgName;
use crate::error::{Result, UpmError};
use crate::util::command::cmd_output;

/// Prints every built-in module of the running Node.js, one per line.
pub const NODE_BUILTINS_SCRIPT: &str =
    r#"require("module").builtinModules.map(x => console.log(x));"#;

pub trait BuiltinProvider: Send + Sync {
    fn builtin_modules(&self) -> Result<Vec<String>>;
}

/// Asks the node runtime for its built-in modules.
#[derive(Debug, Clone)]
pub struct NodeBuiltins {
    pub node: String,
    pub dir: PathBuf,
}

impl NodeBuiltins {
    pub fn new(node: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            node: node.into(),
            dir: dir.into(),
        }
    }
}

impl BuiltinProvider for NodeBuiltins {
    fn builtin_modules(&self) -> Result<Vec<String>> {
        let command = vec![
            self.node.clone(),
            "-e".to_string(),
            NODE_BUILTINS_SCRIPT.to_string(),
        ];
        let stdout = cmd_output(&self.dir, &command)?;
        let text = String::from_utf8(stdout).map_err(|err| UpmError::Command {
            command: self.node.clone(),
            message: err.to_string(),
        })?;
        Ok(parse_module_lines(&text))
    }
}

/// A fixed built-in list, used when the runtime should not be invoked.
#[derive(Debug, Clone, Default)]
pub struct StaticBuiltins(pub Vec<String>);

impl BuiltinProvider for StaticBuiltins {
    fn builtin_modules(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Drops every candidate whose name equals a built-in. No prefix matching.
pub fn filter_builtins(mut candidates: BTreeSet<PkgName>, builtins: &[String]) -> BTreeSet<PkgName> {
    for module in builtins {
        candidates.remove(&PkgName::new(module.as_str()));
    }
    candidates
}

fn parse_module_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
