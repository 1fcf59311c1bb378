pub mod node;
pub mod traits;

use std::path::Path;

use crate::config::BackendConfig;
use crate::guess::{BuiltinProvider, NodeBuiltins, StaticBuiltins};
use crate::registry::npm::NpmRegistry;

pub fn backend_for(root: &Path, config: &BackendConfig) -> Box<dyn traits::LanguageBackend> {
    let builtins: Box<dyn BuiltinProvider> = if config.guess.builtins.is_empty() {
        Box::new(NodeBuiltins::new(config.tools.node.clone(), root))
    } else {
        Box::new(StaticBuiltins(config.guess.builtins.clone()))
    };
    Box::new(node::YarnBackend::new(
        root,
        config.tools.yarn.clone(),
        config.guess.ignore_dirs.clone(),
        Box::new(NpmRegistry::new(config.registry.url.clone())),
        builtins,
    ))
}
