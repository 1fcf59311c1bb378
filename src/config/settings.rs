use serde::Deserialize;

pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub guess: GuessConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_yarn")]
    pub yarn: String,
    #[serde(default = "default_node")]
    pub node: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yarn: default_yarn(),
            node: default_node(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuessConfig {
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
    /// Fixed built-in module list. When empty, the node runtime is asked instead.
    #[serde(default)]
    pub builtins: Vec<String>,
}

impl Default for GuessConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: default_ignore_dirs(),
            builtins: Vec::new(),
        }
    }
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_yarn() -> String {
    "yarn".to_string()
}

fn default_node() -> String {
    "node".to_string()
}

fn default_ignore_dirs() -> Vec<String> {
    vec!["node_modules".to_string(), ".git".to_string()]
}
