use std::env;
use std::path::{Path, PathBuf};

use crate::config::{BackendConfig, ConfigError};

#[derive(Debug, Clone)]
pub struct ResolvedProject {
    pub root: PathBuf,
    pub config_path: PathBuf,
}

pub fn resolve_project_with_override(
    start: impl AsRef<Path>,
    project_dir: Option<PathBuf>,
) -> Result<ResolvedProject, ConfigError> {
    if let Some(root) = project_dir {
        return resolve_with_root(root);
    }

    if let Ok(path) = env::var("UPM_PROJECT_DIR") {
        return resolve_with_root(PathBuf::from(path));
    }

    resolve_with_root(start.as_ref().to_path_buf())
}

/// Reads `.upm/config.toml`; a missing file yields the defaults.
pub fn load_backend_config(path: &Path) -> Result<BackendConfig, ConfigError> {
    let mut config = if path.is_file() {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        BackendConfig::default()
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut BackendConfig) {
    if let Ok(url) = env::var("UPM_REGISTRY_URL") {
        config.registry.url = url;
    }
    if let Ok(yarn) = env::var("UPM_YARN") {
        config.tools.yarn = yarn;
    }
    if let Ok(node) = env::var("UPM_NODE") {
        config.tools.node = node;
    }
}

fn resolve_with_root(root: PathBuf) -> Result<ResolvedProject, ConfigError> {
    if !root.is_dir() {
        return Err(ConfigError::InvalidProject(root));
    }

    let config_path = root.join(".upm").join("config.toml");
    Ok(ResolvedProject { root, config_path })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::config::resolve::{load_backend_config, resolve_project_with_override};
    use crate::config::ConfigError;

    #[test]
    fn missing_config_file_yields_defaults() {
        let root = unique_temp_dir("config-missing");
        fs::create_dir_all(&root).expect("create root");
        let resolved =
            resolve_project_with_override(&root, Some(root.clone())).expect("resolve project");
        let config = load_backend_config(&resolved.config_path).expect("load config");
        assert_eq!(config.guess.ignore_dirs, vec!["node_modules", ".git"]);
        assert!(config.guess.builtins.is_empty());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn reads_partial_config_file() {
        let root = unique_temp_dir("config-partial");
        fs::create_dir_all(root.join(".upm")).expect("create .upm");
        fs::write(
            root.join(".upm").join("config.toml"),
            r#"[guess]
builtins = ["fs", "path"]
"#,
        )
        .expect("write config");
        let resolved =
            resolve_project_with_override(&root, Some(root.clone())).expect("resolve project");
        let config = load_backend_config(&resolved.config_path).expect("load config");
        assert_eq!(config.guess.builtins, vec!["fs", "path"]);
        assert_eq!(config.guess.ignore_dirs, vec!["node_modules", ".git"]);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn rejects_invalid_toml() {
        let root = unique_temp_dir("config-invalid");
        fs::create_dir_all(root.join(".upm")).expect("create .upm");
        let path = root.join(".upm").join("config.toml");
        fs::write(&path, "[guess\nbuiltins = 3").expect("write config");
        let err = load_backend_config(&path).expect_err("expected toml error");
        assert!(matches!(err, ConfigError::Toml { .. }));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn rejects_missing_project_dir() {
        let root = unique_temp_dir("config-nonexistent");
        let err = resolve_project_with_override(&root, Some(root.clone()))
            .expect_err("expected invalid project");
        assert!(matches!(err, ConfigError::InvalidProject(_)));
    }

    fn unique_temp_dir(prefix: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir().join(format!("upm-{prefix}-{pid}-{nanos}"))
    }
}
