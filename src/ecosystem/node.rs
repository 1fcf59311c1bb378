pub mod lockfile;
pub mod manifest;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tracing::debug;

use crate::core::{select_latest, PkgInfo, PkgName, PkgSpec, PkgVersion};
use crate::ecosystem::traits::{LanguageBackend, Quirks};
use crate::error::Result;
use crate::guess::{guess_packages, BuiltinProvider, IMPORT_PATTERNS};
use crate::registry::Registry;
use crate::util::command::run_cmd;
use crate::util::walk::search_recursive;

pub const SPECFILE: &str = "package.json";
pub const LOCKFILE: &str = "yarn.lock";
pub const FILENAME_PATTERNS: [&str; 4] = ["*.js", "*.ts", "*.jsx", "*.tsx"];

/// Node.js projects managed with Yarn.
pub struct YarnBackend {
    pub root: PathBuf,
    pub yarn: String,
    pub ignore_dirs: Vec<String>,
    registry: Box<dyn Registry>,
    builtins: Box<dyn BuiltinProvider>,
}

impl YarnBackend {
    pub fn new(
        root: impl Into<PathBuf>,
        yarn: impl Into<String>,
        ignore_dirs: Vec<String>,
        registry: Box<dyn Registry>,
        builtins: Box<dyn BuiltinProvider>,
    ) -> Self {
        Self {
            root: root.into(),
            yarn: yarn.into(),
            ignore_dirs,
            registry,
            builtins,
        }
    }

    /// `yarn add name@spec ...`; a package without a spec is passed bare.
    pub fn add_command(&self, pkgs: &BTreeMap<PkgName, PkgSpec>) -> Vec<String> {
        let mut command = vec![self.yarn.clone(), "add".to_string()];
        command.extend(pkgs.iter().map(|(name, spec)| {
            if spec.is_empty() {
                name.to_string()
            } else {
                format!("{}@{}", name, spec)
            }
        }));
        command
    }

    pub fn remove_command(&self, pkgs: &BTreeSet<PkgName>) -> Vec<String> {
        let mut command = vec![self.yarn.clone(), "remove".to_string()];
        command.extend(pkgs.iter().map(|name| name.to_string()));
        command
    }
}

impl LanguageBackend for YarnBackend {
    fn name(&self) -> &'static str {
        "nodejs-yarn"
    }

    fn specfile(&self) -> &'static str {
        SPECFILE
    }

    fn lockfile(&self) -> &'static str {
        LOCKFILE
    }

    fn filename_patterns(&self) -> &'static [&'static str] {
        &FILENAME_PATTERNS
    }

    fn quirks(&self) -> Quirks {
        Quirks::ADD_REMOVE_ALSO_INSTALLS | Quirks::LOCK_ALSO_INSTALLS
    }

    fn guess_regexps(&self) -> &'static [&'static str] {
        &IMPORT_PATTERNS
    }

    fn search(&self, query: &str) -> Result<Vec<PkgInfo>> {
        self.registry.search(query)
    }

    fn info(&self, name: &PkgName) -> Result<Option<PkgInfo>> {
        let Some(metadata) = self.registry.package(name)? else {
            return Ok(None);
        };
        let mut info = metadata.info;
        if let Some(latest) = select_latest(metadata.versions.keys().map(String::as_str)) {
            info.dependencies = metadata.versions.get(&latest).cloned().unwrap_or_default();
            info.version = latest;
        }
        Ok(Some(info))
    }

    fn add(&self, pkgs: &BTreeMap<PkgName, PkgSpec>) -> Result<()> {
        run_cmd(&self.root, &self.add_command(pkgs))
    }

    fn remove(&self, pkgs: &BTreeSet<PkgName>) -> Result<()> {
        run_cmd(&self.root, &self.remove_command(pkgs))
    }

    fn lock(&self) -> Result<()> {
        run_cmd(&self.root, &[self.yarn.clone(), "upgrade".to_string()])
    }

    fn install(&self) -> Result<()> {
        run_cmd(&self.root, &[self.yarn.clone(), "install".to_string()])
    }

    fn list_specfile(&self) -> Result<BTreeMap<PkgName, PkgSpec>> {
        manifest::read_specfile(&self.root.join(SPECFILE))
    }

    fn list_lockfile(&self) -> Result<BTreeMap<PkgName, PkgVersion>> {
        lockfile::read_lockfile(&self.root.join(LOCKFILE))
    }

    fn guess(&self) -> Result<BTreeSet<PkgName>> {
        let files = search_recursive(&self.root, &FILENAME_PATTERNS, &self.ignore_dirs)?;
        debug!(root = %self.root.display(), files = files.len(), "scanning sources");
        guess_packages(&files, self.builtins.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::core::{PkgInfo, PkgName, PkgSpec};
    use crate::ecosystem::node::YarnBackend;
    use crate::ecosystem::traits::{LanguageBackend, Quirks};
    use crate::error::{Result, UpmError};
    use crate::guess::StaticBuiltins;
    use crate::registry::{PackageMetadata, Registry};

    struct FakeRegistry {
        metadata: Option<PackageMetadata>,
    }

    impl Registry for FakeRegistry {
        fn search(&self, query: &str) -> Result<Vec<PkgInfo>> {
            Ok(vec![PkgInfo {
                name: query.to_string(),
                ..PkgInfo::default()
            }])
        }

        fn package(&self, _name: &PkgName) -> Result<Option<PackageMetadata>> {
            Ok(self.metadata.clone())
        }
    }

    fn backend(root: std::path::PathBuf, metadata: Option<PackageMetadata>) -> YarnBackend {
        YarnBackend::new(
            root,
            "yarn",
            vec!["node_modules".to_string()],
            Box::new(FakeRegistry { metadata }),
            Box::new(StaticBuiltins(vec!["fs".to_string(), "path".to_string()])),
        )
    }

    #[test]
    fn declares_install_quirks() {
        let backend = backend(std::env::temp_dir(), None);
        assert!(backend.quirks().contains(Quirks::ADD_REMOVE_ALSO_INSTALLS));
        assert!(backend.quirks().contains(Quirks::LOCK_ALSO_INSTALLS));
        assert_eq!(backend.specfile(), "package.json");
        assert_eq!(backend.lockfile(), "yarn.lock");
        assert_eq!(backend.guess_regexps().len(), 3);
    }

    #[test]
    fn builds_add_and_remove_arguments() {
        let backend = backend(std::env::temp_dir(), None);
        let mut pkgs = BTreeMap::new();
        pkgs.insert(PkgName::new("react"), PkgSpec::new("^18.0.0"));
        pkgs.insert(PkgName::new("@types/node"), PkgSpec::new(""));
        assert_eq!(backend.add_command(&pkgs), vec![
            "yarn",
            "add",
            "@types/node",
            "react@^18.0.0"
        ]);

        let names: BTreeSet<PkgName> = ["lodash", "chalk"].into_iter().map(PkgName::new).collect();
        assert_eq!(backend.remove_command(&names), vec![
            "yarn", "remove", "chalk", "lodash"
        ]);
    }

    #[test]
    fn info_selects_latest_stable_version() {
        let mut metadata = PackageMetadata::default();
        metadata.info.name = "pkg".to_string();
        for label in ["1.0.0", "2.0.0-beta", "1.9.9", "not-a-version"] {
            metadata.versions.insert(label.to_string(), Vec::new());
        }
        metadata
            .versions
            .insert("1.9.9".to_string(), vec!["dep-a".to_string()]);
        let backend = backend(std::env::temp_dir(), Some(metadata));
        let info = backend
            .info(&PkgName::new("pkg"))
            .expect("info")
            .expect("package exists");
        assert_eq!(info.version, "1.9.9");
        assert_eq!(info.dependencies, vec!["dep-a"]);
    }

    #[test]
    fn info_for_unknown_package_is_none() {
        let backend = backend(std::env::temp_dir(), None);
        assert!(backend.info(&PkgName::new("nope")).expect("info").is_none());
    }

    #[test]
    fn guess_lists_and_lockfile_read_from_project() {
        let root = unique_temp_dir("yarn-backend");
        fs::create_dir_all(root.join("src")).expect("create src");
        fs::create_dir_all(root.join("node_modules").join("x")).expect("create node_modules");
        fs::write(
            root.join("src").join("index.js"),
            "import React from \"react\";\nconst u = require(\"./utils\");\nconst d = import(\"lodash/debounce\");\nconst fs = require('fs');\n",
        )
        .expect("write index.js");
        fs::write(
            root.join("node_modules").join("x").join("index.js"),
            "require('hidden-dep')",
        )
        .expect("write vendored file");
        fs::write(
            root.join("package.json"),
            r#"{"dependencies": {"react": "^18.0.0"}}"#,
        )
        .expect("write package.json");
        fs::write(
            root.join("yarn.lock"),
            "react@^18.0.0:\n  version \"18.2.0\"\n",
        )
        .expect("write yarn.lock");

        let backend = backend(root.clone(), None);
        let guessed = backend.guess().expect("guess");
        let expected: BTreeSet<PkgName> =
            ["lodash", "react"].into_iter().map(PkgName::new).collect();
        assert_eq!(guessed, expected);

        let specs = backend.list_specfile().expect("list specfile");
        assert_eq!(specs[&PkgName::new("react")].as_str(), "^18.0.0");
        let pins = backend.list_lockfile().expect("list lockfile");
        assert_eq!(pins[&PkgName::new("react")].as_str(), "18.2.0");
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_lockfile_is_fatal() {
        let root = unique_temp_dir("yarn-missing-lock");
        fs::create_dir_all(&root).expect("create root");
        let backend = backend(root.clone(), None);
        let err = backend.list_lockfile().expect_err("expected missing lockfile");
        assert!(matches!(err, UpmError::Lockfile { .. }));
        assert!(err.to_string().contains("yarn.lock"));
        let _ = fs::remove_dir_all(&root);
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
