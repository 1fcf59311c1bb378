use std::collections::{BTreeMap, BTreeSet};
use std::ops::BitOr;

use crate::core::{PkgInfo, PkgName, PkgSpec, PkgVersion};
use crate::error::Result;

/// Deviations from the default command sequencing that a backend declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Quirks(u8);

impl Quirks {
    pub const NONE: Quirks = Quirks(0);
    /// `add` and `remove` also install, so no separate `install` is needed.
    pub const ADD_REMOVE_ALSO_INSTALLS: Quirks = Quirks(1);
    /// `lock` also installs, so no separate `install` is needed.
    pub const LOCK_ALSO_INSTALLS: Quirks = Quirks(1 << 1);

    pub fn contains(self, other: Quirks) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::ADD_REMOVE_ALSO_INSTALLS) {
            names.push("add-remove-also-installs");
        }
        if self.contains(Self::LOCK_ALSO_INSTALLS) {
            names.push("lock-also-installs");
        }
        names
    }
}

impl BitOr for Quirks {
    type Output = Quirks;

    fn bitor(self, rhs: Quirks) -> Quirks {
        Quirks(self.0 | rhs.0)
    }
}

pub trait LanguageBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn specfile(&self) -> &'static str;
    fn lockfile(&self) -> &'static str;
    fn filename_patterns(&self) -> &'static [&'static str];
    fn quirks(&self) -> Quirks;
    fn guess_regexps(&self) -> &'static [&'static str];

    fn search(&self, query: &str) -> Result<Vec<PkgInfo>>;
    fn info(&self, name: &PkgName) -> Result<Option<PkgInfo>>;

    fn add(&self, pkgs: &BTreeMap<PkgName, PkgSpec>) -> Result<()>;
    fn remove(&self, pkgs: &BTreeSet<PkgName>) -> Result<()>;
    fn lock(&self) -> Result<()>;
    fn install(&self) -> Result<()>;

    fn list_specfile(&self) -> Result<BTreeMap<PkgName, PkgSpec>>;
    fn list_lockfile(&self) -> Result<BTreeMap<PkgName, PkgVersion>>;
    fn guess(&self) -> Result<BTreeSet<PkgName>>;
}
