pub mod pkg;
pub mod version;

pub use pkg::{AuthorInfo, PkgInfo, PkgName, PkgSpec, PkgVersion};
pub use version::select_latest;
