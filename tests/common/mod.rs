#![allow(dead_code)]

pub mod workspace {
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    pub const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/controllers");

    /// A cache directory and a controller directory, both removed on drop.
    pub struct Workspace {
        _root: TempDir,
        pub cache_dir: PathBuf,
        pub controller_dir: PathBuf,
    }

    impl Workspace {
        pub fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let cache_dir = root.path().join("cache");
            let controller_dir = root.path().join("controllers");
            std::fs::create_dir_all(&controller_dir).unwrap();
            Self {
                _root: root,
                cache_dir,
                controller_dir,
            }
        }

        /// A workspace whose controller directory holds copies of the named fixtures.
        pub fn with_fixtures(names: &[&str]) -> Self {
            let ws = Self::new();
            for name in names {
                ws.add_fixture(name);
            }
            ws
        }

        pub fn add_fixture(&self, name: &str) {
            let file = format!("{name}.rs");
            let source = Path::new(FIXTURES).join(&file);
            std::fs::copy(source, self.controller_dir.join(&file)).unwrap();
        }

        pub fn write_controller(&self, file: &str, source: &str) {
            std::fs::write(self.controller_dir.join(file), source).unwrap();
        }

        pub fn artifact(&self) -> PathBuf {
            routeforge::cache::artifact_path(&self.cache_dir)
        }

        pub fn artifact_text(&self) -> String {
            std::fs::read_to_string(self.artifact()).unwrap()
        }
    }
}
