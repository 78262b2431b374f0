use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Scratch source tree in a temporary directory.
pub struct ProjectFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();

        println!("[FIXTURE] Created temp directory: {root:?}");

        Self { temp_dir, root }
    }

    /// Create a source file with content, making parent directories.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        println!(
            "[FIXTURE] Created file: {:?} ({} bytes)",
            full_path,
            content.len()
        );
        full_path
    }

    /// Current content of a file in the tree.
    #[must_use]
    pub fn read(&self, relative_path: &str) -> String {
        std::fs::read_to_string(self.root.join(relative_path)).expect("Failed to read file")
    }

    #[must_use]
    pub fn path(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for ProjectFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.root);
    }
}
