use std::fs;

use tempfile::TempDir;

/// A workspace root holding `files`, keyed by workspace-relative path.
pub fn workspace_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["templates", "layouts", "partials"] {
        fs::create_dir(dir.path().join(sub)).unwrap();
    }
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    dir
}
