use crate::error::MetadataError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories to skip during traversal
const IGNORE_DIRS: &[&str] = &[
    "__pycache__",
    ".git",
    "venv",
    ".venv",
    "node_modules",
    ".tox",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    "dist",
    "build",
    "*.egg-info",
];

/// Collect the source files of a Python module: the file itself, or every
/// `.py` file below a package directory
pub fn collect_python_files(root: &Path) -> Result<Vec<PathBuf>, MetadataError> {
    if !root.exists() {
        return Err(MetadataError::load(root, "path does not exist"));
    }

    let mut files = Vec::new();
    if root.is_file() {
        if is_python_file(root) {
            files.push(root.to_path_buf());
        }
    } else if root.is_dir() {
        collect_from_directory(root, &mut files)?;
    }

    // Sort files alphabetically for deterministic output
    files.sort();
    Ok(files)
}

fn collect_from_directory(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), MetadataError> {
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !should_ignore(e.file_name().to_string_lossy().as_ref()))
    {
        let entry = entry.map_err(|e| MetadataError::load_with(dir, "failed to walk directory", e))?;
        let path = entry.path();

        if path.is_file() && is_python_file(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(())
}

fn is_python_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}

fn should_ignore(name: &str) -> bool {
    IGNORE_DIRS.iter().any(|pattern| {
        if let Some(suffix) = pattern.strip_prefix('*') {
            // Simple glob: *.egg-info
            name.ends_with(suffix)
        } else {
            name == *pattern
        }
    })
}

/// Dotted module path of `file` relative to the package `root`
/// "pkg/__init__.py" -> "pkg", "pkg/sub/mod.py" -> "pkg.sub.mod"
pub fn module_path(root: &Path, file: &Path) -> String {
    if root.is_file() {
        return file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
    }

    let package = root
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let relative = file.strip_prefix(root).unwrap_or(file).with_extension("");

    let mut parts: Vec<String> = Vec::new();
    if !package.is_empty() {
        parts.push(package);
    }
    parts.extend(
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .filter(|part| part != "__init__"),
    );
    parts.join(".")
}
