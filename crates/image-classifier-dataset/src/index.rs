use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::DatasetError;

/// Subfolders whose name starts with this marker are not treated as labels.
pub const HIDDEN_MARKER: char = '.';

/// A file found in a label subfolder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledFile {
    /// Path to the file.
    pub path: PathBuf,
    /// Name of the subfolder containing the file.
    pub label: String,
}

/// Ordered listing of the files of a labeled folder tree.
///
/// Entries are sorted by label, then by file name. Only the immediate subfolders of the root
/// are visited.
#[derive(Debug, Clone)]
pub struct LabeledFileIndex {
    labels: Vec<String>,
    files: Vec<LabeledFile>,
}

impl LabeledFileIndex {
    /// List every readable file of every visible subfolder of `root`.
    pub fn scan<P: AsRef<Path>>(root: P) -> Result<Self, DatasetError> {
        let root = root.as_ref();
        let invalid_root = |reason: String| DatasetError::InvalidRoot {
            path: root.to_path_buf(),
            reason,
        };

        let metadata = fs::metadata(root).map_err(|err| invalid_root(err.to_string()))?;
        if !metadata.is_dir() {
            return Err(invalid_root("not a directory".to_string()));
        }
        let entries = fs::read_dir(root).map_err(|err| invalid_root(err.to_string()))?;

        let mut label_dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| invalid_root(err.to_string()))?;
            let label = entry.file_name().to_string_lossy().into_owned();

            if label.starts_with(HIDDEN_MARKER) {
                continue;
            }
            // Follows symbolic links.
            if fs::metadata(entry.path()).is_ok_and(|m| m.is_dir()) {
                label_dirs.push((label, entry.path()));
            }
        }
        label_dirs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut labels = Vec::with_capacity(label_dirs.len());
        let mut files = Vec::new();
        for (label, dir) in label_dirs {
            // Unreadable subfolders are skipped like hidden ones.
            let Ok(children) = fs::read_dir(&dir) else {
                continue;
            };

            let mut paths = children
                .filter_map(Result::ok)
                .map(|child| child.path())
                .filter(|path| is_readable_file(path))
                .collect::<Vec<_>>();
            paths.sort();

            files.extend(paths.into_iter().map(|path| LabeledFile {
                path,
                label: label.clone(),
            }));
            labels.push(label);
        }

        if labels.is_empty() {
            return Err(DatasetError::EmptyDataset(root.to_path_buf()));
        }

        Ok(Self { labels, files })
    }

    /// Sorted label names.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Indexed files, in dataset order.
    pub fn files(&self) -> &[LabeledFile] {
        &self.files
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Checks if no file was found.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Split the index into its labels and files.
    pub fn into_parts(self) -> (Vec<String>, Vec<LabeledFile>) {
        (self.labels, self.files)
    }
}

fn is_readable_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_file()) && File::open(path).is_ok()
}

/// Label of a file: the name of its parent folder.
pub fn label_of_path(path: &Path) -> Option<String> {
    path.parent()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn tree(files: &[&str]) -> TempDir {
        let dir = tempdir().unwrap();
        for file in files {
            touch(dir.path(), file);
        }
        dir
    }

    #[test]
    fn labels_are_sorted_subfolder_names() {
        let dir = tree(&["b/1.png", "a/1.png", "c/1.png"]);

        let index = LabeledFileIndex::scan(dir.path()).unwrap();

        assert_eq!(index.labels(), ["a", "b", "c"]);
    }

    #[test]
    fn files_sorted_by_label_then_name() {
        let dir = tree(&["b/z.png", "b/a.png", "a/m.png", "a/b.png"]);

        let index = LabeledFileIndex::scan(dir.path()).unwrap();
        let listed = index
            .files()
            .iter()
            .map(|f| {
                let name = f.path.file_name().unwrap().to_string_lossy().into_owned();
                (f.label.clone(), name)
            })
            .collect::<Vec<_>>();

        assert_eq!(
            listed,
            [
                ("a".to_string(), "b.png".to_string()),
                ("a".to_string(), "m.png".to_string()),
                ("b".to_string(), "a.png".to_string()),
                ("b".to_string(), "z.png".to_string()),
            ]
        );
    }

    #[test]
    fn hidden_subfolders_and_root_files_are_ignored() {
        let dir = tree(&[".cache/1.png", "digit/1.png", "readme.txt"]);

        let index = LabeledFileIndex::scan(dir.path()).unwrap();

        assert_eq!(index.labels(), ["digit"]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn nested_subfolders_are_not_traversed() {
        let dir = tree(&["digit/1.png", "digit/nested/2.png"]);

        let index = LabeledFileIndex::scan(dir.path()).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.files()[0].path, dir.path().join("digit").join("1.png"));
    }

    #[test]
    fn empty_label_folder_is_still_a_label() {
        let dir = tree(&["a/1.png"]);
        fs::create_dir(dir.path().join("b")).unwrap();

        let index = LabeledFileIndex::scan(dir.path()).unwrap();

        assert_eq!(index.labels(), ["a", "b"]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn no_subfolders_is_empty_dataset() {
        let dir = tree(&["readme.txt", ".hidden/1.png"]);

        let result = LabeledFileIndex::scan(dir.path());

        assert!(matches!(result, Err(DatasetError::EmptyDataset(_))));
    }

    #[test]
    fn missing_root_is_invalid() {
        let dir = tempdir().unwrap();

        let result = LabeledFileIndex::scan(dir.path().join("missing"));

        assert!(matches!(result, Err(DatasetError::InvalidRoot { .. })));
    }

    #[test]
    fn file_root_is_invalid() {
        let dir = tree(&["file.png"]);

        let result = LabeledFileIndex::scan(dir.path().join("file.png"));

        assert!(matches!(result, Err(DatasetError::InvalidRoot { .. })));
    }

    #[test]
    fn label_is_parent_folder_name() {
        let path = Path::new("root").join("seven").join("img.png");

        assert_eq!(label_of_path(&path).as_deref(), Some("seven"));
        assert_eq!(label_of_path(Path::new("img.png")), None);
    }
}
