use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;
use tracing::debug;
use walkdir::WalkDir;

use crate::constants::layout::{IMAGE_EXTENSIONS, METADATA_EXTENSION, TEXT_EXTENSION};
use crate::constants::splits::JSON_INDENT;
use crate::errors::PipelineError;

/// Flat (non-recursive) listing of the files inside one folder.
pub struct FolderListing {
    dir: PathBuf,
    follow_links: bool,
}

impl FolderListing {
    /// Create a listing for `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            follow_links: true,
        }
    }

    /// Configure symlink traversal.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// True when the folder exists and is a directory.
    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    /// Regular files directly inside the folder, sorted by file name.
    ///
    /// A missing folder yields an empty list; unreadable entries are skipped.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_links)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!("[wxprep:fs] skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        files
    }
}

/// Paths whose file name starts with `prefix` and that pass `accept`, in input order.
pub fn select_with_prefix(
    files: &[PathBuf],
    prefix: &str,
    accept: impl Fn(&Path) -> bool,
) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|path| file_name_starts_with(path, prefix) && accept(path.as_path()))
        .cloned()
        .collect()
}

/// True if the file name (not the full path) starts with `prefix`.
pub fn file_name_starts_with(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(prefix))
        .unwrap_or(false)
}

/// True if the path extension matches one of `extensions` (case-insensitive).
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
        .unwrap_or(false)
}

/// True if the path has a `.txt` extension (case-insensitive).
pub fn is_text_file(path: &Path) -> bool {
    has_extension(path, &[TEXT_EXTENSION])
}

/// True if the path is a jpg/png/jpeg file (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

/// True if the path has a `.json` extension (case-insensitive).
pub fn is_json_file(path: &Path) -> bool {
    has_extension(path, &[METADATA_EXTENSION])
}

/// Create the parent directory of `path` when it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write `value` as 4-space indented UTF-8 JSON, keeping non-ASCII text unescaped.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PipelineError> {
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    value.serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}

/// Write one JSON document per line.
pub fn write_json_lines<T: Serialize>(path: &Path, values: &[T]) -> Result<(), PipelineError> {
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    for value in values {
        serde_json::to_writer(&mut writer, value)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a JSON document from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn listing_is_flat_sorted_and_prefix_filtered() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for name in ["b_2.png", "a_1.JPG", "a_0.jpeg", "a_notes.txt", "other.png"] {
            fs::write(root.join(name), b"x").unwrap();
        }
        fs::create_dir_all(root.join("a_nested")).unwrap();
        fs::write(root.join("a_nested").join("a_deep.png"), b"x").unwrap();

        let listing = FolderListing::new(root);
        let files = listing.files();
        let names: Vec<String> = select_with_prefix(&files, "a_", is_image_file)
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a_0.jpeg", "a_1.JPG"]);
        assert_eq!(files.len(), 5);
    }

    #[test]
    fn missing_folder_lists_nothing() {
        let temp = tempdir().unwrap();
        let listing = FolderListing::new(temp.path().join("absent"));
        assert!(!listing.exists());
        assert!(listing.files().is_empty());
    }

    #[test]
    fn extension_checks_are_case_insensitive() {
        assert!(is_text_file(Path::new("r.TXT")));
        assert!(is_image_file(Path::new("r.Jpeg")));
        assert!(!is_image_file(Path::new("r.gif")));
        assert!(is_json_file(Path::new("r.json")));
        assert!(!is_json_file(Path::new("json")));
    }

    #[test]
    fn pretty_json_keeps_thai_unescaped_and_uses_four_spaces() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("out.json");
        write_json_pretty(&path, &vec!["สวัสดี"]).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "[\n    \"สวัสดี\"\n]");
        let back: Vec<String> = read_json(&path).unwrap();
        assert_eq!(back, vec!["สวัสดี".to_string()]);
    }

    #[test]
    fn ensure_parent_dir_allows_plain_file_names() {
        ensure_parent_dir(Path::new("plain_file.json")).unwrap();
    }
}
