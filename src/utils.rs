pub(crate) mod fs {
    use std::{
        io::Write,
        path::{Path, PathBuf},
    };

    use anyhow::{Context, Result};
    use tempfile::NamedTempFile;

    /// Creates `dir` and any missing parents. Existing directories are left as they are.
    pub fn ensure_dir(dir: &Path) -> Result<()> {
        if dir.is_dir() {
            return Ok(());
        }

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {:?}", dir))
    }

    pub fn write_file(path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write file: {:?}", path))
    }

    /// Writes `content` to a temporary file next to `path` and renames it into place.
    pub fn write_atomically(path: &Path, content: &str) -> Result<()> {
        let dir = parent_dir(path);
        let mut file = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create a temporary file in {:?}", dir))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
        // Temporary files are private; keep the mode of the file being replaced.
        let permissions = match std::fs::metadata(path) {
            Ok(metadata) => metadata.permissions(),
            Err(_) => default_permissions(&file)?,
        };
        file.as_file().set_permissions(permissions)?;
        file.as_file().sync_all()?;
        file.persist(path)
            .with_context(|| format!("Failed to replace {:?}", path))?;
        Ok(())
    }

    #[cfg(unix)]
    fn default_permissions(_file: &NamedTempFile) -> Result<std::fs::Permissions> {
        use std::os::unix::fs::PermissionsExt;
        Ok(std::fs::Permissions::from_mode(0o644))
    }

    #[cfg(not(unix))]
    fn default_permissions(file: &NamedTempFile) -> Result<std::fs::Permissions> {
        Ok(file.as_file().metadata()?.permissions())
    }

    /// `path` expressed relative to `base`, using `/` as separator.
    pub fn relative_path(path: &Path, base: &Path) -> String {
        let relative = pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf());
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// The directory containing `path`, `.` for bare file names.
    pub fn parent_dir(path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn ensure_dir_is_idempotent() {
            let temp = tempfile::tempdir().unwrap();
            let dir = temp.path().join("Sources/Kit");
            ensure_dir(&dir).unwrap();
            std::fs::write(dir.join("Info.plist"), "plist").unwrap();

            ensure_dir(&dir).unwrap();

            assert_eq!(
                std::fs::read_to_string(dir.join("Info.plist")).unwrap(),
                "plist"
            );
        }

        #[test]
        fn write_atomically_replaces_existing_content() {
            let temp = tempfile::tempdir().unwrap();
            let path = temp.path().join("contents.xcworkspacedata");
            std::fs::write(&path, "old").unwrap();

            write_atomically(&path, "new").unwrap();

            assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
            assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
        }

        #[test]
        fn relative_path_uses_forward_slashes() {
            let base = Path::new("/work/App");
            assert_eq!(
                relative_path(Path::new("/work/App/Sources/Kit/Info.plist"), base),
                "Sources/Kit/Info.plist"
            );
            assert_eq!(
                relative_path(Path::new("/work/App/Kit.xcodeproj"), base),
                "Kit.xcodeproj"
            );
        }

        #[test]
        fn parent_dir_of_bare_file_name_is_current_dir() {
            assert_eq!(parent_dir(Path::new("App.xcworkspace")), PathBuf::from("."));
            assert_eq!(
                parent_dir(Path::new("/work/App.xcworkspace")),
                PathBuf::from("/work")
            );
        }
    }
}
