use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

use crate::utils::fs;

const FRAMEWORK_INFO_PLIST: &str = include_str!("../templates/Info_Framework.plist");
const TEST_INFO_PLIST: &str = include_str!("../templates/Info_Test_Framework.plist");
const UMBRELLA_HEADER: &str = include_str!("../templates/Template.h");

const PROJECT_NAME_TOKEN: &str = "{{PROJECT_NAME}}";

/// The two kinds of `Info.plist` the generator writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoPlistKind {
    Framework,
    UnitTestBundle,
}

impl InfoPlistKind {
    fn file_name(&self) -> &'static str {
        match self {
            Self::Framework => "Info_Framework.plist",
            Self::UnitTestBundle => "Info_Test_Framework.plist",
        }
    }

    fn bundled(&self) -> &'static str {
        match self {
            Self::Framework => FRAMEWORK_INFO_PLIST,
            Self::UnitTestBundle => TEST_INFO_PLIST,
        }
    }
}

/// Where template files are read from.
#[derive(Debug, Clone, Default)]
pub enum TemplateSource {
    /// Copies compiled into the binary.
    #[default]
    Bundled,
    /// A directory holding `Info_Framework.plist`, `Info_Test_Framework.plist` and `Template.h`.
    Directory(PathBuf),
}

impl TemplateSource {
    fn read(&self, file_name: &str, bundled: &'static str) -> Result<Cow<'static, str>> {
        match self {
            Self::Bundled => Ok(Cow::Borrowed(bundled)),
            Self::Directory(dir) => {
                let path = dir.join(file_name);
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Can't read template {:?}", path))?;
                Ok(Cow::Owned(content))
            }
        }
    }

    pub fn info_plist(&self, kind: InfoPlistKind) -> Result<Cow<'static, str>> {
        self.read(kind.file_name(), kind.bundled())
    }

    pub fn umbrella_header(&self, target_name: &str) -> Result<String> {
        let template = self.read("Template.h", UMBRELLA_HEADER)?;
        Ok(template.replace(PROJECT_NAME_TOKEN, target_name))
    }
}

/// Writes `Info.plist` of the given kind into `dir`, creating the directory if needed.
pub fn write_info_plist(
    templates: &TemplateSource,
    kind: InfoPlistKind,
    dir: &Path,
) -> Result<PathBuf> {
    let content = templates.info_plist(kind)?;
    fs::ensure_dir(dir)?;
    let path = dir.join("Info.plist");
    fs::write_file(&path, &content)?;
    debug!(?kind, path = %path.display(), "wrote Info.plist");
    Ok(path)
}

/// Writes the `<target_name>.h` umbrella header into `dir`.
pub fn write_umbrella_header(
    templates: &TemplateSource,
    target_name: &str,
    dir: &Path,
) -> Result<PathBuf> {
    let content = templates.umbrella_header(target_name)?;
    fs::ensure_dir(dir)?;
    let path = dir.join(format!("{}.h", target_name));
    fs::write_file(&path, &content)?;
    debug!(path = %path.display(), "wrote umbrella header");
    Ok(path)
}
