use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use quick_xml::{
    escape::escape,
    events::{BytesStart, Event},
    Reader,
};
use tracing::debug;

use crate::utils::fs;

const DATA_FILE_NAME: &str = "contents.xcworkspacedata";
const INDENT: &str = "   ";

/// An element of `contents.xcworkspacedata`: `FileRef`, `Group`, or anything
/// newer Xcode versions write, kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn file_ref(location: impl Into<String>) -> Self {
        Self {
            tag: "FileRef".to_string(),
            attributes: vec![("location".to_string(), location.into())],
            children: vec![],
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn from_start(start: &BytesStart) -> Result<Self> {
        let tag = std::str::from_utf8(start.name().as_ref())
            .context("Element name is not valid UTF-8")?
            .to_string();
        let attributes = start
            .attributes()
            .map(|attribute| -> Result<(String, String)> {
                let attribute = attribute?;
                let key = std::str::from_utf8(attribute.key.as_ref())
                    .context("Attribute name is not valid UTF-8")?
                    .to_string();
                let value = attribute.unescape_value()?.into_owned();
                Ok((key, value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            tag,
            attributes,
            children: vec![],
        })
    }

    fn write(&self, out: &mut String, depth: usize) {
        let indent = INDENT.repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(&self.tag);
        for (key, value) in &self.attributes {
            out.push('\n');
            out.push_str(&indent);
            out.push_str(INDENT);
            out.push_str(key);
            out.push_str(" = \"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        out.push_str(">\n");
        for child in &self.children {
            child.write(out, depth + 1);
        }
        out.push_str(&indent);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push_str(">\n");
    }

    fn collect_locations<'a>(&'a self, locations: &mut Vec<&'a str>) {
        if self.tag == "FileRef" {
            if let Some(location) = self.attribute("location") {
                locations.push(location);
            }
        }
        for child in &self.children {
            child.collect_locations(locations);
        }
    }
}

/// An `.xcworkspace` bundle and the references listed in its data file.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    root: Element,
}

impl Workspace {
    /// Loads the workspace at `path` (the `.xcworkspace` directory). A
    /// workspace without a data file yet is empty.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            anyhow::bail!("Workspace {} is not a directory", path.display())
        }

        let data_file = path.join(DATA_FILE_NAME);
        let root = if data_file.exists() {
            let content = std::fs::read_to_string(&data_file)
                .with_context(|| format!("Can't read workspace file {:?}", data_file))?;
            parse(&content).with_context(|| format!("Invalid workspace file {:?}", data_file))?
        } else {
            debug!(path = %path.display(), "workspace has no data file, starting empty");
            empty_root()
        };

        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    /// The directory holding the `.xcworkspace` bundle.
    pub fn dir(&self) -> PathBuf {
        fs::parent_dir(&self.path)
    }

    /// Every `FileRef` location, including those nested in groups, in document order.
    pub fn references(&self) -> Vec<&str> {
        let mut locations = vec![];
        for child in &self.root.children {
            child.collect_locations(&mut locations);
        }
        locations
    }

    /// Whether any `FileRef` already points at `project_path`, whatever
    /// location kind or spelling it uses.
    pub fn contains_project(&self, project_path: &Path) -> bool {
        let dir = self.dir();
        let target = normalize(project_path);
        let mut paths = vec![];
        for child in &self.root.children {
            collect_paths(child, &dir, &dir, &mut paths);
        }
        paths.contains(&target)
    }

    /// Appends a top-level `FileRef` with the given location.
    pub fn push_reference(&mut self, location: impl Into<String>) {
        self.root.children.push(Element::file_ref(location));
    }

    /// Location of a project at `project_path`, relative to the workspace directory.
    pub fn project_location(&self, project_path: &Path) -> String {
        format!("group:{}", fs::relative_path(project_path, &self.dir()))
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.root.write(&mut out, 0);
        out
    }

    /// Rewrites the data file in place.
    pub fn save(&self) -> Result<()> {
        fs::ensure_dir(&self.path)?;
        fs::write_atomically(&self.path.join(DATA_FILE_NAME), &self.to_xml())
    }
}

fn empty_root() -> Element {
    Element {
        tag: "Workspace".to_string(),
        attributes: vec![("version".to_string(), "1.0".to_string())],
        children: vec![],
    }
}

/// Resolves a `kind:path` location. `group:` is relative to the enclosing
/// group, `container:` to the workspace directory.
fn resolve_location(location: &str, group_dir: &Path, workspace_dir: &Path) -> Option<PathBuf> {
    let (kind, path) = location.split_once(':')?;
    let resolved = match kind {
        "group" => group_dir.join(path),
        "container" => workspace_dir.join(path),
        "absolute" => PathBuf::from(path),
        _ => return None,
    };
    Some(normalize(&resolved))
}

fn collect_paths(element: &Element, group_dir: &Path, workspace_dir: &Path, paths: &mut Vec<PathBuf>) {
    let resolved = element
        .attribute("location")
        .and_then(|location| resolve_location(location, group_dir, workspace_dir));
    match element.tag.as_str() {
        "FileRef" => paths.extend(resolved),
        "Group" => {
            let dir = resolved.unwrap_or_else(|| group_dir.to_path_buf());
            for child in &element.children {
                collect_paths(child, &dir, workspace_dir, paths);
            }
        }
        _ => {}
    }
}

/// Drops `.` components and folds `..` into the preceding component.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) =>
            {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn parse(content: &str) -> Result<Element> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = vec![];
    let mut root = None;
    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let element = stack.pop().context("Unbalanced closing tag")?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        anyhow::bail!("Unexpected end of file inside <{}>", stack[stack.len() - 1].tag)
    }
    let root = root.context("Workspace file has no root element")?;
    if root.tag != "Workspace" {
        anyhow::bail!("Expected a <Workspace> root element, found <{}>", root.tag)
    }
    Ok(root)
}
