use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::apple_platform::ApplePlatform;
use crate::pbx::{BuildPhaseKind, Language, ObjectId, ProductType, TargetSettings};
use crate::templates::{write_info_plist, write_umbrella_header, InfoPlistKind, TemplateSource};
use crate::utils::fs;
use crate::workspace::Workspace;
use crate::xcodeproj::XcodeProject;

/// Validated input of one run.
#[derive(Debug, Clone)]
pub struct ProjectSpec {
    pub name: String,
    /// The `.xcworkspace` to register the project in.
    pub workspace: PathBuf,
    /// Bundle identifier prefix.
    pub org: String,
    pub platform: ApplePlatform,
    pub deployment_target: Option<String>,
    pub language: Language,
    pub templates: TemplateSource,
}

impl ProjectSpec {
    pub fn workspace_dir(&self) -> PathBuf {
        fs::parent_dir(&self.workspace)
    }

    pub fn project_path(&self) -> PathBuf {
        self.workspace_dir().join(format!("{}.xcodeproj", self.name))
    }

    pub fn test_target_name(&self) -> String {
        format!("{}Test", self.name)
    }

    fn bundle_identifier(&self, target_name: &str) -> String {
        format!("{}.{}", self.org, target_name)
    }

    fn target_settings(&self, product_type: ProductType) -> TargetSettings<'_> {
        TargetSettings {
            platform: self.platform,
            deployment_target: self
                .deployment_target
                .as_deref()
                .unwrap_or_else(|| self.platform.default_deployment_target()),
            product_type,
            language: self.language,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceRoot {
    Sources,
    Tests,
}

impl SourceRoot {
    fn dir_name(&self) -> &'static str {
        match self {
            Self::Sources => "Sources",
            Self::Tests => "Tests",
        }
    }
}

/// A generated project and its two targets.
pub struct GeneratedProject {
    pub project: XcodeProject,
    pub main_target: ObjectId,
    pub test_target: ObjectId,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct AddedProject {
    pub project_file: PathBuf,
    pub location: String,
}

/// Generates the project, saves it, then registers it in the workspace.
///
/// The workspace is parsed before anything is written and only rewritten once
/// the project has been saved. An existing project of the same name, or an
/// existing reference to it, is an error.
pub fn add_project(spec: &ProjectSpec) -> Result<AddedProject> {
    let mut workspace = Workspace::open(&spec.workspace)?;
    debug!(references = workspace.references().len(), "loaded workspace");

    let project_path = spec.project_path();
    if project_path.exists() {
        anyhow::bail!("Project {} already exists", project_path.display())
    }
    let location = workspace.project_location(&project_path);
    if workspace.contains_project(&project_path) {
        anyhow::bail!(
            "Workspace {} already references {}",
            spec.workspace.display(),
            location
        )
    }

    info!(name = %spec.name, path = %project_path.display(), "generating project");
    let generated = new_project(spec)?;
    let project_file = generated.project.save()?;
    println!("Created {}", generated.project.path().display());

    workspace.push_reference(location.clone());
    workspace.save()?;
    println!("Added {} to {}", location, spec.workspace.display());

    Ok(AddedProject {
        project_file,
        location,
    })
}

/// Builds the in-memory project: a framework target and its unit-test target.
/// Template files are written to disk along the way.
pub fn new_project(spec: &ProjectSpec) -> Result<GeneratedProject> {
    let mut project = XcodeProject::new(spec.project_path());

    let main_target = new_target(&mut project, spec)?;
    let test_target = new_test_target(&mut project, spec, &main_target)?;

    if let Some(frameworks) = project.frameworks_group()? {
        project.remove_group(&frameworks)?;
    }

    Ok(GeneratedProject {
        project,
        main_target,
        test_target,
    })
}

fn new_target(project: &mut XcodeProject, spec: &ProjectSpec) -> Result<ObjectId> {
    let name = spec.name.as_str();
    let target = project.new_target(name, spec.target_settings(ProductType::Framework))?;
    let (group, dir) = new_group(project, SourceRoot::Sources, name)?;

    let plist = write_info_plist(&spec.templates, InfoPlistKind::Framework, &dir)?;
    project.new_file_reference(&group, &fs::relative_path(&plist, &dir))?;
    project.set_build_setting(
        &target,
        "INFOPLIST_FILE",
        fs::relative_path(&plist, &project.project_dir()),
    )?;

    let header = write_umbrella_header(&spec.templates, name, &dir)?;
    let header = project.new_file_reference(&group, &fs::relative_path(&header, &dir))?;
    for build_file in project.add_file_references(&target, &[header])? {
        project.set_build_file_attributes(&build_file, &["Public"])?;
    }

    apply_common_settings(project, spec, &target, name)?;

    let frameworks = project.frameworks_build_phase(&target)?;
    project.clear_build_phase(&frameworks)?;

    debug!(%target, name, "framework target ready");
    Ok(target)
}

fn new_test_target(
    project: &mut XcodeProject,
    spec: &ProjectSpec,
    main_target: &ObjectId,
) -> Result<ObjectId> {
    let name = spec.test_target_name();
    let target = project.new_target(&name, spec.target_settings(ProductType::UnitTestBundle))?;
    project.add_dependency(&target, main_target)?;

    let (group, dir) = new_group(project, SourceRoot::Tests, &name)?;
    let plist = write_info_plist(&spec.templates, InfoPlistKind::UnitTestBundle, &dir)?;
    project.new_file_reference(&group, &fs::relative_path(&plist, &dir))?;
    project.set_build_setting(
        &target,
        "INFOPLIST_FILE",
        fs::relative_path(&plist, &project.project_dir()),
    )?;

    let main_product = project
        .target(main_target)?
        .product_reference
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Target {} has no product", spec.name))?;
    let link = project.new_build_phase(&target, BuildPhaseKind::Frameworks)?;
    project.add_file_to_build_phase(&link, &main_product)?;

    apply_common_settings(project, spec, &target, &name)?;

    // The first Frameworks phase is the default one; `link` was appended after it.
    let default_frameworks = project.frameworks_build_phase(&target)?;
    project.clear_build_phase(&default_frameworks)?;

    debug!(%target, %name, "test target ready");
    Ok(target)
}

fn apply_common_settings(
    project: &mut XcodeProject,
    spec: &ProjectSpec,
    target: &ObjectId,
    target_name: &str,
) -> Result<()> {
    project.set_build_setting(
        target,
        "PRODUCT_BUNDLE_IDENTIFIER",
        spec.bundle_identifier(target_name),
    )?;
    project.set_build_setting(target, "ALWAYS_EMBED_SWIFT_STANDARD_LIBRARIES", "YES")
}

/// Creates `<root>/<name>` on disk and a group mapped to it.
fn new_group(
    project: &mut XcodeProject,
    root: SourceRoot,
    name: &str,
) -> Result<(ObjectId, PathBuf)> {
    let dir = project.project_dir().join(root.dir_name()).join(name);
    fs::ensure_dir(&dir)?;
    let relative = fs::relative_path(&dir, &project.project_dir());
    let group = project.new_group(name, Some(&relative))?;
    Ok((group, dir))
}
