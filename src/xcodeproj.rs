use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

use crate::pbx::{
    build_settings::{project_defaults, target_defaults},
    writer, BuildConfiguration, BuildFile, BuildPhase, BuildPhaseKind, Configuration,
    ConfigurationList, ContainerItemProxy, Dictionary, FileReference, Group, NativeTarget, Object,
    ObjectId, Project, SourceTree, TargetDependency, TargetSettings, Value,
};
use crate::utils::fs;

const HEADER_EXTENSIONS: [&str; 4] = ["h", "hh", "hpp", "hxx"];

/// An Xcode project being assembled in memory, saved as `<path>/project.pbxproj`.
pub struct XcodeProject {
    path: PathBuf,
    objects: BTreeMap<ObjectId, Object>,
    root: ObjectId,
}

impl XcodeProject {
    /// Creates an empty project with a main group, `Products` and `Frameworks`
    /// groups and the project-level Debug/Release configurations.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let mut project = Self {
            path: path.into(),
            objects: BTreeMap::new(),
            root: ObjectId::generate(),
        };

        let products = project.insert(Object::Group(Group {
            children: vec![],
            name: Some("Products".to_string()),
            path: None,
            source_tree: SourceTree::Group,
        }));
        let frameworks = project.insert(Object::Group(Group {
            children: vec![],
            name: Some("Frameworks".to_string()),
            path: None,
            source_tree: SourceTree::Group,
        }));
        let main_group = project.insert(Object::Group(Group {
            children: vec![products.clone(), frameworks],
            name: None,
            path: None,
            source_tree: SourceTree::Group,
        }));
        let configuration_list = project.new_configuration_list(project_defaults);

        let mut attributes = Dictionary::new();
        attributes.insert("BuildIndependentTargetsInParallel".to_string(), true.into());
        attributes.insert("LastSwiftUpdateCheck".to_string(), "1500".into());
        attributes.insert("LastUpgradeCheck".to_string(), "1500".into());

        project.objects.insert(
            project.root.clone(),
            Object::Project(Project {
                attributes,
                build_configuration_list: configuration_list,
                compatibility_version: "Xcode 14.0".to_string(),
                development_region: "en".to_string(),
                known_regions: vec!["en".to_string(), "Base".to_string()],
                main_group,
                product_ref_group: products,
                targets: vec![],
            }),
        );

        project
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory the `.xcodeproj` lives in, which is the project's source root.
    pub fn project_dir(&self) -> PathBuf {
        fs::parent_dir(&self.path)
    }

    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn insert(&mut self, object: Object) -> ObjectId {
        let mut id = ObjectId::generate();
        while self.objects.contains_key(&id) || id == self.root {
            id = ObjectId::generate();
        }
        self.objects.insert(id.clone(), object);
        id
    }

    pub fn objects(&self) -> impl Iterator<Item = (&ObjectId, &Object)> {
        self.objects.iter()
    }

    pub fn object(&self, id: &ObjectId) -> Result<&Object> {
        self.objects
            .get(id)
            .with_context(|| format!("Object {} is not in the project", id))
    }

    fn object_mut(&mut self, id: &ObjectId) -> Result<&mut Object> {
        self.objects
            .get_mut(id)
            .with_context(|| format!("Object {} is not in the project", id))
    }

    fn typed<'a, T>(
        &'a self,
        id: &ObjectId,
        isa: &str,
        pick: impl FnOnce(&'a Object) -> Option<&'a T>,
    ) -> Result<&'a T> {
        let object = self.object(id)?;
        let actual = object.isa();
        pick(object).with_context(|| format!("Object {} is a {}, not a {}", id, actual, isa))
    }

    fn typed_mut<'a, T>(
        &'a mut self,
        id: &ObjectId,
        isa: &str,
        pick: impl FnOnce(&'a mut Object) -> Option<&'a mut T>,
    ) -> Result<&'a mut T> {
        let object = self.object_mut(id)?;
        let actual = object.isa();
        pick(object).with_context(|| format!("Object {} is a {}, not a {}", id, actual, isa))
    }

    pub fn root(&self) -> Result<&Project> {
        self.typed(&self.root, "PBXProject", |o| match o {
            Object::Project(p) => Some(p),
            _ => None,
        })
    }

    fn root_mut(&mut self) -> Result<&mut Project> {
        let root = self.root.clone();
        self.typed_mut(&root, "PBXProject", |o| match o {
            Object::Project(p) => Some(p),
            _ => None,
        })
    }

    pub fn group(&self, id: &ObjectId) -> Result<&Group> {
        self.typed(id, "PBXGroup", |o| match o {
            Object::Group(g) => Some(g),
            _ => None,
        })
    }

    fn group_mut(&mut self, id: &ObjectId) -> Result<&mut Group> {
        self.typed_mut(id, "PBXGroup", |o| match o {
            Object::Group(g) => Some(g),
            _ => None,
        })
    }

    pub fn file_reference(&self, id: &ObjectId) -> Result<&FileReference> {
        self.typed(id, "PBXFileReference", |o| match o {
            Object::FileReference(f) => Some(f),
            _ => None,
        })
    }

    pub fn build_file(&self, id: &ObjectId) -> Result<&BuildFile> {
        self.typed(id, "PBXBuildFile", |o| match o {
            Object::BuildFile(b) => Some(b),
            _ => None,
        })
    }

    fn build_file_mut(&mut self, id: &ObjectId) -> Result<&mut BuildFile> {
        self.typed_mut(id, "PBXBuildFile", |o| match o {
            Object::BuildFile(b) => Some(b),
            _ => None,
        })
    }

    pub fn build_phase(&self, id: &ObjectId) -> Result<&BuildPhase> {
        self.typed(id, "build phase", |o| match o {
            Object::BuildPhase(p) => Some(p),
            _ => None,
        })
    }

    fn build_phase_mut(&mut self, id: &ObjectId) -> Result<&mut BuildPhase> {
        self.typed_mut(id, "build phase", |o| match o {
            Object::BuildPhase(p) => Some(p),
            _ => None,
        })
    }

    pub fn target(&self, id: &ObjectId) -> Result<&NativeTarget> {
        self.typed(id, "PBXNativeTarget", |o| match o {
            Object::NativeTarget(t) => Some(t),
            _ => None,
        })
    }

    fn target_mut(&mut self, id: &ObjectId) -> Result<&mut NativeTarget> {
        self.typed_mut(id, "PBXNativeTarget", |o| match o {
            Object::NativeTarget(t) => Some(t),
            _ => None,
        })
    }

    pub fn target_dependency(&self, id: &ObjectId) -> Result<&TargetDependency> {
        self.typed(id, "PBXTargetDependency", |o| match o {
            Object::TargetDependency(d) => Some(d),
            _ => None,
        })
    }

    fn configuration_list(&self, id: &ObjectId) -> Result<&ConfigurationList> {
        self.typed(id, "XCConfigurationList", |o| match o {
            Object::ConfigurationList(l) => Some(l),
            _ => None,
        })
    }

    fn build_configuration_mut(&mut self, id: &ObjectId) -> Result<&mut BuildConfiguration> {
        self.typed_mut(id, "XCBuildConfiguration", |o| match o {
            Object::BuildConfiguration(c) => Some(c),
            _ => None,
        })
    }

    pub fn targets(&self) -> Result<Vec<&NativeTarget>> {
        self.root()?.targets.iter().map(|id| self.target(id)).collect()
    }

    pub fn main_group(&self) -> Result<ObjectId> {
        Ok(self.root()?.main_group.clone())
    }

    pub fn products_group(&self) -> Result<ObjectId> {
        Ok(self.root()?.product_ref_group.clone())
    }

    /// The top-level group named `Frameworks`, if the project still has one.
    pub fn frameworks_group(&self) -> Result<Option<ObjectId>> {
        let main_group = self.group(&self.root()?.main_group)?;
        Ok(main_group
            .children
            .iter()
            .find(|id| {
                matches!(self.objects.get(*id), Some(Object::Group(g)) if g.name.as_deref() == Some("Frameworks"))
            })
            .cloned())
    }

    fn new_configuration_list(
        &mut self,
        settings: impl Fn(Configuration) -> Dictionary,
    ) -> ObjectId {
        let build_configurations = Configuration::all()
            .into_iter()
            .map(|configuration| {
                self.insert(Object::BuildConfiguration(BuildConfiguration {
                    name: configuration.to_string(),
                    build_settings: settings(configuration),
                }))
            })
            .collect();

        self.insert(Object::ConfigurationList(ConfigurationList {
            build_configurations,
            default_configuration_name: Configuration::Release.to_string(),
        }))
    }

    /// Creates a native target with its configurations, a product reference in
    /// `Products`, the product type's default build phases, and the platform's
    /// system framework linked in the Frameworks phase.
    pub fn new_target(&mut self, name: &str, settings: TargetSettings) -> Result<ObjectId> {
        let product_type = settings.product_type;
        let configuration_list =
            self.new_configuration_list(|configuration| target_defaults(configuration, settings));

        let product = self.insert(Object::FileReference(FileReference {
            explicit_file_type: Some(product_type.explicit_file_type().to_string()),
            include_in_index: Some(false),
            last_known_file_type: None,
            name: None,
            path: format!("{}.{}", name, product_type.product_extension()),
            source_tree: SourceTree::BuiltProductsDir,
        }));
        let products_group = self.products_group()?;
        self.group_mut(&products_group)?.children.push(product.clone());

        let build_phases = product_type
            .default_build_phases()
            .iter()
            .map(|&kind| self.insert(Object::BuildPhase(BuildPhase { kind, files: vec![] })))
            .collect();

        let target = self.insert(Object::NativeTarget(NativeTarget {
            build_configuration_list: configuration_list,
            build_phases,
            dependencies: vec![],
            name: name.to_string(),
            product_name: name.to_string(),
            product_reference: Some(product),
            product_type,
        }));
        self.root_mut()?.targets.push(target.clone());

        self.add_system_framework(&target, settings.platform.system_framework())?;

        debug!(%target, name, ?product_type, "created target");
        Ok(target)
    }

    /// Links `<name>.framework` from the SDK through the `Frameworks` group.
    pub fn add_system_framework(&mut self, target: &ObjectId, name: &str) -> Result<ObjectId> {
        let path = format!("System/Library/Frameworks/{}.framework", name);
        let group = match self.frameworks_group()? {
            Some(group) => group,
            None => self.new_group("Frameworks", None)?,
        };

        let existing = self
            .group(&group)?
            .children
            .iter()
            .find(|id| matches!(self.objects.get(*id), Some(Object::FileReference(f)) if f.path == path))
            .cloned();
        let reference = match existing {
            Some(reference) => reference,
            None => {
                let reference = self.insert(Object::FileReference(FileReference {
                    explicit_file_type: None,
                    include_in_index: None,
                    last_known_file_type: Some("wrapper.framework".to_string()),
                    name: Some(format!("{}.framework", name)),
                    path,
                    source_tree: SourceTree::SdkRoot,
                }));
                self.group_mut(&group)?.children.push(reference.clone());
                reference
            }
        };

        let phase = self.frameworks_build_phase(target)?;
        self.add_file_to_build_phase(&phase, &reference)
    }

    /// Adds a group under the main group, placed before `Products`.
    pub fn new_group(&mut self, name: &str, path: Option<&str>) -> Result<ObjectId> {
        let group = self.insert(Object::Group(Group {
            children: vec![],
            name: Some(name.to_string()),
            path: path.map(str::to_string),
            source_tree: SourceTree::Group,
        }));

        let products = self.products_group()?;
        let main_group = self.main_group()?;
        let children = &mut self.group_mut(&main_group)?.children;
        let index = children
            .iter()
            .position(|id| *id == products)
            .unwrap_or(children.len());
        children.insert(index, group.clone());

        debug!(%group, name, ?path, "created group");
        Ok(group)
    }

    /// Adds a reference to `path` (relative to the group) as a child of `group`.
    pub fn new_file_reference(&mut self, group: &ObjectId, path: &str) -> Result<ObjectId> {
        let extension = Path::new(path)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let reference = self.insert(Object::FileReference(FileReference {
            explicit_file_type: None,
            include_in_index: None,
            last_known_file_type: Some(last_known_file_type(&extension).to_string()),
            name: None,
            path: path.to_string(),
            source_tree: SourceTree::Group,
        }));
        self.group_mut(group)?.children.push(reference.clone());
        Ok(reference)
    }

    /// Adds each file to the target's Headers or Sources phase, depending on
    /// its extension, and returns the created build files.
    pub fn add_file_references(
        &mut self,
        target: &ObjectId,
        references: &[ObjectId],
    ) -> Result<Vec<ObjectId>> {
        references
            .iter()
            .map(|reference| {
                let is_header = Path::new(&self.file_reference(reference)?.path)
                    .extension()
                    .is_some_and(|e| HEADER_EXTENSIONS.iter().any(|h| e == *h));
                let phase = if is_header {
                    self.find_or_create_build_phase(target, BuildPhaseKind::Headers)?
                } else {
                    self.find_or_create_build_phase(target, BuildPhaseKind::Sources)?
                };
                self.add_file_to_build_phase(&phase, reference)
            })
            .collect()
    }

    /// Sets `ATTRIBUTES` on a build file, e.g. `Public` for exported headers.
    pub fn set_build_file_attributes(&mut self, build_file: &ObjectId, attributes: &[&str]) -> Result<()> {
        let mut settings = Dictionary::new();
        settings.insert(
            "ATTRIBUTES".to_string(),
            Value::strings(attributes.iter().copied()),
        );
        self.build_file_mut(build_file)?.settings = Some(settings);
        Ok(())
    }

    /// The target's first Frameworks phase, created if the target has none.
    pub fn frameworks_build_phase(&mut self, target: &ObjectId) -> Result<ObjectId> {
        self.find_or_create_build_phase(target, BuildPhaseKind::Frameworks)
    }

    pub fn build_phases_of_kind(&self, target: &ObjectId, kind: BuildPhaseKind) -> Result<Vec<ObjectId>> {
        let mut phases = vec![];
        for id in &self.target(target)?.build_phases {
            if self.build_phase(id)?.kind == kind {
                phases.push(id.clone());
            }
        }
        Ok(phases)
    }

    fn find_or_create_build_phase(&mut self, target: &ObjectId, kind: BuildPhaseKind) -> Result<ObjectId> {
        if let Some(phase) = self.build_phases_of_kind(target, kind)?.into_iter().next() {
            return Ok(phase);
        }

        let phase = self.insert(Object::BuildPhase(BuildPhase { kind, files: vec![] }));
        let phases = &mut self.target_mut(target)?.build_phases;
        if kind == BuildPhaseKind::Headers {
            phases.insert(0, phase.clone());
        } else {
            phases.push(phase.clone());
        }
        Ok(phase)
    }

    /// Appends a new, separate build phase to the target.
    pub fn new_build_phase(&mut self, target: &ObjectId, kind: BuildPhaseKind) -> Result<ObjectId> {
        let phase = self.insert(Object::BuildPhase(BuildPhase { kind, files: vec![] }));
        self.target_mut(target)?.build_phases.push(phase.clone());
        Ok(phase)
    }

    pub fn add_file_to_build_phase(&mut self, phase: &ObjectId, file_ref: &ObjectId) -> Result<ObjectId> {
        self.object(file_ref)?;
        let build_file = self.insert(Object::BuildFile(BuildFile {
            file_ref: file_ref.clone(),
            settings: None,
        }));
        self.build_phase_mut(phase)?.files.push(build_file.clone());
        Ok(build_file)
    }

    /// Removes every build file from the phase. The phase itself stays.
    pub fn clear_build_phase(&mut self, phase: &ObjectId) -> Result<()> {
        let files = std::mem::take(&mut self.build_phase_mut(phase)?.files);
        for file in files {
            self.objects.remove(&file);
        }
        Ok(())
    }

    /// Every configuration of the target, Debug first.
    pub fn build_configurations(&self, target: &ObjectId) -> Result<Vec<&BuildConfiguration>> {
        let list = self.configuration_list(&self.target(target)?.build_configuration_list)?;
        list.build_configurations
            .iter()
            .map(|id| {
                self.typed(id, "XCBuildConfiguration", |o| match o {
                    Object::BuildConfiguration(c) => Some(c),
                    _ => None,
                })
            })
            .collect()
    }

    /// Sets `key` on every configuration of the target.
    pub fn set_build_setting(
        &mut self,
        target: &ObjectId,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let value = value.into();
        let list = self.target(target)?.build_configuration_list.clone();
        let configurations = self.configuration_list(&list)?.build_configurations.clone();
        for configuration in configurations {
            self.build_configuration_mut(&configuration)?
                .build_settings
                .insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    /// Makes `target` depend on `dependency` through a container item proxy.
    pub fn add_dependency(&mut self, target: &ObjectId, dependency: &ObjectId) -> Result<ObjectId> {
        if target == dependency {
            anyhow::bail!("Target {} can't depend on itself", self.target(target)?.name)
        }
        let reverse = self
            .target(dependency)?
            .dependencies
            .iter()
            .any(|d| matches!(self.objects.get(d), Some(Object::TargetDependency(d)) if d.target == *target));
        if reverse {
            anyhow::bail!(
                "Target {} already depends on {}",
                self.target(dependency)?.name,
                self.target(target)?.name
            )
        }

        let proxy = self.insert(Object::ContainerItemProxy(ContainerItemProxy {
            container_portal: self.root.clone(),
            remote_global_id: dependency.clone(),
            remote_info: self.target(dependency)?.name.clone(),
        }));
        let target_dependency = self.insert(Object::TargetDependency(TargetDependency {
            target: dependency.clone(),
            target_proxy: proxy,
        }));
        self.target_mut(target)?
            .dependencies
            .push(target_dependency.clone());
        Ok(target_dependency)
    }

    /// Removes a group with everything below it, including build files that
    /// point at removed references.
    pub fn remove_group(&mut self, group: &ObjectId) -> Result<()> {
        if *group == self.main_group()? {
            anyhow::bail!("The main group can't be removed")
        }

        let mut removed = vec![];
        let mut queue = vec![group.clone()];
        while let Some(id) = queue.pop() {
            if let Some(Object::Group(g)) = self.objects.get(&id) {
                queue.extend(g.children.iter().cloned());
            }
            removed.push(id);
        }

        let orphaned_build_files = self
            .objects
            .iter()
            .filter_map(|(id, o)| match o {
                Object::BuildFile(b) if removed.contains(&b.file_ref) => Some(id.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();

        for object in self.objects.values_mut() {
            match object {
                Object::Group(g) => g.children.retain(|c| !removed.contains(c)),
                Object::BuildPhase(p) => p.files.retain(|f| !orphaned_build_files.contains(f)),
                _ => {}
            }
        }
        for id in removed.iter().chain(&orphaned_build_files) {
            self.objects.remove(id);
        }

        debug!(%group, removed = removed.len(), "removed group");
        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        writer::render(&self.objects, &self.root, &self.name())
    }

    /// Writes `project.pbxproj` inside the `.xcodeproj` directory.
    pub fn save(&self) -> Result<PathBuf> {
        let content = self.render()?;
        fs::ensure_dir(&self.path)?;
        let file = self.path.join("project.pbxproj");
        fs::write_atomically(&file, &content)?;
        Ok(file)
    }
}

fn last_known_file_type(extension: &str) -> &'static str {
    match extension {
        "h" | "hh" | "hpp" | "hxx" => "sourcecode.c.h",
        "m" => "sourcecode.c.objc",
        "swift" => "sourcecode.swift",
        "plist" => "text.plist.xml",
        "xcconfig" => "text.xcconfig",
        "framework" => "wrapper.framework",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apple_platform::ApplePlatform;
    use crate::pbx::{Language, ProductType};

    fn settings(product_type: ProductType) -> TargetSettings<'static> {
        TargetSettings {
            platform: ApplePlatform::IOS,
            deployment_target: "13.0",
            product_type,
            language: Language::Swift,
        }
    }

    #[test]
    fn new_project_has_scaffold_groups() {
        let project = XcodeProject::new("/work/Kit.xcodeproj");
        let main_group = project.group(&project.main_group().unwrap()).unwrap();
        assert_eq!(main_group.children.len(), 2);
        assert!(project.frameworks_group().unwrap().is_some());
        assert_eq!(project.name(), "Kit");
        assert_eq!(project.project_dir(), PathBuf::from("/work"));
    }

    #[test]
    fn new_target_links_the_system_framework() {
        let mut project = XcodeProject::new("Kit.xcodeproj");
        let target = project.new_target("Kit", settings(ProductType::Framework)).unwrap();

        let phase = project.frameworks_build_phase(&target).unwrap();
        let files = &project.build_phase(&phase).unwrap().files;
        assert_eq!(files.len(), 1);
        let reference = &project.build_file(&files[0]).unwrap().file_ref;
        assert_eq!(
            project.file_reference(reference).unwrap().path,
            "System/Library/Frameworks/Foundation.framework"
        );

        let product = project.target(&target).unwrap().product_reference.clone().unwrap();
        assert_eq!(project.file_reference(&product).unwrap().path, "Kit.framework");
        assert_eq!(project.build_configurations(&target).unwrap().len(), 2);
    }

    #[test]
    fn new_targets_start_with_their_default_phases() {
        let mut project = XcodeProject::new("Kit.xcodeproj");
        let framework = project.new_target("Kit", settings(ProductType::Framework)).unwrap();
        let tests = project.new_target("KitTest", settings(ProductType::UnitTestBundle)).unwrap();

        let kinds = |target: &ObjectId| {
            project
                .target(target)
                .unwrap()
                .build_phases
                .iter()
                .map(|id| project.build_phase(id).unwrap().kind)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            kinds(&framework),
            [
                BuildPhaseKind::Headers,
                BuildPhaseKind::Sources,
                BuildPhaseKind::Frameworks,
                BuildPhaseKind::Resources
            ]
        );
        assert_eq!(
            kinds(&tests),
            [BuildPhaseKind::Sources, BuildPhaseKind::Frameworks, BuildPhaseKind::Resources]
        );
    }

    #[test]
    fn headers_go_to_a_headers_phase_placed_first() {
        let mut project = XcodeProject::new("Kit.xcodeproj");
        let target = project.new_target("Kit", settings(ProductType::Framework)).unwrap();
        let group = project.new_group("Kit", Some("Sources/Kit")).unwrap();
        let header = project.new_file_reference(&group, "Kit.h").unwrap();

        let build_files = project.add_file_references(&target, &[header]).unwrap();
        project.set_build_file_attributes(&build_files[0], &["Public"]).unwrap();

        let first = project.target(&target).unwrap().build_phases[0].clone();
        let phase = project.build_phase(&first).unwrap();
        assert_eq!(phase.kind, BuildPhaseKind::Headers);
        assert_eq!(phase.files, build_files);
        assert_eq!(
            project.build_file(&build_files[0]).unwrap().settings.as_ref().unwrap()["ATTRIBUTES"],
            Value::strings(["Public"])
        );
    }

    #[test]
    fn set_build_setting_touches_every_configuration() {
        let mut project = XcodeProject::new("Kit.xcodeproj");
        let target = project.new_target("Kit", settings(ProductType::Framework)).unwrap();
        project
            .set_build_setting(&target, "PRODUCT_BUNDLE_IDENTIFIER", "org.example.Kit")
            .unwrap();

        let configurations = project.build_configurations(&target).unwrap();
        let names = configurations.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["Debug", "Release"]);
        for configuration in configurations {
            assert_eq!(
                configuration.build_settings["PRODUCT_BUNDLE_IDENTIFIER"],
                Value::from("org.example.Kit")
            );
        }
    }

    #[test]
    fn dependencies_are_one_way() {
        let mut project = XcodeProject::new("Kit.xcodeproj");
        let main = project.new_target("Kit", settings(ProductType::Framework)).unwrap();
        let test = project.new_target("KitTest", settings(ProductType::UnitTestBundle)).unwrap();

        let dependency = project.add_dependency(&test, &main).unwrap();
        assert_eq!(project.target_dependency(&dependency).unwrap().target, main);

        assert!(project.add_dependency(&main, &test).is_err());
        assert!(project.add_dependency(&main, &main).is_err());
    }

    #[test]
    fn clearing_a_phase_drops_its_build_files() {
        let mut project = XcodeProject::new("Kit.xcodeproj");
        let target = project.new_target("Kit", settings(ProductType::Framework)).unwrap();
        let phase = project.frameworks_build_phase(&target).unwrap();
        let build_file = project.build_phase(&phase).unwrap().files[0].clone();

        project.clear_build_phase(&phase).unwrap();

        assert!(project.build_phase(&phase).unwrap().files.is_empty());
        assert!(project.object(&build_file).is_err());
    }

    #[test]
    fn removing_a_group_removes_its_references_and_build_files() {
        let mut project = XcodeProject::new("Kit.xcodeproj");
        let target = project.new_target("Kit", settings(ProductType::Framework)).unwrap();
        let frameworks = project.frameworks_group().unwrap().unwrap();
        let foundation = project.group(&frameworks).unwrap().children[0].clone();

        project.remove_group(&frameworks).unwrap();

        assert!(project.frameworks_group().unwrap().is_none());
        assert!(project.object(&foundation).is_err());
        let phase = project.frameworks_build_phase(&target).unwrap();
        assert!(project.build_phase(&phase).unwrap().files.is_empty());
        assert!(project
            .objects()
            .all(|(_, o)| !matches!(o, Object::BuildFile(b) if b.file_ref == foundation)));
    }

    #[test]
    fn main_group_cannot_be_removed() {
        let mut project = XcodeProject::new("Kit.xcodeproj");
        let main_group = project.main_group().unwrap();
        assert!(project.remove_group(&main_group).is_err());
    }

    #[test]
    fn save_writes_project_file_inside_the_bundle() {
        let temp = tempfile::tempdir().unwrap();
        let project = XcodeProject::new(temp.path().join("Kit.xcodeproj"));

        let file = project.save().unwrap();

        assert_eq!(file, temp.path().join("Kit.xcodeproj/project.pbxproj"));
        let content = std::fs::read_to_string(file).unwrap();
        assert!(content.starts_with("// !$*UTF8*$!"));
        assert!(content.contains("Build configuration list for PBXProject \"Kit\""));
    }
}
