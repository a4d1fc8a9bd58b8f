use std::{collections::BTreeMap, fmt::Display};

use uuid::Uuid;

/// Identifier of an object in the project graph: 24 upper-case hex digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string().to_uppercase();
        Self(hex[..24].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type Dictionary = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    /// Another object, written with its display name as a comment.
    Reference(ObjectId),
    Array(Vec<Value>),
    Dictionary(Dictionary),
}

impl Value {
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Array(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    pub fn references<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a ObjectId>,
    {
        Value::Array(ids.into_iter().cloned().map(Value::Reference).collect())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::String(if b { "1" } else { "0" }.to_string())
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Reference(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTree {
    Group,
    BuiltProductsDir,
    SdkRoot,
}

impl SourceTree {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "<group>",
            Self::BuiltProductsDir => "BUILT_PRODUCTS_DIR",
            Self::SdkRoot => "SDKROOT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductType {
    Framework,
    UnitTestBundle,
}

impl ProductType {
    pub fn uti(&self) -> &'static str {
        match self {
            Self::Framework => "com.apple.product-type.framework",
            Self::UnitTestBundle => "com.apple.product-type.bundle.unit-test",
        }
    }

    pub fn product_extension(&self) -> &'static str {
        match self {
            Self::Framework => "framework",
            Self::UnitTestBundle => "xctest",
        }
    }

    pub fn explicit_file_type(&self) -> &'static str {
        match self {
            Self::Framework => "wrapper.framework",
            Self::UnitTestBundle => "wrapper.cfbundle",
        }
    }

    /// Phases a new target of this type starts with, in order.
    pub fn default_build_phases(&self) -> &'static [BuildPhaseKind] {
        match self {
            Self::Framework => &[
                BuildPhaseKind::Headers,
                BuildPhaseKind::Sources,
                BuildPhaseKind::Frameworks,
                BuildPhaseKind::Resources,
            ],
            Self::UnitTestBundle => &[
                BuildPhaseKind::Sources,
                BuildPhaseKind::Frameworks,
                BuildPhaseKind::Resources,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhaseKind {
    Headers,
    Sources,
    Frameworks,
    Resources,
}

impl BuildPhaseKind {
    pub fn isa(&self) -> &'static str {
        match self {
            Self::Headers => "PBXHeadersBuildPhase",
            Self::Sources => "PBXSourcesBuildPhase",
            Self::Frameworks => "PBXFrameworksBuildPhase",
            Self::Resources => "PBXResourcesBuildPhase",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Headers => "Headers",
            Self::Sources => "Sources",
            Self::Frameworks => "Frameworks",
            Self::Resources => "Resources",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    pub attributes: Dictionary,
    pub build_configuration_list: ObjectId,
    pub compatibility_version: String,
    pub development_region: String,
    pub known_regions: Vec<String>,
    pub main_group: ObjectId,
    pub product_ref_group: ObjectId,
    pub targets: Vec<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct Group {
    pub children: Vec<ObjectId>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub source_tree: SourceTree,
}

impl Group {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.path.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct FileReference {
    pub explicit_file_type: Option<String>,
    pub include_in_index: Option<bool>,
    pub last_known_file_type: Option<String>,
    pub name: Option<String>,
    pub path: String,
    pub source_tree: SourceTree,
}

impl FileReference {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.path.rsplit('/').next().unwrap_or(&self.path))
    }
}

#[derive(Debug, Clone)]
pub struct BuildFile {
    pub file_ref: ObjectId,
    pub settings: Option<Dictionary>,
}

#[derive(Debug, Clone)]
pub struct BuildPhase {
    pub kind: BuildPhaseKind,
    pub files: Vec<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct NativeTarget {
    pub build_configuration_list: ObjectId,
    pub build_phases: Vec<ObjectId>,
    pub dependencies: Vec<ObjectId>,
    pub name: String,
    pub product_name: String,
    pub product_reference: Option<ObjectId>,
    pub product_type: ProductType,
}

#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    pub name: String,
    pub build_settings: Dictionary,
}

#[derive(Debug, Clone)]
pub struct ConfigurationList {
    pub build_configurations: Vec<ObjectId>,
    pub default_configuration_name: String,
}

#[derive(Debug, Clone)]
pub struct ContainerItemProxy {
    pub container_portal: ObjectId,
    pub remote_global_id: ObjectId,
    pub remote_info: String,
}

#[derive(Debug, Clone)]
pub struct TargetDependency {
    pub target: ObjectId,
    pub target_proxy: ObjectId,
}

#[derive(Debug, Clone)]
pub enum Object {
    Project(Project),
    Group(Group),
    FileReference(FileReference),
    BuildFile(BuildFile),
    BuildPhase(BuildPhase),
    NativeTarget(NativeTarget),
    BuildConfiguration(BuildConfiguration),
    ConfigurationList(ConfigurationList),
    ContainerItemProxy(ContainerItemProxy),
    TargetDependency(TargetDependency),
}

impl Object {
    pub fn isa(&self) -> &'static str {
        match self {
            Object::Project(_) => "PBXProject",
            Object::Group(_) => "PBXGroup",
            Object::FileReference(_) => "PBXFileReference",
            Object::BuildFile(_) => "PBXBuildFile",
            Object::BuildPhase(phase) => phase.kind.isa(),
            Object::NativeTarget(_) => "PBXNativeTarget",
            Object::BuildConfiguration(_) => "XCBuildConfiguration",
            Object::ConfigurationList(_) => "XCConfigurationList",
            Object::ContainerItemProxy(_) => "PBXContainerItemProxy",
            Object::TargetDependency(_) => "PBXTargetDependency",
        }
    }

    /// Xcode writes these on a single line.
    pub fn is_inline(&self) -> bool {
        matches!(self, Object::BuildFile(_) | Object::FileReference(_))
    }

    /// The object's attributes, without `isa`.
    pub fn to_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        let mut set = |key: &str, value: Value| {
            dict.insert(key.to_string(), value);
        };

        match self {
            Object::Project(p) => {
                set("attributes", Value::Dictionary(p.attributes.clone()));
                set("buildConfigurationList", p.build_configuration_list.clone().into());
                set("compatibilityVersion", p.compatibility_version.as_str().into());
                set("developmentRegion", p.development_region.as_str().into());
                set("hasScannedForEncodings", false.into());
                set("knownRegions", Value::strings(p.known_regions.iter().cloned()));
                set("mainGroup", p.main_group.clone().into());
                set("productRefGroup", p.product_ref_group.clone().into());
                set("projectDirPath", "".into());
                set("projectRoot", "".into());
                set("targets", Value::references(&p.targets));
            }
            Object::Group(g) => {
                set("children", Value::references(&g.children));
                if let Some(name) = &g.name {
                    set("name", name.as_str().into());
                }
                if let Some(path) = &g.path {
                    set("path", path.as_str().into());
                }
                set("sourceTree", g.source_tree.as_str().into());
            }
            Object::FileReference(f) => {
                if let Some(file_type) = &f.explicit_file_type {
                    set("explicitFileType", file_type.as_str().into());
                }
                if let Some(include) = f.include_in_index {
                    set("includeInIndex", include.into());
                }
                if let Some(file_type) = &f.last_known_file_type {
                    set("lastKnownFileType", file_type.as_str().into());
                }
                if let Some(name) = &f.name {
                    set("name", name.as_str().into());
                }
                set("path", f.path.as_str().into());
                set("sourceTree", f.source_tree.as_str().into());
            }
            Object::BuildFile(b) => {
                set("fileRef", b.file_ref.clone().into());
                if let Some(settings) = &b.settings {
                    set("settings", Value::Dictionary(settings.clone()));
                }
            }
            Object::BuildPhase(phase) => {
                set("buildActionMask", "2147483647".into());
                set("files", Value::references(&phase.files));
                set("runOnlyForDeploymentPostprocessing", false.into());
            }
            Object::NativeTarget(t) => {
                set("buildConfigurationList", t.build_configuration_list.clone().into());
                set("buildPhases", Value::references(&t.build_phases));
                set("buildRules", Value::Array(vec![]));
                set("dependencies", Value::references(&t.dependencies));
                set("name", t.name.as_str().into());
                set("productName", t.product_name.as_str().into());
                if let Some(product) = &t.product_reference {
                    set("productReference", product.clone().into());
                }
                set("productType", t.product_type.uti().into());
            }
            Object::BuildConfiguration(c) => {
                set("buildSettings", Value::Dictionary(c.build_settings.clone()));
                set("name", c.name.as_str().into());
            }
            Object::ConfigurationList(l) => {
                set("buildConfigurations", Value::references(&l.build_configurations));
                set("defaultConfigurationIsVisible", false.into());
                set("defaultConfigurationName", l.default_configuration_name.as_str().into());
            }
            Object::ContainerItemProxy(p) => {
                set("containerPortal", p.container_portal.clone().into());
                set("proxyType", true.into());
                set("remoteGlobalIDString", p.remote_global_id.as_str().into());
                set("remoteInfo", p.remote_info.as_str().into());
            }
            Object::TargetDependency(d) => {
                set("target", d.target.clone().into());
                set("targetProxy", d.target_proxy.clone().into());
            }
        }

        dict
    }
}
