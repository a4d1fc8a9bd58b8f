use std::fmt::Display;

use super::object::{Dictionary, ProductType, Value};
use crate::apple_platform::ApplePlatform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configuration {
    Debug,
    Release,
}

impl Configuration {
    pub fn all() -> [Self; 2] {
        [Self::Debug, Self::Release]
    }
}

impl Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "Debug"),
            Self::Release => write!(f, "Release"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Swift,
    ObjC,
}

impl TryFrom<&str> for Language {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> std::result::Result<Self, anyhow::Error> {
        match s {
            "swift" => Ok(Language::Swift),
            "objc" => Ok(Language::ObjC),
            _ => anyhow::bail!("Unknown language: {}", s),
        }
    }
}

/// Everything that decides a target's default build settings.
#[derive(Debug, Clone, Copy)]
pub struct TargetSettings<'a> {
    pub platform: ApplePlatform,
    pub deployment_target: &'a str,
    pub product_type: ProductType,
    pub language: Language,
}

fn insert(settings: &mut Dictionary, entries: &[(&str, &str)]) {
    for (key, value) in entries {
        settings.insert(key.to_string(), Value::from(*value));
    }
}

/// Project-level defaults, shared by every target.
pub fn project_defaults(configuration: Configuration) -> Dictionary {
    let mut settings = Dictionary::new();
    insert(
        &mut settings,
        &[
            ("ALWAYS_SEARCH_USER_PATHS", "NO"),
            ("CLANG_ANALYZER_NONNULL", "YES"),
            ("CLANG_CXX_LANGUAGE_STANDARD", "gnu++20"),
            ("CLANG_ENABLE_MODULES", "YES"),
            ("CLANG_ENABLE_OBJC_ARC", "YES"),
            ("CLANG_WARN_BLOCK_CAPTURE_AUTORELEASING", "YES"),
            ("CLANG_WARN_BOOL_CONVERSION", "YES"),
            ("CLANG_WARN_COMMA", "YES"),
            ("CLANG_WARN_CONSTANT_CONVERSION", "YES"),
            ("CLANG_WARN_DOCUMENTATION_COMMENTS", "YES"),
            ("CLANG_WARN_EMPTY_BODY", "YES"),
            ("CLANG_WARN_ENUM_CONVERSION", "YES"),
            ("CLANG_WARN_INFINITE_RECURSION", "YES"),
            ("CLANG_WARN_INT_CONVERSION", "YES"),
            ("CLANG_WARN_OBJC_ROOT_CLASS", "YES_ERROR"),
            ("CLANG_WARN_STRICT_PROTOTYPES", "YES"),
            ("CLANG_WARN_SUSPICIOUS_MOVE", "YES"),
            ("CLANG_WARN_UNREACHABLE_CODE", "YES"),
            ("CLANG_WARN__DUPLICATE_METHOD_MATCH", "YES"),
            ("COPY_PHASE_STRIP", "NO"),
            ("ENABLE_STRICT_OBJC_MSGSEND", "YES"),
            ("GCC_C_LANGUAGE_STANDARD", "gnu17"),
            ("GCC_NO_COMMON_BLOCKS", "YES"),
            ("GCC_WARN_64_TO_32_BIT_CONVERSION", "YES"),
            ("GCC_WARN_ABOUT_RETURN_TYPE", "YES_ERROR"),
            ("GCC_WARN_UNDECLARED_SELECTOR", "YES"),
            ("GCC_WARN_UNINITIALIZED_AUTOS", "YES_AGGRESSIVE"),
            ("GCC_WARN_UNUSED_FUNCTION", "YES"),
            ("GCC_WARN_UNUSED_VARIABLE", "YES"),
            ("MTL_FAST_MATH", "YES"),
        ],
    );

    match configuration {
        Configuration::Debug => {
            insert(
                &mut settings,
                &[
                    ("DEBUG_INFORMATION_FORMAT", "dwarf"),
                    ("ENABLE_TESTABILITY", "YES"),
                    ("GCC_DYNAMIC_NO_PIC", "NO"),
                    ("GCC_OPTIMIZATION_LEVEL", "0"),
                    ("MTL_ENABLE_DEBUG_INFO", "INCLUDE_SOURCE"),
                    ("ONLY_ACTIVE_ARCH", "YES"),
                    ("SWIFT_ACTIVE_COMPILATION_CONDITIONS", "DEBUG"),
                    ("SWIFT_OPTIMIZATION_LEVEL", "-Onone"),
                ],
            );
            settings.insert(
                "GCC_PREPROCESSOR_DEFINITIONS".to_string(),
                Value::strings(["DEBUG=1", "$(inherited)"]),
            );
        }
        Configuration::Release => insert(
            &mut settings,
            &[
                ("DEBUG_INFORMATION_FORMAT", "dwarf-with-dsym"),
                ("ENABLE_NS_ASSERTIONS", "NO"),
                ("MTL_ENABLE_DEBUG_INFO", "NO"),
                ("SWIFT_COMPILATION_MODE", "wholemodule"),
                ("SWIFT_OPTIMIZATION_LEVEL", "-O"),
                ("VALIDATE_PRODUCT", "YES"),
            ],
        ),
    }

    settings
}

/// Target-level defaults for a freshly created target.
pub fn target_defaults(configuration: Configuration, target: TargetSettings) -> Dictionary {
    let mut settings = Dictionary::new();
    let platform = target.platform;

    insert(
        &mut settings,
        &[
            ("CODE_SIGN_STYLE", "Automatic"),
            ("SDKROOT", platform.sdk_root()),
            (platform.deployment_target_setting(), target.deployment_target),
        ],
    );
    if let Some(family) = platform.device_family() {
        insert(&mut settings, &[("TARGETED_DEVICE_FAMILY", family)]);
    }

    match target.product_type {
        ProductType::Framework => {
            insert(
                &mut settings,
                &[
                    ("CURRENT_PROJECT_VERSION", "1"),
                    ("DEFINES_MODULE", "YES"),
                    ("DYLIB_COMPATIBILITY_VERSION", "1"),
                    ("DYLIB_CURRENT_VERSION", "1"),
                    ("DYLIB_INSTALL_NAME_BASE", "@rpath"),
                    ("INSTALL_PATH", "$(LOCAL_LIBRARY_DIR)/Frameworks"),
                    ("PRODUCT_NAME", "$(TARGET_NAME:c99extidentifier)"),
                    ("SKIP_INSTALL", "YES"),
                    ("VERSIONING_SYSTEM", "apple-generic"),
                    ("VERSION_INFO_PREFIX", ""),
                ],
            );
            settings.insert(
                "LD_RUNPATH_SEARCH_PATHS".to_string(),
                Value::strings(["$(inherited)", "@executable_path/Frameworks", "@loader_path/Frameworks"]),
            );
        }
        ProductType::UnitTestBundle => {
            insert(&mut settings, &[("PRODUCT_NAME", "$(TARGET_NAME)")]);
            settings.insert(
                "LD_RUNPATH_SEARCH_PATHS".to_string(),
                Value::strings(["$(inherited)", "@executable_path/Frameworks", "@loader_path/Frameworks"]),
            );
        }
    }

    if target.language == Language::Swift {
        insert(&mut settings, &[("SWIFT_VERSION", "5.0")]);
        if configuration == Configuration::Debug {
            insert(
                &mut settings,
                &[
                    ("SWIFT_ACTIVE_COMPILATION_CONDITIONS", "DEBUG"),
                    ("SWIFT_OPTIMIZATION_LEVEL", "-Onone"),
                ],
            );
        }
        if target.product_type == ProductType::Framework {
            insert(&mut settings, &[("SWIFT_INSTALL_OBJC_HEADER", "YES")]);
        }
    }

    settings
}
