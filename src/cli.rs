use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{error::ErrorKind, ArgAction, Parser};

use crate::apple_platform::ApplePlatform;
use crate::generator::{self, ProjectSpec};
use crate::pbx::Language;
use crate::templates::TemplateSource;

const WORKSPACE_EXTENSION: &str = "xcworkspace";

/// Creates a framework project with a paired unit-test target and adds it to
/// an existing Xcode workspace.
#[derive(Parser, Debug)]
#[command(version)]
pub(crate) struct Cli {
    /// Project and framework target name
    #[arg(long, value_name = "VALUE")]
    name: Option<String>,
    /// Path of the .xcworkspace to add the project to
    #[arg(long, value_name = "VALUE")]
    workspace: Option<String>,
    /// Organization identifier, the bundle identifier prefix
    #[arg(long, value_name = "VALUE")]
    org: Option<String>,
    /// ios, macos, tvos or watchos
    #[arg(long, default_value = "ios")]
    platform: String,
    /// Minimum OS version, defaults to the platform's
    #[arg(long)]
    deployment_target: Option<String>,
    /// swift or objc
    #[arg(long, default_value = "swift")]
    language: String,
    /// Read Info_Framework.plist, Info_Test_Framework.plist and Template.h from this directory
    #[arg(long, value_name = "DIR")]
    templates: Option<PathBuf>,
    /// Increase logging verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    pub fn execute() -> Result<()> {
        let args = match Cli::try_parse() {
            Ok(args) => args,
            Err(error) => match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    error.print()?;
                    return Ok(());
                }
                _ => anyhow::bail!(first_line(&error.render().to_string())),
            },
        };

        init_tracing(args.verbose);

        let spec = args.resolve()?;
        generator::add_project(&spec)?;
        Ok(())
    }

    /// Validates the arguments, in the order name, workspace, org.
    fn resolve(self) -> Result<ProjectSpec> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => anyhow::bail!("required project name"),
        };

        let workspace = match self.workspace {
            Some(workspace) if !workspace.is_empty() => PathBuf::from(workspace),
            _ => anyhow::bail!("required workspace path"),
        };
        if !workspace.exists() {
            anyhow::bail!("workspace path {} is not found", workspace.display())
        }
        if !has_workspace_extension(&workspace) {
            anyhow::bail!(
                "--workspace must be an .{} (actual {})",
                WORKSPACE_EXTENSION,
                workspace.display()
            )
        }

        let org = match self.org {
            Some(org) if !org.is_empty() => org,
            _ => anyhow::bail!("required organization identifier"),
        };

        let platform = ApplePlatform::try_from(self.platform.as_str())?;
        let language = Language::try_from(self.language.as_str())?;
        let templates = self
            .templates
            .map_or(TemplateSource::Bundled, TemplateSource::Directory);

        Ok(ProjectSpec {
            name,
            workspace,
            org,
            platform,
            deployment_target: self.deployment_target,
            language,
            templates,
        })
    }
}

fn has_workspace_extension(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == WORKSPACE_EXTENSION)
}

fn first_line(message: &str) -> String {
    let line = message
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or(message);
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("add-xcodeproj").chain(args.iter().copied())).unwrap()
    }

    fn workspace() -> (tempfile::TempDir, String) {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("App.xcworkspace");
        std::fs::create_dir(&path).unwrap();
        let path = path.to_string_lossy().into_owned();
        (temp, path)
    }

    fn resolve_error(args: &[&str]) -> String {
        parse(args).resolve().unwrap_err().to_string()
    }

    #[test]
    fn resolves_a_complete_invocation() {
        let (_temp, workspace) = workspace();
        let spec = parse(&["--name", "Kit", "--workspace", &workspace, "--org", "org.example"])
            .resolve()
            .unwrap();

        assert_eq!(spec.name, "Kit");
        assert_eq!(spec.org, "org.example");
        assert_eq!(spec.workspace, PathBuf::from(&workspace));
        assert_eq!(spec.platform, ApplePlatform::IOS);
        assert_eq!(spec.language, Language::Swift);
        assert!(matches!(spec.templates, TemplateSource::Bundled));
        assert_eq!(spec.deployment_target, None);
    }

    #[test]
    fn every_flag_is_required_and_non_empty() {
        let (_temp, workspace) = workspace();

        assert_eq!(
            resolve_error(&["--workspace", &workspace, "--org", "org.example"]),
            "required project name"
        );
        assert_eq!(
            resolve_error(&["--name", "", "--workspace", &workspace, "--org", "org.example"]),
            "required project name"
        );
        assert_eq!(
            resolve_error(&["--name", "Kit", "--org", "org.example"]),
            "required workspace path"
        );
        assert_eq!(
            resolve_error(&["--name", "Kit", "--workspace", &workspace]),
            "required organization identifier"
        );
        assert_eq!(
            resolve_error(&["--name", "Kit", "--workspace", &workspace, "--org", ""]),
            "required organization identifier"
        );
    }

    #[test]
    fn workspace_must_exist_and_be_a_workspace() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("Missing.xcworkspace");
        let missing = missing.to_string_lossy();
        assert!(resolve_error(&["--name", "Kit", "--workspace", &missing, "--org", "o"])
            .ends_with("is not found"));

        let project = temp.path().join("App.xcodeproj");
        std::fs::create_dir(&project).unwrap();
        let project = project.to_string_lossy();
        assert!(resolve_error(&["--name", "Kit", "--workspace", &project, "--org", "o"])
            .starts_with("--workspace must be an .xcworkspace"));
    }

    #[test]
    fn rejects_unknown_platform_and_language() {
        let (_temp, workspace) = workspace();
        let base = ["--name", "Kit", "--workspace", workspace.as_str(), "--org", "o"];

        let mut args = base.to_vec();
        args.extend(["--platform", "android"]);
        assert_eq!(resolve_error(&args), "Unknown Apple platform: android");

        let mut args = base.to_vec();
        args.extend(["--language", "kotlin"]);
        assert_eq!(resolve_error(&args), "Unknown language: kotlin");
    }

    #[test]
    fn optional_flags_are_passed_through() {
        let (_temp, workspace) = workspace();
        let spec = parse(&[
            "--name", "Kit", "--workspace", &workspace, "--org", "o",
            "--platform", "tvos", "--language", "objc",
            "--deployment-target", "15.0", "--templates", "/tmp/templates",
        ])
        .resolve()
        .unwrap();

        assert_eq!(spec.platform, ApplePlatform::TvOS);
        assert_eq!(spec.language, Language::ObjC);
        assert_eq!(spec.deployment_target.as_deref(), Some("15.0"));
        assert!(matches!(
            spec.templates,
            TemplateSource::Directory(ref dir) if dir == Path::new("/tmp/templates")
        ));
    }

    #[test]
    fn clap_errors_are_reduced_to_one_line() {
        assert_eq!(
            first_line("error: unexpected argument '--nmae' found\n\nUsage: add-xcodeproj\n"),
            "unexpected argument '--nmae' found"
        );
    }
}
