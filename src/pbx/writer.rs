use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use rinja::Template;

use super::object::{Object, ObjectId, Value};

pub const OBJECT_VERSION: &str = "56";

#[derive(Template)]
#[template(path = "project.pbxproj", escape = "none")]
struct ProjectFileTemplate {
    object_version: &'static str,
    sections: Vec<Section>,
    root_object: String,
}

struct Section {
    isa: &'static str,
    objects: Vec<String>,
}

/// Renders the object graph as a `project.pbxproj` file.
///
/// `project_name` is the file stem of the `.xcodeproj`, used to annotate the
/// project's configuration list.
pub fn render(
    objects: &BTreeMap<ObjectId, Object>,
    root: &ObjectId,
    project_name: &str,
) -> Result<String> {
    let comments = annotations(objects, project_name);

    let mut by_isa = BTreeMap::<&'static str, Vec<String>>::new();
    for (id, object) in objects {
        by_isa
            .entry(object.isa())
            .or_default()
            .push(render_object(id, object, &comments));
    }

    let template = ProjectFileTemplate {
        object_version: OBJECT_VERSION,
        sections: by_isa
            .into_iter()
            .map(|(isa, objects)| Section { isa, objects })
            .collect(),
        root_object: reference(root, &comments),
    };

    let mut content = template
        .render()
        .with_context(|| "Failed to render project.pbxproj")?;
    if !content.ends_with('\n') {
        content.push('\n');
    }
    Ok(content)
}

fn render_object(id: &ObjectId, object: &Object, comments: &HashMap<ObjectId, String>) -> String {
    let inline = object.is_inline();
    let mut entries = vec![("isa".to_string(), Value::from(object.isa()))];
    entries.extend(object.to_dictionary());

    let mut out = format!("\t\t{} = ", reference(id, comments));
    write_dictionary(&mut out, &entries, comments, 2, inline);
    out.push(';');
    out
}

fn write_dictionary(
    out: &mut String,
    entries: &[(String, Value)],
    comments: &HashMap<ObjectId, String>,
    indent: usize,
    inline: bool,
) {
    out.push('{');
    for (key, value) in entries {
        if !inline {
            out.push('\n');
            out.push_str(&tabs(indent + 1));
        }
        out.push_str(&quote(key));
        out.push_str(" = ");
        write_value(out, value, comments, indent + 1, inline);
        out.push(';');
        if inline {
            out.push(' ');
        }
    }
    if !inline {
        out.push('\n');
        out.push_str(&tabs(indent));
    }
    out.push('}');
}

fn write_value(
    out: &mut String,
    value: &Value,
    comments: &HashMap<ObjectId, String>,
    indent: usize,
    inline: bool,
) {
    match value {
        Value::String(s) => out.push_str(&quote(s)),
        Value::Reference(id) => out.push_str(&reference(id, comments)),
        Value::Array(items) => {
            out.push('(');
            for item in items {
                if !inline {
                    out.push('\n');
                    out.push_str(&tabs(indent + 1));
                }
                write_value(out, item, comments, indent + 1, inline);
                out.push(',');
                if inline {
                    out.push(' ');
                }
            }
            if !inline {
                out.push('\n');
                out.push_str(&tabs(indent));
            }
            out.push(')');
        }
        Value::Dictionary(dict) => {
            let entries = dict
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Vec<_>>();
            write_dictionary(out, &entries, comments, indent, inline);
        }
    }
}

fn reference(id: &ObjectId, comments: &HashMap<ObjectId, String>) -> String {
    match comments.get(id) {
        Some(comment) => format!("{} /* {} */", id, comment),
        None => id.to_string(),
    }
}

fn tabs(n: usize) -> String {
    "\t".repeat(n)
}

/// Quotes `s` unless it only holds characters Xcode leaves bare.
pub fn quote(s: &str) -> String {
    let bare = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.'));
    if bare {
        return s.to_string();
    }

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Display names Xcode writes next to object ids.
fn annotations(objects: &BTreeMap<ObjectId, Object>, project_name: &str) -> HashMap<ObjectId, String> {
    let mut comments = HashMap::new();

    for (id, object) in objects {
        let comment = match object {
            Object::Project(project) => {
                comments.insert(
                    project.build_configuration_list.clone(),
                    format!("Build configuration list for PBXProject \"{}\"", project_name),
                );
                Some("Project object".to_string())
            }
            Object::Group(group) => group.display_name().map(str::to_string),
            Object::FileReference(file) => Some(file.display_name().to_string()),
            Object::BuildPhase(phase) => {
                for file in &phase.files {
                    let name = objects
                        .get(file)
                        .and_then(|f| match f {
                            Object::BuildFile(b) => objects.get(&b.file_ref),
                            _ => None,
                        })
                        .and_then(|f| match f {
                            Object::FileReference(r) => Some(r.display_name().to_string()),
                            _ => None,
                        });
                    if let Some(name) = name {
                        comments.insert(
                            file.clone(),
                            format!("{} in {}", name, phase.kind.display_name()),
                        );
                    }
                }
                Some(phase.kind.display_name().to_string())
            }
            Object::NativeTarget(target) => {
                comments.insert(
                    target.build_configuration_list.clone(),
                    format!("Build configuration list for PBXNativeTarget \"{}\"", target.name),
                );
                Some(target.name.clone())
            }
            Object::BuildConfiguration(config) => Some(config.name.clone()),
            Object::ContainerItemProxy(_) | Object::TargetDependency(_) => {
                Some(object.isa().to_string())
            }
            Object::BuildFile(_) | Object::ConfigurationList(_) => None,
        };

        if let Some(comment) = comment {
            comments.insert(id.clone(), comment);
        }
    }

    comments
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::object::*;
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        assert_eq!(quote("wrapper.framework"), "wrapper.framework");
        assert_eq!(quote("BUILT_PRODUCTS_DIR"), "BUILT_PRODUCTS_DIR");
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("<group>"), "\"<group>\"");
        assert_eq!(quote("$(inherited)"), "\"$(inherited)\"");
        assert_eq!(quote("com.apple.product-type.framework"), "\"com.apple.product-type.framework\"");
        assert_eq!(quote("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn renders_build_files_inline_with_comments() {
        let header = ObjectId::generate();
        let build_file = ObjectId::generate();
        let phase = ObjectId::generate();

        let mut settings = Dictionary::new();
        settings.insert("ATTRIBUTES".to_string(), Value::strings(["Public"]));

        let mut objects = BTreeMap::new();
        objects.insert(
            header.clone(),
            Object::FileReference(FileReference {
                explicit_file_type: None,
                include_in_index: None,
                last_known_file_type: Some("sourcecode.c.h".to_string()),
                name: None,
                path: "Kit.h".to_string(),
                source_tree: SourceTree::Group,
            }),
        );
        objects.insert(
            build_file.clone(),
            Object::BuildFile(BuildFile {
                file_ref: header.clone(),
                settings: Some(settings),
            }),
        );
        objects.insert(
            phase.clone(),
            Object::BuildPhase(BuildPhase {
                kind: BuildPhaseKind::Headers,
                files: vec![build_file.clone()],
            }),
        );

        let comments = annotations(&objects, "Kit");
        let line = render_object(&build_file, &objects[&build_file], &comments);
        assert_eq!(
            line,
            format!(
                "\t\t{} /* Kit.h in Headers */ = {{isa = PBXBuildFile; fileRef = {} /* Kit.h */; settings = {{ATTRIBUTES = (Public, ); }}; }};",
                build_file, header
            )
        );

        let block = render_object(&phase, &objects[&phase], &comments);
        assert_eq!(
            block,
            format!(
                "\t\t{phase} /* Headers */ = {{\n\
                 \t\t\tisa = PBXHeadersBuildPhase;\n\
                 \t\t\tbuildActionMask = 2147483647;\n\
                 \t\t\tfiles = (\n\
                 \t\t\t\t{build_file} /* Kit.h in Headers */,\n\
                 \t\t\t);\n\
                 \t\t\trunOnlyForDeploymentPostprocessing = 0;\n\
                 \t\t}};"
            )
        );
    }

    #[test]
    fn renders_sections_in_isa_order() {
        let root = ObjectId::generate();
        let main_group = ObjectId::generate();
        let products = ObjectId::generate();
        let config_list = ObjectId::generate();

        let mut objects = BTreeMap::new();
        objects.insert(
            root.clone(),
            Object::Project(Project {
                attributes: Dictionary::new(),
                build_configuration_list: config_list.clone(),
                compatibility_version: "Xcode 14.0".to_string(),
                development_region: "en".to_string(),
                known_regions: vec!["en".to_string(), "Base".to_string()],
                main_group: main_group.clone(),
                product_ref_group: products.clone(),
                targets: vec![],
            }),
        );
        objects.insert(
            main_group.clone(),
            Object::Group(Group {
                children: vec![products.clone()],
                name: None,
                path: None,
                source_tree: SourceTree::Group,
            }),
        );
        objects.insert(
            products.clone(),
            Object::Group(Group {
                children: vec![],
                name: Some("Products".to_string()),
                path: None,
                source_tree: SourceTree::Group,
            }),
        );
        objects.insert(
            config_list.clone(),
            Object::ConfigurationList(ConfigurationList {
                build_configurations: vec![],
                default_configuration_name: "Release".to_string(),
            }),
        );

        let content = render(&objects, &root, "Kit").unwrap();

        assert!(content.starts_with("// !$*UTF8*$!\n{\n\tarchiveVersion = 1;\n"));
        assert!(content.contains("\tobjectVersion = 56;\n\tobjects = {\n\n/* Begin PBXGroup section */\n"));
        assert!(content.ends_with(&format!(
            "/* End XCConfigurationList section */\n\t}};\n\trootObject = {} /* Project object */;\n}}\n",
            root
        )));
        let group = content.find("Begin PBXGroup section").unwrap();
        let project = content.find("Begin PBXProject section").unwrap();
        let list = content.find("Begin XCConfigurationList section").unwrap();
        assert!(group < project && project < list);
        assert!(content.contains(&format!(
            "{} /* Build configuration list for PBXProject \"Kit\" */",
            config_list
        )));
        assert!(content.contains("compatibilityVersion = \"Xcode 14.0\";"));
    }
}
