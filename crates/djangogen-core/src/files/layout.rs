//! The fixed Django project layout
//!
//! Specs are applied in list order. A directory spec must come before any spec
//! that writes inside it; [`check_ordering`] enforces that.

use super::payloads;
use super::{FileSpec, ProjectContext};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Ordered specs for a project with one app and its templates
pub fn django_layout(ctx: &ProjectContext) -> Vec<FileSpec> {
    let project = PathBuf::from(ctx.project_name().as_str());
    let app = PathBuf::from(ctx.app_name().as_str());
    let templates = app.join("templates").join(ctx.app_name().as_str());

    vec![
        FileSpec::file(project.join("settings.py"), payloads::settings),
        FileSpec::file(project.join("urls.py"), payloads::project_urls),
        FileSpec::file(app.join("urls.py"), payloads::app_urls),
        FileSpec::file(app.join("views.py"), payloads::views),
        FileSpec::file(app.join("models.py"), payloads::models),
        FileSpec::file(app.join("admin.py"), payloads::admin),
        FileSpec::directory(&templates),
        FileSpec::file(templates.join("home.html"), payloads::home_template),
        FileSpec::file(templates.join("about.html"), payloads::about_template),
    ]
}

/// Fail if any spec lands inside a directory spec that appears later
pub fn check_ordering(specs: &[FileSpec]) -> Result<(), ConfigError> {
    for (i, spec) in specs.iter().enumerate() {
        for dir in specs[i + 1..].iter().filter(|s| s.is_directory()) {
            if spec.path() != dir.path() && spec.path().starts_with(dir.path()) {
                return Err(ConfigError::Layout(format!(
                    "{} is written before its directory {} is created",
                    spec.path().display(),
                    dir.path().display()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppName, ProjectName};
    use std::path::Path;

    fn ctx() -> ProjectContext {
        ProjectContext::new(
            ProjectName::parse("MySite").unwrap(),
            AppName::parse("main").unwrap(),
        )
    }

    #[test]
    fn test_layout_paths() {
        let specs = django_layout(&ctx());
        let paths: Vec<&Path> = specs.iter().map(|s| s.path()).collect();
        for expected in [
            "MySite/settings.py",
            "MySite/urls.py",
            "main/models.py",
            "main/views.py",
            "main/admin.py",
            "main/urls.py",
            "main/templates/main/home.html",
            "main/templates/main/about.html",
        ] {
            assert!(paths.contains(&Path::new(expected)), "missing {expected}");
        }
    }

    #[test]
    fn test_template_directory_precedes_template_files() {
        let specs = django_layout(&ctx());
        let dir_idx = specs
            .iter()
            .position(|s| s.is_directory() && s.path() == Path::new("main/templates/main"))
            .unwrap();
        let home_idx = specs
            .iter()
            .position(|s| s.path() == Path::new("main/templates/main/home.html"))
            .unwrap();
        assert!(dir_idx < home_idx);
        assert!(check_ordering(&specs).is_ok());
    }

    #[test]
    fn test_misordered_layout_is_rejected() {
        let specs = vec![
            FileSpec::file("main/templates/main/home.html", payloads::home_template),
            FileSpec::directory("main/templates/main"),
        ];
        let err = check_ordering(&specs).unwrap_err();
        assert!(err.to_string().contains("home.html"));
    }

    #[test]
    fn test_nested_directories_must_be_ordered() {
        let ok = vec![
            FileSpec::directory("static"),
            FileSpec::directory("static/css"),
        ];
        assert!(check_ordering(&ok).is_ok());

        let bad = vec![
            FileSpec::directory("static/css"),
            FileSpec::directory("static"),
        ];
        assert!(check_ordering(&bad).is_err());
    }
}
