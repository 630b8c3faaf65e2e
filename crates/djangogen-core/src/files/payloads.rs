//! Literal content of the generated files
//!
//! Payloads live under `payloads/` and are embedded at compile time. The
//! `__PROJECT_NAME__` and `__APP_NAME__` tokens are substituted on render.

use super::ProjectContext;

const PROJECT_TOKEN: &str = "__PROJECT_NAME__";
const APP_TOKEN: &str = "__APP_NAME__";

const SETTINGS: &str = include_str!("../../payloads/settings.py.tmpl");
const PROJECT_URLS: &str = include_str!("../../payloads/project_urls.py.tmpl");
const APP_URLS: &str = include_str!("../../payloads/app_urls.py.tmpl");
const VIEWS: &str = include_str!("../../payloads/views.py.tmpl");
const MODELS: &str = include_str!("../../payloads/models.py.tmpl");
const ADMIN: &str = include_str!("../../payloads/admin.py.tmpl");
const HOME_TEMPLATE: &str = include_str!("../../payloads/home.html.tmpl");
const ABOUT_TEMPLATE: &str = include_str!("../../payloads/about.html.tmpl");

fn render(template: &str, ctx: &ProjectContext) -> String {
    template
        .replace(PROJECT_TOKEN, ctx.project_name().as_str())
        .replace(APP_TOKEN, ctx.app_name().as_str())
}

pub fn settings(ctx: &ProjectContext) -> String {
    render(SETTINGS, ctx)
}

pub fn project_urls(ctx: &ProjectContext) -> String {
    render(PROJECT_URLS, ctx)
}

pub fn app_urls(ctx: &ProjectContext) -> String {
    render(APP_URLS, ctx)
}

pub fn views(ctx: &ProjectContext) -> String {
    render(VIEWS, ctx)
}

/// The single `Post` model
pub fn models(ctx: &ProjectContext) -> String {
    render(MODELS, ctx)
}

pub fn admin(ctx: &ProjectContext) -> String {
    render(ADMIN, ctx)
}

pub fn home_template(ctx: &ProjectContext) -> String {
    render(HOME_TEMPLATE, ctx)
}

pub fn about_template(ctx: &ProjectContext) -> String {
    render(ABOUT_TEMPLATE, ctx)
}
