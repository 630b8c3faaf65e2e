//! Seed script assembly
//!
//! The script is meant for `python manage.py shell < seed_data.py`. It deletes
//! every existing record of the target model and creates the given records in
//! order. The core only assembles it; running it is up to the user.

use crate::error::SeedError;
use crate::files::ProjectContext;
use serde::Serialize;
use std::fmt::Write as _;

/// Model seeded by default
pub const DEFAULT_MODEL: &str = "Post";

/// File name the seed script is written to in the project root
pub const SEED_FILE_NAME: &str = "seed_data.py";

/// One record to insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSpec {
    pub title: String,
    pub content: String,
    pub is_published: bool,
}

impl RecordSpec {
    pub fn published(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            is_published: true,
        }
    }
}

/// The app and model a seed script targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedTarget {
    pub app: String,
    pub model: String,
}

impl SeedTarget {
    pub fn new(app: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            model: model.into(),
        }
    }
}

/// A rendered seed script and the records it inserts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPayload {
    pub target: SeedTarget,
    pub records: Vec<RecordSpec>,
    pub script: String,
}

/// The three welcome posts shipped with every project
pub fn default_records(ctx: &ProjectContext) -> Vec<RecordSpec> {
    vec![
        RecordSpec::published(
            format!("Chào mừng đến với {}!", ctx.project_name()),
            "Website của bạn đã được tạo thành công với Django. Bạn có thể bắt đầu thêm nội dung ngay bây giờ.",
        ),
        RecordSpec::published(
            "Django - Framework mạnh mẽ",
            "Django là một framework web Python cấp cao giúp phát triển nhanh chóng và thực tế. Nó khuyến khích việc phát triển nhanh chóng và thiết kế sạch sẽ.",
        ),
        RecordSpec::published(
            "Hướng dẫn sử dụng Admin",
            "Để quản lý nội dung, hãy truy cập /admin/ và đăng nhập với tài khoản superuser. Bạn có thể tạo, sửa, xóa các bài viết dễ dàng.",
        ),
    ]
}

/// Python literal for a string; JSON string syntax is valid Python
fn py_str(value: &str) -> Result<String, SeedError> {
    Ok(serde_json::to_string(value)?)
}

fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Render a script that replaces all `target` records with `records`
pub fn build_seed_payload(
    target: &SeedTarget,
    records: &[RecordSpec],
) -> Result<SeedPayload, SeedError> {
    let model = &target.model;
    let mut script = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(script, "from {}.models import {}", target.app, model);
    let _ = writeln!(script);
    let _ = writeln!(script, "{}.objects.all().delete()", model);
    let _ = writeln!(script);
    let _ = writeln!(script, "records = [");
    for record in records {
        let _ = writeln!(
            script,
            "    {{\"title\": {}, \"content\": {}, \"is_published\": {}}},",
            py_str(&record.title)?,
            py_str(&record.content)?,
            py_bool(record.is_published)
        );
    }
    let _ = writeln!(script, "]");
    let _ = writeln!(script);
    let _ = writeln!(script, "for record in records:");
    let _ = writeln!(script, "    {}.objects.create(**record)", model);
    let _ = writeln!(script);
    let _ = writeln!(script, "print(f\"Đã tạo {{len(records)}} bài viết mẫu!\")");

    Ok(SeedPayload {
        target: target.clone(),
        records: records.to_vec(),
        script,
    })
}
