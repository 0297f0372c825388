//! README generation
//!
//! Renders the repository README from the current quote file: download
//! links, entry count, checksum, a random sample, and generation time.

use crate::output::report::escape_cell;
use crate::output::{OutputError, OutputResult};
use crate::store::Quote;
use chrono::{DateTime, FixedOffset, Utc};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Inputs for the README template
#[derive(Debug, Clone)]
pub struct ReadmeContext {
    pub title: String,
    pub repository: String,
    pub branch: String,
    /// CSV path relative to the repository root
    pub csv_path: String,
    pub count: usize,
    /// SHA-256 of the CSV file, hex encoded
    pub checksum: String,
    pub sample: Option<Quote>,
    pub generated_at: DateTime<Utc>,
}

/// Mirrors the CSV can be downloaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLinks {
    pub raw: String,
    pub jsdelivr: String,
    pub ghproxy: String,
}

pub fn download_links(repository: &str, branch: &str, csv_path: &str) -> DownloadLinks {
    let csv_path = csv_path.trim_start_matches("./");
    let raw = format!(
        "https://raw.githubusercontent.com/{}/{}/{}",
        repository, branch, csv_path
    );
    DownloadLinks {
        jsdelivr: format!(
            "https://cdn.jsdelivr.net/gh/{}@{}/{}",
            repository, branch, csv_path
        ),
        ghproxy: format!("https://ghproxy.com/{}", raw),
        raw,
    }
}

/// SHA-256 of `bytes`, hex encoded
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn format_times(at: &DateTime<Utc>) -> String {
    let utc = at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    match FixedOffset::east_opt(8 * 3600) {
        Some(cst) => format!(
            "**{}** / **{}**",
            utc,
            at.with_timezone(&cst).format("%Y-%m-%d %H:%M:%S UTC+8")
        ),
        None => format!("**{}**", utc),
    }
}

/// Renders the README as Markdown
pub fn render_readme(ctx: &ReadmeContext) -> String {
    let links = download_links(&ctx.repository, &ctx.branch, &ctx.csv_path);
    let mut md = String::new();

    md.push_str("<!-- AUTO-GENERATED: DO NOT EDIT MANUALLY -->\n");
    md.push_str("<div align=\"center\">\n\n");
    md.push_str(&format!("# {}\n\n", ctx.title));
    md.push_str("中文语录数据集（CSV），由 GitHub Actions 每日自动更新。\n\n");
    md.push_str(&format!(
        "![语录数量](https://img.shields.io/badge/quotes-{}-brightgreen)\n",
        ctx.count
    ));
    md.push_str(&format!(
        "[![Download GitHub Raw](https://img.shields.io/badge/Download-GitHub%20Raw-2ea44f)]({})\n",
        links.raw
    ));
    md.push_str(&format!(
        "[![Download jsDelivr](https://img.shields.io/badge/Download-jsDelivr-blue)]({})\n",
        links.jsdelivr
    ));
    md.push_str(&format!(
        "[![Download ghproxy](https://img.shields.io/badge/Download-ghproxy-orange)]({})\n\n",
        links.ghproxy
    ));
    md.push_str("</div>\n\n---\n\n");

    md.push_str(&format!("## 下载（{}）\n\n", ctx.csv_path));
    md.push_str("| 镜像源 | 链接 |\n");
    md.push_str("| :--- | :--- |\n");
    md.push_str(&format!("| GitHub Raw | `{}` |\n", links.raw));
    md.push_str(&format!("| jsDelivr | `{}` |\n", links.jsdelivr));
    md.push_str(&format!("| ghproxy | `{}` |\n\n", links.ghproxy));

    md.push_str("## 统计\n\n");
    md.push_str(&format!("- 语录条目数：**{}**\n", ctx.count));
    md.push_str(&format!("- SHA-256：`{}`\n", ctx.checksum));
    md.push_str(&format!(
        "- 最近生成时间：{}\n\n",
        format_times(&ctx.generated_at)
    ));

    if let Some(sample) = &ctx.sample {
        md.push_str("## 随机一句\n\n");
        md.push_str(&format!(
            "> {}\n>\n> —— {}\n\n",
            escape_cell(&sample.text),
            escape_cell(&sample.author)
        ));
    }

    md.push_str("## 命令行下载\n\n");
    md.push_str("```bash\n");
    md.push_str(&format!("curl -L -o quotes.csv {}\n", links.raw));
    md.push_str("# 或（CDN 加速）\n");
    md.push_str(&format!("curl -L -o quotes.csv {}\n", links.jsdelivr));
    md.push_str("```\n\n");

    md.push_str("## 文件格式\n\n");
    md.push_str("UTF-8 编码，逗号分隔，首行为表头 `text,author`。\n");

    md
}

/// The first `limit` lines of the CSV text, for the log preview
pub fn preview_lines(text: &str, limit: usize) -> Vec<&str> {
    text.lines().take(limit).collect()
}

/// Sorted entry names in `dir`, directories marked with a trailing `/`
pub fn list_directory(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

/// Renders and writes the README to `path`
pub fn write_readme(ctx: &ReadmeContext, path: &Path) -> OutputResult<()> {
    std::fs::write(path, render_readme(ctx)).map_err(|source| OutputError::Write {
        path: path.display().to_string(),
        source,
    })
}
