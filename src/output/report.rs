//! Per-run Markdown summary
//!
//! Rendered after every update run and appended to the GitHub step summary
//! file when one is configured.

use crate::harvest::{FetchedQuote, RunStats};
use crate::output::{OutputError, OutputResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Everything the run summary shows
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub new_quotes: Vec<FetchedQuote>,
    pub removed: usize,
    pub total: usize,
    pub target: usize,
    pub max_length: Option<usize>,
    pub stats: RunStats,
    pub elapsed: Duration,
    pub exhausted: bool,
    pub config_hash: Option<String>,
}

/// Escapes a value for use inside a Markdown table cell
pub fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

/// Formats a run report as Markdown
pub fn format_run_report(report: &RunReport) -> String {
    let mut md = String::new();

    md.push_str("# ✨ 语录自动更新报告\n\n");

    md.push_str("| 今日新增 | 今日移除 | 库存总量 | 长度限制 | 耗时 |\n");
    md.push_str("| :---: | :---: | :---: | :---: | :---: |\n");
    let limit = match report.max_length {
        Some(max) => format!("{}字", max),
        None => "无".to_string(),
    };
    md.push_str(&format!(
        "| `{}` | `{}` | `{}` | `{}` | `{:.2}s` |\n\n",
        report.new_quotes.len(),
        report.removed,
        report.total,
        limit,
        report.elapsed.as_secs_f64()
    ));

    if report.exhausted {
        md.push_str(&format!(
            "> ⚠️ 连续多轮未获取到新语录，提前结束（{}/{}）。\n\n",
            report.new_quotes.len(),
            report.target
        ));
    }

    let active: Vec<_> = report.stats.iter().filter(|(_, t)| !t.is_empty()).collect();
    if !active.is_empty() {
        md.push_str("### 📡 API 统计\n\n");
        md.push_str("| 接口名称 | 成功 | 太长过滤 | 失败 |\n");
        md.push_str("| :--- | :---: | :---: | :---: |\n");
        for (name, tally) in active {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(name),
                tally.success,
                tally.too_long,
                tally.failure
            ));
        }
        md.push('\n');
    }

    if !report.new_quotes.is_empty() {
        md.push_str("### 🎲 新增内容预览\n\n");
        md.push_str("| 字数 | 语录内容 | 作者 | 来源 |\n");
        md.push_str("| :---: | :--- | :--- | :--- |\n");
        for fetched in &report.new_quotes {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                fetched.quote.char_len(),
                escape_cell(&fetched.quote.text),
                escape_cell(&fetched.quote.author),
                escape_cell(&fetched.source)
            ));
        }
        md.push('\n');
    } else {
        md.push_str("⚠️ 未获取到新数据。\n\n");
    }

    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("<sub>config sha256: `{}`</sub>\n", hash));
    }

    md
}

/// Appends the formatted report to `path`
pub fn write_run_report(report: &RunReport, path: &Path) -> OutputResult<()> {
    let write_err = |source| OutputError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(format_run_report(report).as_bytes())
        .map_err(write_err)?;

    Ok(())
}
