//! 终端表格输出

use crate::models::ProductRecord;
use crate::services::exporter;
use crate::utils::logging::truncate_text;

/// 单元格最大显示宽度
const MAX_CELL_WIDTH: usize = 40;

/// 渲染结果表，空表返回空字符串
pub fn render_table(records: &[ProductRecord], include_status: bool) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut header = vec!["#"];
    header.extend(exporter::headers(include_status));

    let mut rows: Vec<Vec<String>> = vec![header.iter().map(|h| h.to_string()).collect()];
    for (i, record) in records.iter().enumerate() {
        let mut row = vec![
            (i + 1).to_string(),
            truncate_text(&record.qrcode, MAX_CELL_WIDTH),
            truncate_text(&record.product_name, MAX_CELL_WIDTH),
            record.lot.clone(),
            record.expired_date.clone(),
            record.unit_name.clone(),
            record.uniq.clone(),
        ];
        if include_status {
            row.push(record.status.as_ref().map(|s| s.to_string()).unwrap_or_default());
        }
        rows.push(row);
    }

    let widths: Vec<usize> = (0..header.len())
        .map(|col| rows.iter().map(|r| r[col].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect();
        out.push_str(line.join(" | ").trim_end());
        out.push('\n');
        if i == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            out.push_str(&rule.join("-+-"));
            out.push('\n');
        }
    }
    out
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}
