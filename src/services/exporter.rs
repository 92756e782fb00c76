//! Excel 导出 - 业务能力层
//!
//! 单个 sheet `Products`，首行表头，列顺序固定：
//! QRCode, Product Name, Lot, Expired Date, Unit, Uniq[, Status]

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::error::ExportError;
use crate::models::ProductRecord;

pub const SHEET_NAME: &str = "Products";

pub const HEADERS: [&str; 6] = ["QRCode", "Product Name", "Lot", "Expired Date", "Unit", "Uniq"];

pub const STATUS_HEADER: &str = "Status";

/// 当前配置下的表头
pub fn headers(include_status: bool) -> Vec<&'static str> {
    let mut headers = HEADERS.to_vec();
    if include_status {
        headers.push(STATUS_HEADER);
    }
    headers
}

/// `products_<YYYY-MM-DD>.xlsx`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("products_{}.xlsx", date.format("%Y-%m-%d"))
}

/// 构建工作簿
pub fn build_workbook(records: &[ProductRecord], include_status: bool) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    write_headers(sheet, &headers(include_status), &header_format)?;

    let mut row: u32 = 1;
    for record in records {
        sheet.write_string(row, 0, &record.qrcode)?;
        sheet.write_string(row, 1, &record.product_name)?;
        sheet.write_string(row, 2, &record.lot)?;
        sheet.write_string(row, 3, &record.expired_date)?;
        sheet.write_string(row, 4, &record.unit_name)?;
        sheet.write_string(row, 5, &record.uniq)?;
        if include_status {
            let status = record.status.as_ref().map(|s| s.to_string()).unwrap_or_default();
            sheet.write_string(row, 6, &status)?;
        }
        row += 1;
    }

    Ok(workbook)
}

/// 导出到目录
///
/// # 返回
/// 空表返回 `None` 且不生成文件，否则返回文件路径
pub fn export_products(
    dir: &Path,
    records: &[ProductRecord],
    include_status: bool,
    date: NaiveDate,
) -> Result<Option<PathBuf>, ExportError> {
    if records.is_empty() {
        return Ok(None);
    }

    std::fs::create_dir_all(dir)?;
    let out_path = dir.join(export_file_name(date));

    let mut workbook = build_workbook(records, include_status)?;
    workbook.save(&out_path)?;

    info!("📊 已导出 {} 条记录: {}", records.len(), out_path.display());
    Ok(Some(out_path))
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, format)?;
    }
    Ok(())
}
