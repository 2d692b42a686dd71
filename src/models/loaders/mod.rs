pub mod csv_loader;
pub mod xlsx_loader;

pub use csv_loader::parse_input_table;
pub use xlsx_loader::parse_xlsx_table;

use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use crate::error::{AppError, AppResult, FileError};
use crate::models::sku::{InputTable, SkuRow};

/// 表格文件格式，按扩展名判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// `.xlsx` / `.xlsm` 视为 Excel，其余按 CSV 处理
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => TableFormat::Xlsx,
            _ => TableFormat::Csv,
        }
    }
}

/// 加载输入表（CSV 或 Excel 的第一个工作表）
///
/// 第一行必须是表头，且包含 `sku_column` 指定的列。
pub async fn load_input_table(path: &Path, sku_column: &str) -> AppResult<InputTable> {
    let source_name = path.display().to_string();
    let content = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(&source_name, e))?;

    let table = match TableFormat::from_path(path) {
        TableFormat::Csv => parse_input_table(content.as_slice(), sku_column, &source_name)?,
        TableFormat::Xlsx => parse_xlsx_table(content, sku_column, &source_name)?,
    };
    info!("成功加载 {} 个 SKU ({})", table.len(), source_name);
    Ok(table)
}

/// 由表头和原始单元格组装输入表
///
/// 所有行都被补齐到同一宽度；比表头更宽的行会让表头追加 `Unnamed: <列号>`，
/// 保证输出时每个单元格仍在自己的列下。
pub(crate) fn build_table(
    headers: Vec<String>,
    records: Vec<Vec<String>>,
    sku_column: &str,
    source: &str,
) -> AppResult<InputTable> {
    let mut headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    let sku_index = headers
        .iter()
        .position(|h| h == sku_column.trim())
        .ok_or_else(|| FileError::MissingColumn {
            path: source.to_string(),
            column: sku_column.to_string(),
        })?;

    let width = records
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(headers.len());
    if width > headers.len() {
        warn!(
            "{} 中有数据行多于表头的 {} 列，已补充未命名列",
            source,
            headers.len()
        );
        let named = headers.len();
        headers.extend((named..width).map(|i| format!("Unnamed: {}", i)));
    }

    let rows = records
        .into_iter()
        .enumerate()
        .map(|(index, mut fields)| {
            fields.resize(width, String::new());
            let sku = fields[sku_index].trim().to_string();
            SkuRow::new(index, sku, fields)
        })
        .collect();

    Ok(InputTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TableFormat::from_path(Path::new("products.xlsx")), TableFormat::Xlsx);
        assert_eq!(TableFormat::from_path(Path::new("Products.XLSX")), TableFormat::Xlsx);
        assert_eq!(TableFormat::from_path(Path::new("products.csv")), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(Path::new("products")), TableFormat::Csv);
    }

    #[test]
    fn test_wide_rows_get_unnamed_headers() {
        let table = build_table(
            vec!["Item Code".to_string(), "Note".to_string()],
            vec![
                vec!["A1".to_string(), "x".to_string(), "extra".to_string()],
                vec!["B2".to_string()],
            ],
            "Item Code",
            "test",
        )
        .unwrap();

        assert_eq!(table.headers, vec!["Item Code", "Note", "Unnamed: 2"]);
        assert_eq!(table.rows[0].fields, vec!["A1", "x", "extra"]);
        assert_eq!(table.rows[1].fields, vec!["B2", "", ""]);
    }
}
