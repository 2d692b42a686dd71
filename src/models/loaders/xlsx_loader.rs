use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;

use crate::error::{AppResult, FileError};
use crate::models::loaders::build_table;
use crate::models::sku::InputTable;

/// 从 Excel 工作簿的第一个工作表解析输入表
///
/// 数字单元格按显示值转成文本，`12345.0` 读作 `12345`。
pub fn parse_xlsx_table(bytes: Vec<u8>, sku_column: &str, source: &str) -> AppResult<InputTable> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| FileError::spreadsheet_failed(source, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FileError::spreadsheet_failed(source, "工作簿中没有工作表"))?
        .map_err(|e| FileError::spreadsheet_failed(source, e))?;

    let mut rows = range.rows();
    let headers = rows.next().map(cell_texts).unwrap_or_default();
    let records = rows.map(cell_texts).collect();

    build_table(headers, records, sku_column, source)
}

fn cell_texts(row: &[Data]) -> Vec<String> {
    row.iter().map(cell_text).collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
