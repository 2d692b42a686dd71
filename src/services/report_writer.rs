//! 结果写入服务 - 业务能力层
//!
//! 只负责把结果记录写成 CSV 或 Excel，不关心记录是怎么来的

use rust_xlsxwriter::{Workbook, XlsxError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, FileError};
use crate::models::{ClassificationMode, ResultRecord, TableFormat};

/// 输出单元格
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Bool(bool),
    Count(usize),
    Empty,
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
            Cell::Count(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// 结果写入服务
///
/// 输出列 = 输入表的原始列 + 分类列：
/// - 四分类模式：`No Results Found`、`Product Count`、`Error`
/// - 仅存在性模式：`Product Exists`、`Error`
///
/// 输出格式由文件扩展名决定，`.xlsx` / `.xlsm` 写 Excel，其余写 CSV。
pub struct ReportWriter {
    output_path: PathBuf,
    mode: ClassificationMode,
}

impl ReportWriter {
    pub fn new(output_path: impl Into<PathBuf>, mode: ClassificationMode) -> Self {
        Self {
            output_path: output_path.into(),
            mode,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// 分类列的表头
    pub fn result_columns(&self) -> &'static [&'static str] {
        match self.mode {
            ClassificationMode::FourWay => &["No Results Found", "Product Count", "Error"],
            ClassificationMode::ExistenceOnly => &["Product Exists", "Error"],
        }
    }

    /// 写入输出文件，按输入行号排序
    pub async fn write(&self, headers: &[String], records: &[ResultRecord]) -> AppResult<()> {
        let path = self.output_path.display().to_string();
        let format = TableFormat::from_path(&self.output_path);
        debug!("写入结果: {} 条 → {} ({:?})", records.len(), path, format);

        let buffer = match format {
            TableFormat::Csv => {
                let mut buffer = Vec::new();
                self.write_to(&mut buffer, headers, records)
                    .map_err(|e| AppError::file_write_failed(&path, e))?;
                buffer
            }
            TableFormat::Xlsx => self
                .to_xlsx(headers, records)
                .map_err(|e| FileError::spreadsheet_failed(&path, e))?,
        };

        tokio::fs::write(&self.output_path, buffer)
            .await
            .map_err(|e| AppError::file_write_failed(&path, e))?;

        info!("💾 结果已保存至: {}", path);
        Ok(())
    }

    /// 以 CSV 写入任意 writer
    pub fn write_to<W: Write>(
        &self,
        writer: W,
        headers: &[String],
        records: &[ResultRecord],
    ) -> Result<(), csv::Error> {
        let (header_row, rows) = self.layout(headers, records);
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(&header_row)?;
        for row in rows {
            csv_writer.write_record(row.iter().map(Cell::text))?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// 生成 Excel 工作簿内容
    ///
    /// 布尔列写成 Excel 布尔值，数量写成数字，空单元格不写。
    pub fn to_xlsx(&self, headers: &[String], records: &[ResultRecord]) -> Result<Vec<u8>, XlsxError> {
        let (header_row, rows) = self.layout(headers, records);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col, header) in header_row.iter().enumerate() {
            sheet.write_string(0, column(col)?, header.as_str())?;
        }
        for (i, row) in rows.iter().enumerate() {
            let line = u32::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (col, cell) in row.iter().enumerate() {
                let col = column(col)?;
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string(line, col, s.as_str())?;
                    }
                    Cell::Bool(b) => {
                        sheet.write_boolean(line, col, *b)?;
                    }
                    Cell::Count(n) => {
                        sheet.write_number(line, col, *n as f64)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        workbook.save_to_buffer()
    }

    /// 表头与按行号排序的数据行
    ///
    /// 原始列统一补齐到同一宽度，比表头宽的行会追加 `Unnamed: <列号>` 表头，
    /// 分类列因此总在自己的表头下。
    fn layout(&self, headers: &[String], records: &[ResultRecord]) -> (Vec<String>, Vec<Vec<Cell>>) {
        let width = records
            .iter()
            .map(|r| r.row.fields.len())
            .max()
            .unwrap_or(0)
            .max(headers.len());

        let mut header_row: Vec<String> = headers.to_vec();
        header_row.extend((headers.len()..width).map(|i| format!("Unnamed: {}", i)));
        header_row.extend(self.result_columns().iter().map(|c| c.to_string()));

        let mut sorted: Vec<&ResultRecord> = records.iter().collect();
        sorted.sort_by_key(|r| r.row.index);

        let rows = sorted
            .into_iter()
            .map(|record| {
                let mut row: Vec<Cell> = record
                    .row
                    .fields
                    .iter()
                    .map(|f| Cell::Text(f.clone()))
                    .collect();
                row.resize(width, Cell::Text(String::new()));
                row.extend(self.result_cells(record));
                row
            })
            .collect();

        (header_row, rows)
    }

    fn result_cells(&self, record: &ResultRecord) -> Vec<Cell> {
        let outcome = &record.outcome;
        let error = record
            .error()
            .map(|e| Cell::Text(e.to_string()))
            .unwrap_or(Cell::Empty);

        match self.mode {
            ClassificationMode::FourWay => vec![
                tri_state(outcome.exists().map(|exists| !exists)),
                outcome.product_count().map(Cell::Count).unwrap_or(Cell::Empty),
                error,
            ],
            ClassificationMode::ExistenceOnly => vec![tri_state(outcome.exists()), error],
        }
    }
}

fn tri_state(value: Option<bool>) -> Cell {
    value.map(Cell::Bool).unwrap_or(Cell::Empty)
}

fn column(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}
