use crate::error::{AppError, AppResult, FileError};
use crate::models::loaders::build_table;
use crate::models::sku::InputTable;

/// 从任意 reader 解析 CSV 输入表；`source` 只用于错误信息
pub fn parse_input_table<R: std::io::Read>(
    reader: R,
    sku_column: &str,
    source: &str,
) -> AppResult<InputTable> {
    let csv_error = |e: csv::Error| {
        AppError::File(FileError::CsvParseFailed {
            path: source.to_string(),
            source: e,
        })
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        records.push(record.iter().map(str::to_string).collect());
    }

    build_table(headers, records, sku_column, source)
}
