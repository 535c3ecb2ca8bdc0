use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset, RawTable, Record};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a typed dataset from a file.
pub fn load_dataset<T: Record>(path: &Path) -> Result<Dataset<T>, LoadError> {
    let table = load_table(path)?;
    let dataset = Dataset::from_table(&table)?;
    log::info!(
        "Loaded {} rows ({} universities) from {}",
        dataset.len(),
        dataset.universities.len(),
        path.display()
    );
    Ok(dataset)
}

/// Load an untyped table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line, UTF-8 (BOM tolerated)
/// * `.json`    – `[{ "year": 2024, "university_name": "...", ... }, ...]`
/// * `.parquet` – flat scalar columns (strings, ints, floats, bools)
pub fn load_table(path: &Path) -> Result<RawTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::Unsupported {
            path: path.to_path_buf(),
            extension: other.to_string(),
        }),
    }
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> LoadError {
    LoadError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| io_error(path, e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| io_error(path, e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut table = RawTable::new(path, headers);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            row: row_no + 1,
            message: e.to_string(),
        })?;

        let cells = record
            .iter()
            .map(|value| {
                if value.trim().is_empty() {
                    CellValue::Null
                } else {
                    CellValue::Text(value.to_string())
                }
            })
            .collect();
        table.rows.push(cells);
    }

    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        row: e.line(),
        message: e.to_string(),
    })?;

    let records = root.as_array().ok_or_else(|| LoadError::Parse {
        path: path.to_path_buf(),
        row: 0,
        message: "expected a top-level JSON array".into(),
    })?;

    // Column order: first appearance across all records.
    let mut columns: Vec<String> = Vec::new();
    for rec in records {
        if let Some(obj) = rec.as_object() {
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }

    let mut table = RawTable::new(path, columns);

    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| LoadError::Parse {
            path: path.to_path_buf(),
            row: i + 1,
            message: "row is not a JSON object".into(),
        })?;

        let cells = table
            .columns
            .iter()
            .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
            .collect();
        table.rows.push(cells);
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
fn load_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| io_error(path, e))?;

    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(|e| io_error(path, e))?;

    let mut table = RawTable::new(path, columns);

    for batch_result in reader {
        let batch = batch_result.map_err(|e| io_error(path, e))?;
        let first_row = table.rows.len();

        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>, String>>()
                .map_err(|message| LoadError::Parse {
                    path: path.to_path_buf(),
                    row: first_row + row + 1,
                    message,
                })?;
            table.rows.push(cells);
        }
    }

    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue, String> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|s| CellValue::Text(s.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|s| CellValue::Text(s.value(row).to_string())),
        DataType::Int16 => col
            .as_primitive_opt::<Int16Type>()
            .map(|a| CellValue::Integer(i64::from(a.value(row)))),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| CellValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| CellValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col
            .as_boolean_opt()
            .map(|a| CellValue::Bool(a.value(row))),
        other => return Err(format!("unsupported column type {other:?}")),
    };
    cell.ok_or_else(|| format!("column does not match its type {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{AdmissionRecord, AssessmentRecord};
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.xlsx", "");
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported { ref extension, .. } if extension == "xlsx"));
    }

    #[test]
    fn csv_with_bom_and_chinese_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "trend.csv",
            "\u{feff}年份,院校名称,专业组代码,专业组名称,专业列表,投档分数,投档排位\n\
             2024,上海大学,003,上海大学03组,\"计算机, 软件\",560,9000\n",
        );
        let ds = load_dataset::<AdmissionRecord>(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rows[0].university, "上海大学");
        assert_eq!(ds.rows[0].group_code, "003");
        assert_eq!(ds.rows[0].major_list, "计算机, 软件");
    }

    #[test]
    fn ragged_csv_row_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.csv", "a,b\n1,2\n3\n");
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { row: 2, .. }));
    }

    #[test]
    fn json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "zp.json",
            r#"[{"year": 2024, "university_name": "A", "major_name": "m", "lowest_rank": 4800.0, "average_rank": null}]"#,
        );
        let ds = load_dataset::<AssessmentRecord>(&path).unwrap();
        assert_eq!(ds.rows[0].lowest_rank, Some(4800));
        assert_eq!(ds.rows[0].average_rank, None);
    }
}
