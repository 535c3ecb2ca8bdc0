use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from CSV, JSON or Parquet.
///
/// CSV cells stay `Text` so codes like `"001"` keep their leading zeros;
/// numeric interpretation happens when a typed record reads the cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Interpret the cell as a whole number. `"653.0"` and `653.0` count.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            CellValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite() && v.fract() == 0.0)
                        .map(|v| v as i64)
                })
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – untyped rows straight from a file
// ---------------------------------------------------------------------------

/// Header names plus rows of cells, in file order.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub source: PathBuf,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(source: &Path, columns: Vec<String>) -> Self {
        Self {
            source: source.to_path_buf(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Index of the first column matching the field's name or an alias.
    pub fn column_index(&self, field: &Field) -> Option<usize> {
        self.columns.iter().position(|c| field.matches(c))
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        Row { table: self, index }
    }
}

// ---------------------------------------------------------------------------
// Fields and typed row access
// ---------------------------------------------------------------------------

/// A logical column: canonical English name plus the header aliases used
/// by the published data files.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl Field {
    pub const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    pub fn matches(&self, header: &str) -> bool {
        let header = header.trim();
        header == self.name || self.aliases.iter().any(|a| *a == header)
    }
}

pub mod columns {
    use super::Field;

    pub const YEAR: Field = Field::new("year", &["年份"]);
    pub const UNIVERSITY: Field = Field::new("university_name", &["院校名称"]);
    pub const GROUP_CODE: Field =
        Field::new("group_code", &["专业组代码", "major_group_code"]);
    pub const GROUP_NAME: Field =
        Field::new("group_name", &["专业组名称", "major_group_name"]);
    pub const MAJOR_LIST: Field = Field::new("major_list", &["专业列表"]);
    pub const ADMISSION_SCORE: Field = Field::new("admission_score", &["投档分数"]);
    pub const ADMISSION_RANK: Field = Field::new("admission_rank", &["投档排位"]);
    pub const BATCH: Field = Field::new("batch", &["批次"]);
    pub const MAJOR_NAME: Field = Field::new("major_name", &["专业名称"]);
    pub const ENROLLMENT: Field =
        Field::new("enrollment_count", &["招生人数", "录取人数"]);
    pub const HIGHEST_SCORE: Field = Field::new("highest_score", &["最高分"]);
    pub const LOWEST_SCORE: Field = Field::new("lowest_score", &["最低分"]);
    pub const AVERAGE_SCORE: Field = Field::new("average_score", &["平均分"]);
    pub const LOWEST_RANK: Field = Field::new("lowest_rank", &["最低分排位"]);
    pub const AVERAGE_RANK: Field = Field::new("average_rank", &["平均分排位"]);
}

/// Borrowed view of one row with typed accessors by [`Field`].
pub struct Row<'a> {
    table: &'a RawTable,
    index: usize,
}

impl<'a> Row<'a> {
    fn cell(&self, field: &Field) -> Option<&'a CellValue> {
        let col = self.table.column_index(field)?;
        self.table.rows.get(self.index)?.get(col)
    }

    pub fn text(&self, field: &Field) -> Result<String, String> {
        match self.cell(field) {
            Some(v) if !v.is_null() => Ok(v.to_string().trim().to_string()),
            _ => Err(format!("'{}' is empty", field.name)),
        }
    }

    /// Text that may be blank (blank becomes an empty string).
    pub fn text_or_empty(&self, field: &Field) -> String {
        self.cell(field)
            .filter(|v| !v.is_null())
            .map(|v| v.to_string().trim().to_string())
            .unwrap_or_default()
    }

    pub fn opt_u32(&self, field: &Field) -> Result<Option<u32>, String> {
        let Some(cell) = self.cell(field).filter(|v| !v.is_null()) else {
            return Ok(None);
        };
        let value = cell
            .as_i64()
            .ok_or_else(|| format!("'{}': '{cell}' is not a whole number", field.name))?;
        u32::try_from(value)
            .map(Some)
            .map_err(|_| format!("'{}': {value} is out of range", field.name))
    }

    pub fn u32(&self, field: &Field) -> Result<u32, String> {
        self.opt_u32(field)?
            .ok_or_else(|| format!("'{}' is empty", field.name))
    }

    pub fn year(&self, field: &Field) -> Result<u16, String> {
        let value = self.u32(field)?;
        u16::try_from(value).map_err(|_| format!("'{}': {value} is not a year", field.name))
    }

    pub fn opt_f64(&self, field: &Field) -> Result<Option<f64>, String> {
        let Some(cell) = self.cell(field).filter(|v| !v.is_null()) else {
            return Ok(None);
        };
        cell.as_f64()
            .map(Some)
            .ok_or_else(|| format!("'{}': '{cell}' is not a number", field.name))
    }
}

// ---------------------------------------------------------------------------
// Record traits
// ---------------------------------------------------------------------------

/// A typed row that can be built from a [`RawTable`].
pub trait Record: Sized {
    /// Columns that must be present in the header.
    const REQUIRED: &'static [Field];

    fn from_row(row: &Row<'_>) -> Result<Self, String>;

    fn university(&self) -> &str;

    /// Year partition, for tables that span years.
    fn year(&self) -> Option<u16> {
        None
    }

    /// Sub-category used by exact-match lookups (batch or group).
    fn category(&self) -> Option<&str> {
        None
    }
}

/// Records that take part in rank-proximity queries.
pub trait Ranked: Record {
    fn partition(&self) -> u16;

    /// Cut-off rank compared against the target. `None` never matches.
    fn rank(&self) -> Option<u32>;
}

/// Per-major records with a presentation order by rank.
pub trait Detailed: Record {
    /// Average rank, falling back to the lowest-score rank.
    fn sort_rank(&self) -> Option<u32>;
}

// ---------------------------------------------------------------------------
// AdmissionRecord – general track, multi-year, one row per group
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionRecord {
    pub year: u16,
    pub university: String,
    pub group_code: String,
    pub group_name: String,
    /// Free-text list of majors in the group.
    pub major_list: String,
    pub score: u32,
    pub rank: u32,
}

impl Record for AdmissionRecord {
    const REQUIRED: &'static [Field] = &[
        columns::YEAR,
        columns::UNIVERSITY,
        columns::GROUP_CODE,
        columns::GROUP_NAME,
        columns::ADMISSION_SCORE,
        columns::ADMISSION_RANK,
    ];

    fn from_row(row: &Row<'_>) -> Result<Self, String> {
        Ok(Self {
            year: row.year(&columns::YEAR)?,
            university: row.text(&columns::UNIVERSITY)?,
            group_code: row.text_or_empty(&columns::GROUP_CODE),
            group_name: row.text_or_empty(&columns::GROUP_NAME),
            major_list: row.text_or_empty(&columns::MAJOR_LIST),
            score: row.u32(&columns::ADMISSION_SCORE)?,
            rank: row.u32(&columns::ADMISSION_RANK)?,
        })
    }

    fn university(&self) -> &str {
        &self.university
    }

    fn year(&self) -> Option<u16> {
        Some(self.year)
    }

    fn category(&self) -> Option<&str> {
        Some(&self.group_name)
    }
}

impl Ranked for AdmissionRecord {
    fn partition(&self) -> u16 {
        self.year
    }

    fn rank(&self) -> Option<u32> {
        Some(self.rank)
    }
}

// ---------------------------------------------------------------------------
// AdmissionDetailRecord – general track, one year, per major
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionDetailRecord {
    pub university: String,
    pub batch: String,
    pub group_name: String,
    pub major_name: String,
    pub enrollment: Option<u32>,
    pub highest_score: Option<u32>,
    pub lowest_score: Option<u32>,
    pub average_score: Option<f64>,
    pub lowest_rank: Option<u32>,
    pub average_rank: Option<u32>,
}

impl Record for AdmissionDetailRecord {
    const REQUIRED: &'static [Field] = &[
        columns::UNIVERSITY,
        columns::BATCH,
        columns::GROUP_NAME,
        columns::MAJOR_NAME,
    ];

    fn from_row(row: &Row<'_>) -> Result<Self, String> {
        Ok(Self {
            university: row.text(&columns::UNIVERSITY)?,
            batch: row.text_or_empty(&columns::BATCH),
            group_name: row.text_or_empty(&columns::GROUP_NAME),
            major_name: row.text_or_empty(&columns::MAJOR_NAME),
            enrollment: row.opt_u32(&columns::ENROLLMENT)?,
            highest_score: row.opt_u32(&columns::HIGHEST_SCORE)?,
            lowest_score: row.opt_u32(&columns::LOWEST_SCORE)?,
            average_score: row.opt_f64(&columns::AVERAGE_SCORE)?,
            lowest_rank: row.opt_u32(&columns::LOWEST_RANK)?,
            average_rank: row.opt_u32(&columns::AVERAGE_RANK)?,
        })
    }

    fn university(&self) -> &str {
        &self.university
    }

    fn category(&self) -> Option<&str> {
        Some(&self.batch)
    }
}

impl Detailed for AdmissionDetailRecord {
    fn sort_rank(&self) -> Option<u32> {
        self.average_rank.or(self.lowest_rank)
    }
}

// ---------------------------------------------------------------------------
// AssessmentRecord – comprehensive-assessment track, one year, per major
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRecord {
    pub year: u16,
    pub university: String,
    pub group_code: String,
    pub group_name: String,
    pub major_name: String,
    pub enrollment: Option<u32>,
    pub highest_score: Option<u32>,
    pub lowest_score: Option<u32>,
    pub lowest_rank: Option<u32>,
    pub average_score: Option<f64>,
    pub average_rank: Option<u32>,
}

impl Record for AssessmentRecord {
    const REQUIRED: &'static [Field] = &[
        columns::YEAR,
        columns::UNIVERSITY,
        columns::MAJOR_NAME,
        columns::LOWEST_RANK,
    ];

    fn from_row(row: &Row<'_>) -> Result<Self, String> {
        Ok(Self {
            year: row.year(&columns::YEAR)?,
            university: row.text(&columns::UNIVERSITY)?,
            group_code: row.text_or_empty(&columns::GROUP_CODE),
            group_name: row.text_or_empty(&columns::GROUP_NAME),
            major_name: row.text_or_empty(&columns::MAJOR_NAME),
            enrollment: row.opt_u32(&columns::ENROLLMENT)?,
            highest_score: row.opt_u32(&columns::HIGHEST_SCORE)?,
            lowest_score: row.opt_u32(&columns::LOWEST_SCORE)?,
            lowest_rank: row.opt_u32(&columns::LOWEST_RANK)?,
            average_score: row.opt_f64(&columns::AVERAGE_SCORE)?,
            average_rank: row.opt_u32(&columns::AVERAGE_RANK)?,
        })
    }

    fn university(&self) -> &str {
        &self.university
    }

    fn year(&self) -> Option<u16> {
        Some(self.year)
    }

    fn category(&self) -> Option<&str> {
        Some(&self.group_name)
    }
}

impl Ranked for AssessmentRecord {
    fn partition(&self) -> u16 {
        self.year
    }

    fn rank(&self) -> Option<u32> {
        self.lowest_rank
    }
}

impl Detailed for AssessmentRecord {
    fn sort_rank(&self) -> Option<u32> {
        self.average_rank.or(self.lowest_rank)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Typed rows in file order with pre-computed selector values.
#[derive(Debug, Clone)]
pub struct Dataset<T> {
    pub source: PathBuf,
    pub rows: Vec<T>,
    /// Sorted, de-duplicated university names.
    pub universities: Vec<String>,
    /// Distinct years, newest first. Empty for single-year tables.
    pub years: Vec<u16>,
}

impl<T: Record> Dataset<T> {
    /// Build typed rows from a raw table, checking required columns first.
    pub fn from_table(table: &RawTable) -> Result<Self, LoadError> {
        for field in T::REQUIRED {
            if table.column_index(field).is_none() {
                return Err(LoadError::MissingColumn {
                    path: table.source.clone(),
                    column: field.name.to_string(),
                });
            }
        }

        let rows = (0..table.rows.len())
            .map(|i| {
                T::from_row(&table.row(i)).map_err(|message| LoadError::Parse {
                    path: table.source.clone(),
                    // 1-based data row, header excluded
                    row: i + 1,
                    message,
                })
            })
            .collect::<Result<Vec<T>, LoadError>>()?;

        Ok(Self::from_rows(&table.source, rows))
    }

    pub fn from_rows(source: &Path, rows: Vec<T>) -> Self {
        let universities: BTreeSet<&str> = rows.iter().map(|r| r.university()).collect();
        let years: BTreeSet<u16> = rows.iter().filter_map(|r| r.year()).collect();
        Self {
            source: source.to_path_buf(),
            universities: universities.into_iter().map(str::to_string).collect(),
            years: years.into_iter().rev().collect(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_university(&self, name: &str) -> bool {
        self.universities
            .binary_search_by(|u| u.as_str().cmp(name))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(columns: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut t = RawTable::new(Path::new("t.csv"), columns.iter().map(|c| c.to_string()).collect());
        t.rows = rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|c| {
                        if c.is_empty() {
                            CellValue::Null
                        } else {
                            CellValue::Text(c.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        t
    }

    #[test]
    fn chinese_headers_resolve_to_fields() {
        let t = raw(
            &["年份", "院校名称", "专业组代码", "专业组名称", "专业列表", "投档分数", "投档排位"],
            &[&["2024", "复旦大学", "01", "复旦大学01组", "数学;物理", "590", "1200"]],
        );
        let ds = Dataset::<AdmissionRecord>::from_table(&t).unwrap();
        let r = &ds.rows[0];
        assert_eq!(r.year, 2024);
        assert_eq!(r.group_code, "01");
        assert_eq!(r.rank, 1200);
        assert_eq!(ds.years, vec![2024]);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let t = raw(&["year", "university_name"], &[]);
        let err = Dataset::<AdmissionRecord>::from_table(&t).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "group_code"));
    }

    #[test]
    fn negative_rank_is_a_parse_error() {
        let t = raw(
            &["year", "university_name", "group_code", "group_name", "admission_score", "admission_rank"],
            &[&["2023", "A", "1", "g", "500", "-3"]],
        );
        let err = Dataset::<AdmissionRecord>::from_table(&t).unwrap_err();
        assert!(matches!(err, LoadError::Parse { row: 1, .. }));
    }

    #[test]
    fn blank_detail_numbers_are_none_and_floats_accepted() {
        let t = raw(
            &["university_name", "batch", "major_group_name", "major_name", "lowest_rank", "average_rank", "average_score"],
            &[&["A", "普通本科", "g1", "m1", "1500.0", "", "601.5"]],
        );
        let ds = Dataset::<AdmissionDetailRecord>::from_table(&t).unwrap();
        let r = &ds.rows[0];
        assert_eq!(r.lowest_rank, Some(1500));
        assert_eq!(r.average_rank, None);
        assert_eq!(r.sort_rank(), Some(1500));
        assert_eq!(r.average_score, Some(601.5));
    }

    #[test]
    fn universities_are_sorted_and_unique() {
        let rows = vec![
            AssessmentRecord {
                year: 2024,
                university: "B".into(),
                group_code: String::new(),
                group_name: String::new(),
                major_name: "x".into(),
                enrollment: None,
                highest_score: None,
                lowest_score: None,
                lowest_rank: Some(1),
                average_score: None,
                average_rank: None,
            };
            2
        ];
        let mut rows = rows;
        rows[1].university = "A".into();
        rows.push(rows[0].clone());
        let ds = Dataset::from_rows(Path::new("x"), rows);
        assert_eq!(ds.universities, vec!["A", "B"]);
        assert!(ds.contains_university("B"));
        assert!(!ds.contains_university("C"));
    }
}
