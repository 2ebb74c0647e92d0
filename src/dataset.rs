use crate::error::DataLoadError;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns the source must provide, matched exactly.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Age", "Sex", "Race", "Ethnicity"];

/// Category substituted for empty categorical fields so counts stay
/// consistent with the record total.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// One row of the dataset. `age` is `None` when the Age field failed to
/// parse; the record still participates in every categorical aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRecord {
    pub age: Option<u32>,
    pub sex: String,
    pub race: String,
    pub ethnicity: String,
}

/// A field that failed to parse, recorded instead of aborting the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// 1-based data row index (header row not counted).
    pub row: usize,
    pub column: &'static str,
    pub value: String,
}

/// The loaded records plus every per-record parse issue encountered.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<SubjectRecord>,
    pub issues: Vec<ParseIssue>,
}

pub fn read_from_path(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = File::open(path)?;
    read_from_reader(file)
}

/// Read a CSV source into typed records. Fails only on unreadable input or
/// a wrong column set; an empty data section is legal and yields an empty
/// record sequence.
pub fn read_from_reader<R: Read>(reader: R) -> Result<Dataset, DataLoadError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let indices = locate_columns(&headers)?;

    let mut records = Vec::new();
    let mut issues = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let row = row_idx + 1;

        let age_str = record.get(indices[0]).unwrap_or("").trim();
        let age = match age_str.parse::<u32>() {
            Ok(age) => Some(age),
            Err(_) => {
                issues.push(ParseIssue {
                    row,
                    column: REQUIRED_COLUMNS[0],
                    value: age_str.to_string(),
                });
                None
            }
        };

        records.push(SubjectRecord {
            age,
            sex: categorical(record.get(indices[1])),
            race: categorical(record.get(indices[2])),
            ethnicity: categorical(record.get(indices[3])),
        });
    }

    Ok(Dataset { records, issues })
}

/// Resolve each required column to its index. Names are a hard contract:
/// exact, case-sensitive matches only.
fn locate_columns(headers: &[String]) -> Result<[usize; 4], DataLoadError> {
    let mut indices = [0usize; 4];
    for (slot, column) in REQUIRED_COLUMNS.iter().enumerate() {
        indices[slot] = headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DataLoadError::MissingColumn {
                column: column.to_string(),
                available: headers.join(", "),
            })?;
    }
    Ok(indices)
}

fn categorical(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN_CATEGORY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load(content: &str) -> Result<Dataset, DataLoadError> {
        read_from_reader(Cursor::new(content))
    }

    #[test]
    fn test_read_basic() {
        let dataset = load(
            "Age,Sex,Race,Ethnicity\n25,Male,A,Hispanic or Latino\n31,Female,B,Not Hispanic or Latino",
        )
        .unwrap();
        assert_eq!(dataset.records.len(), 2);
        assert!(dataset.issues.is_empty());
        assert_eq!(
            dataset.records[0],
            SubjectRecord {
                age: Some(25),
                sex: "Male".to_string(),
                race: "A".to_string(),
                ethnicity: "Hispanic or Latino".to_string(),
            }
        );
    }

    #[test]
    fn test_read_extra_columns_ignored() {
        let dataset = load("Id,Age,Sex,Race,Ethnicity\n7,40,Male,A,X\n").unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].age, Some(40));
    }

    #[test]
    fn test_read_empty_data_section() {
        // Headers only is legal: empty input flows through to the charts.
        let dataset = load("Age,Sex,Race,Ethnicity\n").unwrap();
        assert!(dataset.records.is_empty());
        assert!(dataset.issues.is_empty());
    }

    #[test]
    fn test_missing_column_fails() {
        let result = load("Age,Sex,Race\n25,Male,A\n");
        match result {
            Err(DataLoadError::MissingColumn { column, available }) => {
                assert_eq!(column, "Ethnicity");
                assert!(available.contains("Race"));
            }
            other => panic!("Expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_column_match_is_case_sensitive() {
        let result = load("age,Sex,Race,Ethnicity\n25,Male,A,X\n");
        assert!(matches!(
            result,
            Err(DataLoadError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_unparseable_age_recorded_not_dropped() {
        let dataset = load("Age,Sex,Race,Ethnicity\nunknown,Male,A,X\n31,Female,B,Y\n").unwrap();
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.records[0].age, None);
        assert_eq!(
            dataset.issues,
            vec![ParseIssue {
                row: 1,
                column: "Age",
                value: "unknown".to_string(),
            }]
        );
    }

    #[test]
    fn test_negative_age_is_an_issue() {
        let dataset = load("Age,Sex,Race,Ethnicity\n-3,Male,A,X\n").unwrap();
        assert_eq!(dataset.records[0].age, None);
        assert_eq!(dataset.issues.len(), 1);
    }

    #[test]
    fn test_empty_categoricals_become_unknown() {
        let dataset = load("Age,Sex,Race,Ethnicity\n25,, ,X\n").unwrap();
        assert_eq!(dataset.records[0].sex, UNKNOWN_CATEGORY);
        assert_eq!(dataset.records[0].race, UNKNOWN_CATEGORY);
        assert_eq!(dataset.records[0].ethnicity, "X");
    }

    #[test]
    fn test_malformed_csv_fails() {
        // Inconsistent field counts are a csv-level error.
        let result = load("Age,Sex,Race,Ethnicity\n25,Male\n");
        assert!(matches!(result, Err(DataLoadError::Csv(_))));
    }
}
