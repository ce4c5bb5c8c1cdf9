//! Tab-separated export of the raw ticker array.
//!
//! Columns: an unnamed index column, then every key seen across the records in
//! first-seen order. Strings are written as-is, numbers in their JSON form,
//! null or missing keys as empty cells, and nested values as compact JSON.

use super::ExportError;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Read the JSON array in `data_file` and write it as TSV to `output_file`.
///
/// Returns the number of data rows written.
pub fn export_csv(data_file: &Path, output_file: &Path) -> Result<usize, ExportError> {
    let content = fs::read_to_string(data_file).map_err(|source| ExportError::Io {
        path: data_file.to_path_buf(),
        source,
    })?;
    let doc: Value = serde_json::from_str(&content).map_err(|source| ExportError::Json {
        path: data_file.to_path_buf(),
        source,
    })?;

    let rows = doc.as_array().map_or(0, Vec::len);
    let tsv = export_tsv(&doc)?;
    fs::write(output_file, tsv).map_err(|source| ExportError::Io {
        path: output_file.to_path_buf(),
        source,
    })?;

    info!(path = %output_file.display(), rows, "wrote CSV export");
    Ok(rows)
}

/// Render a JSON array of objects as a tab-separated table.
pub fn export_tsv(doc: &Value) -> Result<String, ExportError> {
    let items = doc
        .as_array()
        .ok_or_else(|| ExportError::Shape("top-level JSON value is not an array".into()))?;

    let objects: Vec<&Map<String, Value>> = items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_object()
                .ok_or_else(|| ExportError::Shape(format!("element {i} is not an object")))
        })
        .collect::<Result<_, _>>()?;

    let mut columns: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for obj in &objects {
        for key in obj.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.as_str());
            }
        }
    }

    let mut wtr = ::csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(vec![]);

    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push("");
    header.extend(columns.iter().copied());
    wtr.write_record(&header)?;

    for (i, obj) in objects.iter().enumerate() {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(i.to_string());
        row.extend(columns.iter().map(|c| cell(obj.get(*c))));
        wtr.write_record(&row)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    String::from_utf8(data).map_err(|e| ExportError::Shape(format!("CSV output is not UTF-8: {e}")))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("tickerlab_csv_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn index_column_and_first_seen_key_order() {
        let doc = json!([
            {"id": "bitcoin", "price_usd": "1", "max_supply": "21000000"},
            {"id": "ethereum", "price_usd": 0.5, "max_supply": null, "rank": 2}
        ]);

        let tsv = export_tsv(&doc).unwrap();
        let lines: Vec<&str> = tsv.lines().collect();

        assert_eq!(lines[0], "\tid\tprice_usd\tmax_supply\trank");
        assert_eq!(lines[1], "0\tbitcoin\t1\t21000000\t");
        assert_eq!(lines[2], "1\tethereum\t0.5\t\t2");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn nested_values_are_compact_json() {
        let doc = json!([{"id": "x", "tags": ["a", "b"]}]);
        let tsv = export_tsv(&doc).unwrap();
        assert_eq!(tsv.lines().nth(1).unwrap(), "0\tx\t\"[\"\"a\"\",\"\"b\"\"]\"");
    }

    #[test]
    fn non_array_is_shape_error() {
        assert!(matches!(
            export_tsv(&json!({"id": "bitcoin"})),
            Err(ExportError::Shape(_))
        ));
        assert!(matches!(export_tsv(&json!([1])), Err(ExportError::Shape(_))));
    }

    #[test]
    fn export_csv_writes_file() {
        let dir = temp_dir();
        let data = dir.join("market_data.txt");
        let out = dir.join("market.csv");
        fs::write(&data, r#"[{"id":"bitcoin","price_usd":"1"},{"id":"ethereum","price_usd":"0.5"}]"#)
            .unwrap();

        let rows = export_csv(&data, &out).unwrap();
        assert_eq!(rows, 2);
        let written = fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("\tid\tprice_usd\n0\tbitcoin\t1\n"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_json_names_the_file() {
        let dir = temp_dir();
        let data = dir.join("market_data.txt");
        fs::write(&data, "not json").unwrap();

        let err = export_csv(&data, &dir.join("out.csv")).unwrap_err();
        assert!(matches!(err, ExportError::Json { .. }));
        assert!(err.to_string().contains("market_data.txt"));

        let _ = fs::remove_dir_all(&dir);
    }
}
