use std::fs::File;

use camino::Utf8Path;
use csv::{ReaderBuilder, Trim};
use tracing::info;

use crate::domain::SourceRecord;
use crate::error::HarvestError;

/// Loads the user roster from a CSV file with a header row.
///
/// A file that cannot be opened yields [`HarvestError::MissingInput`]; the
/// caller is expected to stop the run without doing any further work. A
/// header without an `id` column, or an `id` that is not an integer, yields
/// [`HarvestError::SourceFormat`].
pub fn load_records(path: &Utf8Path) -> Result<Vec<SourceRecord>, HarvestError> {
    let file = File::open(path.as_std_path())
        .map_err(|_| HarvestError::MissingInput(path.to_path_buf()))?;
    let records = read_records(file)?;
    info!("loaded {} records from {path}", records.len());
    Ok(records)
}

pub fn read_records<R: std::io::Read>(input: R) -> Result<Vec<SourceRecord>, HarvestError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(input);

    let headers = reader
        .headers()
        .map_err(|err| HarvestError::SourceFormat(err.to_string()))?;
    if !headers.iter().any(|header| header == "id") {
        return Err(HarvestError::SourceFormat(
            "header row has no `id` column".to_string(),
        ));
    }

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<SourceRecord>().enumerate() {
        // Data rows start on line 2, after the header.
        let record = result.map_err(|err| {
            HarvestError::SourceFormat(format!("line {}: {err}", index + 2))
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn reads_rows_in_file_order() {
        let data = "id,name,username,email\n\
                    2,Jane Smith,janesmith,jane@example.com\n\
                    1,John Doe,johndoe,john@example.com\n";
        let records = read_records(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 2);
        assert_eq!(records[0].username.as_deref(), Some("janesmith"));
        assert_eq!(records[1].id, 1);
    }

    #[test]
    fn id_only_roster_is_enough() {
        let records = read_records("id\n7\n8\n".as_bytes()).unwrap();
        assert_eq!(records, vec![SourceRecord::new(7), SourceRecord::new(8)]);
    }

    #[test]
    fn missing_id_column_is_rejected() {
        let result = read_records("name,email\nJohn,john@example.com\n".as_bytes());
        assert_matches!(result, Err(HarvestError::SourceFormat(_)));
    }

    #[test]
    fn non_integer_id_reports_line() {
        let result = read_records("id,name\n1,John\nabc,Jane\n".as_bytes());
        assert_matches!(result, Err(HarvestError::SourceFormat(message)) if message.contains("line 3"));
    }
}
