// Primitives for reading CSV files of pairwise votes.

use crate::scrank::*;

/// The number of fields of a line, for each provider.
pub fn provider_arity(provider: &str) -> ScrankResult<usize> {
    match provider {
        "pairwise" => Ok(3),
        "pairwise_voters" => Ok(4),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// Reads the raw vote records of a file: `a,b,outcome` or `a,b,outcome,voter`.
///
/// The fields are trimmed and the empty lines are skipped.
pub fn read_pairwise_records(path: &str, cfs: &FileSource) -> ScrankResult<Vec<Vec<String>>> {
    let arity = provider_arity(cfs.provider.as_str())?;
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut res: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate().skip(first_row) {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        if line.iter().all(|s| s.is_empty()) {
            continue;
        }
        if line.len() != arity {
            return CsvLineAritySnafu {
                lineno,
                expected: arity,
                found: line.len(),
            }
            .fail();
        }
        let record: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        debug!("read_pairwise_records: lineno: {:?} record: {:?}", lineno, record);
        res.push(record);
    }
    info!(
        "read_pairwise_records: {}: {} votes",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_path(name: &str) -> String {
        format!("{}/testdata/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn read_with_voters() {
        let path = test_path("dogs/dogs_votes.csv");
        let records =
            read_pairwise_records(&path, &FileSource::new("pairwise_voters", &path)).unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.len() == 4));
        assert_eq!(records[0][2], "win");
    }

    #[test]
    fn wrong_arity() {
        let path = test_path("dogs/dogs_votes.csv");
        let res = read_pairwise_records(&path, &FileSource::new("pairwise", &path));
        assert!(matches!(
            res,
            Err(ScrankError::CsvLineArity {
                lineno: 1,
                expected: 3,
                found: 4
            })
        ));
    }

    #[test]
    fn unknown_provider() {
        assert!(provider_arity("xlsx").is_err());
    }

    #[test]
    fn missing_file() {
        let path = test_path("dogs/missing.csv");
        let res = read_pairwise_records(&path, &FileSource::new("pairwise", &path));
        assert!(matches!(res, Err(ScrankError::CsvOpen { .. })));
    }
}
