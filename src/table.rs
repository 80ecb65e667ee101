use crate::error::{Error, Result};
use crate::extract::PoolMetrics;
use std::path::{Path, PathBuf};

/// One unit of work: the row position plus the two cells that drive a lookup.
/// `index` is the only correlation key between scheduling and write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub index: usize,
    pub network: String,
    pub address: String,
}

impl Task {
    /// Blank rows are still scheduled so every row gets exactly one result;
    /// the job short-circuits them before any request is issued.
    pub fn is_blank(&self) -> bool {
        self.network.trim().is_empty() || self.address.trim().is_empty()
    }
}

/// CSV-backed table of (network, contract address) rows. The first column is
/// the network identifier, the second the contract address; anything beyond
/// that is carried through or replaced depending on the variant.
pub struct TokenTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TokenTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        log::info!("loaded {} rows from {}", rows.len(), path.display());
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Materializes the full task list in row order. Rows with missing cells
    /// are emitted with empty strings rather than skipped.
    pub fn tasks(&self) -> Vec<Task> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| Task {
                index,
                network: row.first().map(|c| c.trim().to_string()).unwrap_or_default(),
                address: row.get(1).map(|c| c.trim().to_string()).unwrap_or_default(),
            })
            .collect()
    }

    /// Replaces everything beyond the first two columns with the three metric
    /// columns. `rows` must be index-aligned with the table.
    pub fn apply_metrics(&mut self, results: Vec<PoolMetrics>) {
        self.headers.truncate(2);
        while self.headers.len() < 2 {
            self.headers.push(String::new());
        }
        self.headers.push("FDV".to_string());
        self.headers.push("Liquidity".to_string());
        self.headers.push("24h Volume".to_string());

        for (row, metrics) in self.rows.iter_mut().zip(results) {
            row.truncate(2);
            while row.len() < 2 {
                row.push(String::new());
            }
            row.push(metrics.fdv);
            row.push(metrics.liquidity);
            row.push(metrics.volume_24h);
        }
    }

    /// Appends (or overwrites) a `decimals` column, leaving other columns
    /// untouched. `values` must be index-aligned with the table.
    pub fn apply_decimals(&mut self, values: Vec<u32>) {
        let column = match self.headers.iter().position(|h| h == "decimals") {
            Some(pos) => pos,
            None => {
                self.headers.push("decimals".to_string());
                self.headers.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            while row.len() <= column {
                row.push(String::new());
            }
            row[column] = value.to_string();
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        log::info!("wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

/// Copies the pristine input aside before any result file is written.
/// Returns the backup path (`test.csv` -> `test_backup.csv`).
pub fn backup<P: AsRef<Path>>(input: P) -> Result<PathBuf> {
    let input = input.as_ref();
    let backup_path = derived_path(input, "_backup");
    std::fs::copy(input, &backup_path)?;
    log::info!("backup written to {}", backup_path.display());
    Ok(backup_path)
}

/// `test.csv` + `_result` -> `test_result.csv`, preserving the directory.
pub fn derived_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    match input.extension().and_then(|s| s.to_str()) {
        Some(ext) => input.with_file_name(format!("{stem}{suffix}.{ext}")),
        None => input.with_file_name(format!("{stem}{suffix}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn tasks_preserve_row_order_and_blanks() {
        let file = write_csv("network,address,notes\nethereum,0xabc,x\nbsc,,y\n,0xdef,z\n");
        let table = TokenTable::load(file.path()).unwrap();
        let tasks = table.tasks();

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].index, 0);
        assert_eq!(tasks[0].network, "ethereum");
        assert_eq!(tasks[0].address, "0xabc");
        assert!(!tasks[0].is_blank());
        assert!(tasks[1].is_blank());
        assert!(tasks[2].is_blank());
    }

    #[test]
    fn apply_metrics_replaces_extra_columns() {
        let file = write_csv("network,address,old1,old2\nethereum,0xabc,a,b\nbsc,0xdef,c,d\n");
        let mut table = TokenTable::load(file.path()).unwrap();

        table.apply_metrics(vec![
            PoolMetrics {
                fdv: "$1.2M".into(),
                liquidity: "$500K".into(),
                volume_24h: "$45.3K".into(),
            },
            PoolMetrics::zero(),
        ]);

        let out = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        table.save(out.path()).unwrap();

        let content = std::fs::read_to_string(out.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "network,address,FDV,Liquidity,24h Volume");
        assert_eq!(lines.next().unwrap(), "ethereum,0xabc,$1.2M,$500K,$45.3K");
        assert_eq!(lines.next().unwrap(), "bsc,0xdef,0,0,0");
    }

    #[test]
    fn apply_decimals_appends_column_and_keeps_extras() {
        let file = write_csv("network,address,notes\nethereum,0xabc,keep\n");
        let mut table = TokenTable::load(file.path()).unwrap();
        table.apply_decimals(vec![6]);

        let out = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        table.save(out.path()).unwrap();

        let content = std::fs::read_to_string(out.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "network,address,notes,decimals");
        assert_eq!(lines.next().unwrap(), "ethereum,0xabc,keep,6");
    }

    #[test]
    fn apply_decimals_overwrites_existing_column() {
        let file = write_csv("network,address,decimals\nethereum,0xabc,99\n");
        let mut table = TokenTable::load(file.path()).unwrap();
        table.apply_decimals(vec![18]);

        let out = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        table.save(out.path()).unwrap();

        let content = std::fs::read_to_string(out.path()).unwrap();
        assert!(content.contains("ethereum,0xabc,18"));
    }

    #[test]
    fn derived_path_inserts_suffix_before_extension() {
        assert_eq!(
            derived_path(Path::new("data/test.csv"), "_result"),
            PathBuf::from("data/test_result.csv")
        );
        assert_eq!(
            derived_path(Path::new("tokens"), "_backup"),
            PathBuf::from("tokens_backup")
        );
    }
}
