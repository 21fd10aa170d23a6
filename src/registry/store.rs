use std::fs;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::StorageSettings;
use crate::domain::unsubscribe_record::{StoredRecord, UnsubscribeRecord};

pub const CSV_HEADER: [&str; 3] = ["email", "reason", "timestamp"];
const HOME_PREFIX: &str = "~/";
const TMP_PREFIX: &str = "{tmp}";

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Failed to access {}.", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to process tabular records at {}.", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to process structured records at {}.", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single location holding the whole record set.
pub trait RecordStore: Send + Sync {
    fn read_all(&self) -> Result<Vec<UnsubscribeRecord>, StorageError>;
    fn write_all(&self, records: &[UnsubscribeRecord]) -> Result<(), StorageError>;
    fn location(&self) -> &Path;
    fn format(&self) -> StorageFormat;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormat {
    Csv,
    Json,
}

impl AsRef<str> for StorageFormat {
    fn as_ref(&self) -> &str {
        match self {
            StorageFormat::Csv => "csv",
            StorageFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    pub path: PathBuf,
    pub format: StorageFormat,
}

impl StorageLocation {
    pub fn from_path(path: PathBuf) -> StorageLocation {
        let format = match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("json") => StorageFormat::Json,
            _ => StorageFormat::Csv,
        };

        StorageLocation { path, format }
    }

    /// Expands `~/` to the user's home directory and `{tmp}` to the system temp
    /// directory. Returns `None` when the home directory is unknown.
    pub fn resolve(raw: &str) -> Option<StorageLocation> {
        let raw = raw.trim();

        let path = if let Some(rest) = raw.strip_prefix(HOME_PREFIX) {
            dirs::home_dir()?.join(rest)
        } else if let Some(rest) = raw.strip_prefix(TMP_PREFIX) {
            std::env::temp_dir().join(rest.trim_start_matches(|c: char| c == '/' || c == '\\'))
        } else {
            PathBuf::from(raw)
        };

        Some(Self::from_path(path))
    }

    pub fn open(self) -> Box<dyn RecordStore> {
        match self.format {
            StorageFormat::Csv => Box::new(CsvFileStore::new(self.path)),
            StorageFormat::Json => Box::new(JsonFileStore::new(self.path)),
        }
    }
}

pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: PathBuf) -> Self {
        CsvFileStore { path }
    }
}

impl RecordStore for CsvFileStore {
    fn read_all(&self) -> Result<Vec<UnsubscribeRecord>, StorageError> {
        let file = fs::File::open(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        decode_csv(BufReader::new(file)).map_err(|source| StorageError::Csv {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, records: &[UnsubscribeRecord]) -> Result<(), StorageError> {
        let mut buffer = Vec::new();

        encode_csv(records, &mut buffer).map_err(|source| StorageError::Csv {
            path: self.path.clone(),
            source,
        })?;

        write_file(&self.path, &buffer)
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> StorageFormat {
        StorageFormat::Csv
    }
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        JsonFileStore { path }
    }
}

impl RecordStore for JsonFileStore {
    fn read_all(&self) -> Result<Vec<UnsubscribeRecord>, StorageError> {
        let file = fs::File::open(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        let rows: Vec<StoredRecord> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                StorageError::Json {
                    path: self.path.clone(),
                    source,
                }
            })?;

        Ok(into_records(rows))
    }

    fn write_all(&self, records: &[UnsubscribeRecord]) -> Result<(), StorageError> {
        let buffer = serde_json::to_vec_pretty(records).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;

        write_file(&self.path, &buffer)
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> StorageFormat {
        StorageFormat::Json
    }
}

/// Outcome of a write that reached the primary store. Fallback failures are kept
/// here instead of failing the write.
#[derive(Debug, Default)]
pub struct PersistReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<StorageError>,
}

/// An ordered list of stores mirroring the same record set. The primary is
/// authoritative for writes; reads fall through every location in order.
pub struct ReplicatedStore {
    primary: Box<dyn RecordStore>,
    fallbacks: Vec<Box<dyn RecordStore>>,
}

impl ReplicatedStore {
    pub fn new(primary: Box<dyn RecordStore>, fallbacks: Vec<Box<dyn RecordStore>>) -> Self {
        ReplicatedStore { primary, fallbacks }
    }

    pub fn from_settings(settings: &StorageSettings) -> Self {
        let primary = StorageLocation::resolve(&settings.primary)
            .unwrap_or_else(|| StorageLocation::from_path(PathBuf::from(&settings.primary)));
        let fallbacks = settings
            .fallbacks
            .iter()
            .filter_map(|raw| {
                let location = StorageLocation::resolve(raw);
                if location.is_none() {
                    tracing::warn!("Skipping storage location {}: no home directory", raw);
                }
                location
            })
            .map(StorageLocation::open)
            .collect();

        Self::new(primary.open(), fallbacks)
    }

    pub fn locations(&self) -> impl Iterator<Item = &(dyn RecordStore + 'static)> {
        std::iter::once(self.primary.as_ref()).chain(self.fallbacks.iter().map(|s| s.as_ref()))
    }

    /// Returns the first non-empty record set found, or an empty one.
    #[tracing::instrument(name = "Read unsubscribe records", skip(self))]
    pub fn read_first(&self) -> Vec<UnsubscribeRecord> {
        for store in self.locations() {
            match store.read_all() {
                Ok(records) if !records.is_empty() => {
                    tracing::debug!(
                        "Loaded {} records from {}",
                        records.len(),
                        store.location().display()
                    );
                    return records;
                }
                Ok(_) => {
                    tracing::debug!("No records in {}", store.location().display());
                }
                Err(err) => {
                    tracing::debug!("Skipping unreadable store: {}", err);
                }
            }
        }

        Vec::new()
    }

    #[tracing::instrument(name = "Write unsubscribe records", skip(self, records), fields(count = records.len()))]
    pub fn write_all(&self, records: &[UnsubscribeRecord]) -> Result<PersistReport, StorageError> {
        let primary = self.primary.write_all(records);
        let mut report = PersistReport::default();

        for store in &self.fallbacks {
            match store.write_all(records) {
                Ok(()) => report.written.push(store.location().to_path_buf()),
                Err(err) => {
                    tracing::warn!("Failed to mirror records: {:?}", err);
                    report.failures.push(err);
                }
            }
        }

        primary?;
        report.written.insert(0, self.primary.location().to_path_buf());

        Ok(report)
    }
}

pub fn encode_csv<W: Write>(records: &[UnsubscribeRecord], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([
            record.email.as_ref(),
            record.reason.as_str(),
            record.timestamp.as_str(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

/// Rows that fail to parse or lack an "@" are skipped.
pub fn decode_csv<R: Read>(reader: R) -> Result<Vec<UnsubscribeRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();

    for row in reader.deserialize::<StoredRecord>() {
        match row {
            Ok(row) => rows.push(row),
            Err(err) if err.is_io_error() => return Err(err),
            Err(err) => tracing::warn!("Skipping malformed row: {}", err),
        }
    }

    Ok(into_records(rows))
}

fn into_records(rows: Vec<StoredRecord>) -> Vec<UnsubscribeRecord> {
    rows.into_iter()
        .filter_map(|row| match UnsubscribeRecord::try_from(row) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!("Skipping stored row: {}", err);
                None
            }
        })
        .collect()
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let io_error = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(io_error)?;
            parent
        }
        None => Path::new("."),
    };

    // Staged next to the target and renamed over it: readers see the old file or the new one
    let mut staged = tempfile::NamedTempFile::new_in(parent).map_err(io_error)?;
    staged.write_all(contents).map_err(io_error)?;
    staged.as_file().sync_all().map_err(io_error)?;
    staged.persist(path).map_err(|err| io_error(err.error))?;

    Ok(())
}
