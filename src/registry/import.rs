pub const IMPORTED_REASON: &str = "imported";
const EMAIL_HEADER: &str = "email";
const REASON_HEADER: &str = "reason";
const TIMESTAMP_HEADER: &str = "timestamp";

#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("The uploaded table could not be parsed.")]
    Parse(#[from] csv::Error),
    #[error("No column in the uploaded table looks like it holds email addresses.")]
    NoEmailColumn,
}

/// An externally supplied table, kept as plain text cells.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ImportTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        ImportTable { headers, rows }
    }

    /// Parses a CSV upload whose first line is the header row. Ragged rows are
    /// accepted; missing cells read as empty.
    pub fn from_csv(data: &[u8]) -> Result<Self, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data);
        let headers = reader.headers()?.iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|row| row.map(|row| row.iter().map(String::from).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn cell(row: &[String], column: usize) -> &str {
        row.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn find_header(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name))
    }

    fn non_empty_values(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| Self::cell(row, column).trim())
            .filter(|value| !value.is_empty())
    }

    pub fn reason_column(&self) -> Option<usize> {
        self.find_header(REASON_HEADER)
    }

    pub fn timestamp_column(&self) -> Option<usize> {
        self.find_header(TIMESTAMP_HEADER)
    }
}

/// Picks the column most likely to hold email addresses. Tried in order:
///
/// 1. a header named `email` (surrounding whitespace and ASCII case ignored);
/// 2. the first column with at least one value where every non-empty value
///    contains an "@";
/// 3. the first column where any non-empty value contains an "@".
///
/// The last step lets a column mixing addresses and junk still be imported; the
/// junk is dropped row by row.
pub fn detect_email_column(table: &ImportTable) -> Option<usize> {
    if let Some(column) = table.find_header(EMAIL_HEADER) {
        return Some(column);
    }

    let columns = 0..table.headers().len();

    columns
        .clone()
        .find(|&column| {
            let mut values = table.non_empty_values(column).peekable();
            values.peek().is_some() && values.all(looks_like_email)
        })
        .or_else(|| {
            columns
                .clone()
                .find(|&column| table.non_empty_values(column).any(looks_like_email))
        })
}

pub fn looks_like_email(value: &str) -> bool {
    value.contains('@')
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub column: String,
    pub added: usize,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
}
