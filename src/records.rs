use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::domain::{CountryCode, CountryRecord, RecordFields};
use crate::error::FlashError;

const CODE_COLUMN: &str = "iso";

/// Country facts parsed once from the CSV and indexed by normalized code.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    order: Vec<CountryCode>,
    records: HashMap<CountryCode, CountryRecord>,
}

impl RecordStore {
    pub fn load(path: &Path) -> Result<Self, FlashError> {
        let file = File::open(path).map_err(|_| FlashError::CsvRead(path.to_path_buf()))?;
        let store = Self::from_reader(file)?;
        debug!(path = %path.display(), countries = store.len(), "loaded facts CSV");
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FlashError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(reader);
        let columns = Columns::from_headers(
            reader
                .headers()
                .map_err(|err| FlashError::CsvParse(err.to_string()))?,
        );

        let mut store = Self::default();
        for row in reader.records() {
            let row = row.map_err(|err| FlashError::CsvParse(err.to_string()))?;
            let Some(raw_code) = columns
                .get(&row, CODE_COLUMN)
                .filter(|value| !value.trim().is_empty())
            else {
                continue;
            };
            let code = match raw_code.parse::<CountryCode>() {
                Ok(code) => code,
                Err(err) => {
                    warn!(line = row_line(&row), "skipping row: {err}");
                    continue;
                }
            };
            let record = CountryRecord::from_fields(code.clone(), columns.fields(&row));
            store.insert(code, record);
        }
        Ok(store)
    }

    /// The first row for a code wins; later duplicates are ignored.
    fn insert(&mut self, code: CountryCode, record: CountryRecord) {
        if let Entry::Vacant(slot) = self.records.entry(code) {
            self.order.push(slot.key().clone());
            slot.insert(record);
        } else {
            debug!(code = %record.code, "ignoring duplicate row");
        }
    }

    /// Codes in the order they first appear in the CSV.
    pub fn codes(&self) -> &[CountryCode] {
        &self.order
    }

    pub fn resolve(&self, code: &str) -> Option<&CountryRecord> {
        let code = code.parse::<CountryCode>().ok()?;
        self.records.get(&code)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(position, name)| {
                let name = name.trim_start_matches('\u{feff}').trim().to_string();
                (name, position)
            })
            .collect();
        Self { index }
    }

    /// Field value for `column`; `None` when the column is missing or the
    /// row is too short to reach it. Empty cells are returned as they are.
    fn get<'r>(&self, row: &'r StringRecord, column: &str) -> Option<&'r str> {
        let position = *self.index.get(column)?;
        row.get(position)
    }

    fn fields(&self, row: &StringRecord) -> RecordFields {
        let owned = |column: &str| self.get(row, column).map(str::to_string);
        RecordFields {
            name: owned("country"),
            name_cn: owned("country_cn"),
            capital: owned("capital"),
            capital_cn: owned("capital_cn"),
            languages: owned("lang"),
            languages_cn: owned("lang_cn"),
            fact: owned("fact"),
        }
    }
}

fn row_line(row: &StringRecord) -> u64 {
    row.position().map(|pos| pos.line()).unwrap_or_default()
}
