use std::fmt;
use std::str::FromStr;

use crate::error::FlashError;

pub const PLACEHOLDER: &str = "N/A";
pub const DEFAULT_FACT: &str = "No fact this time :c";

/// Country identifier used as the key for records, flags and cards.
///
/// Stored upper case so that lookups are case-insensitive; the lower-case
/// form is what ends up in URLs and file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CountryCode {
    type Err = FlashError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-');
        if !is_valid {
            return Err(FlashError::InvalidCountryCode(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRecord {
    pub code: CountryCode,
    pub name: String,
    pub name_cn: String,
    pub capital: String,
    pub capital_cn: String,
    pub languages: Vec<String>,
    pub languages_cn: String,
    pub fact: String,
}

/// Raw optional fields of one CSV row, before defaults are applied.
#[derive(Debug, Clone, Default)]
pub struct RecordFields {
    pub name: Option<String>,
    pub name_cn: Option<String>,
    pub capital: Option<String>,
    pub capital_cn: Option<String>,
    pub languages: Option<String>,
    pub languages_cn: Option<String>,
    pub fact: Option<String>,
}

impl CountryRecord {
    pub fn from_fields(code: CountryCode, fields: RecordFields) -> Self {
        let or_placeholder = |value: Option<String>| value.unwrap_or_else(|| PLACEHOLDER.into());
        let languages = fields
            .languages
            .as_deref()
            .unwrap_or(PLACEHOLDER)
            .split(',')
            .map(|lang| lang.trim().to_string())
            .collect();

        Self {
            code,
            name: or_placeholder(fields.name),
            name_cn: or_placeholder(fields.name_cn),
            capital: or_placeholder(fields.capital),
            capital_cn: or_placeholder(fields.capital_cn),
            languages,
            languages_cn: or_placeholder(fields.languages_cn),
            fact: fields.fact.unwrap_or_else(|| DEFAULT_FACT.into()),
        }
    }

    pub fn languages_joined(&self) -> String {
        self.languages.join(", ")
    }
}

/// One rendered card, already escaped and ready to be concatenated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFragment(String);

impl CardFragment {
    pub(crate) fn new(markup: String) -> Self {
        Self(markup)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_normalized() {
        let code: CountryCode = " fr ".parse().unwrap();
        assert_eq!(code.as_str(), "FR");
        assert_eq!(code.to_lowercase(), "fr");
    }

    #[test]
    fn subdivision_codes_are_accepted() {
        let code: CountryCode = "gb-sct".parse().unwrap();
        assert_eq!(code.to_lowercase(), "gb-sct");
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let record = CountryRecord::from_fields("de".parse().unwrap(), RecordFields::default());
        assert_eq!(record.capital, "N/A");
        assert_eq!(record.languages, vec!["N/A".to_string()]);
        assert_eq!(record.fact, "No fact this time :c");
    }
}
