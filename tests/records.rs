use assert_matches::assert_matches;

use flagdeck::error::FlashError;
use flagdeck::records::RecordStore;

const FACTS: &str = "\
iso;country;capital;lang;country_cn;capital_cn;lang_cn;fact
FR;France;Paris;French;法国;巴黎;法语;Home of the 100% cotton T_shirt
ch;Switzerland;Bern;German, French ,Italian, Romansh;瑞士;伯尔尼;德语、法语;
;Nowhere;Nope;None;无;无;无;Should never appear
";

fn load(content: &str) -> RecordStore {
    RecordStore::from_reader(content.as_bytes()).unwrap()
}

#[test]
fn resolve_is_case_insensitive() {
    let store = load(FACTS);
    let upper = store.resolve("FR").unwrap();
    let lower = store.resolve("fr").unwrap();
    assert_eq!(upper, lower);
    assert_eq!(upper.name, "France");
    assert_eq!(upper.name_cn, "法国");
    assert!(store.resolve("Ch").is_some());
}

#[test]
fn rows_without_code_are_excluded() {
    let store = load(FACTS);
    assert_eq!(store.len(), 2);
    let codes: Vec<_> = store.codes().iter().map(|code| code.as_str()).collect();
    assert_eq!(codes, vec!["FR", "CH"]);
}

#[test]
fn languages_are_split_and_trimmed() {
    let store = load(FACTS);
    let swiss = store.resolve("ch").unwrap();
    assert_eq!(
        swiss.languages,
        vec!["German", "French", "Italian", "Romansh"]
    );
    assert_eq!(swiss.languages_cn, "德语、法语");
}

#[test]
fn missing_fields_get_placeholders() {
    let store = load("iso;country\nJP;Japan\nKR\n");
    let japan = store.resolve("jp").unwrap();
    assert_eq!(japan.name, "Japan");
    assert_eq!(japan.capital, "N/A");
    assert_eq!(japan.capital_cn, "N/A");
    assert_eq!(japan.languages, vec!["N/A"]);
    assert_eq!(japan.fact, "No fact this time :c");

    let korea = store.resolve("KR").unwrap();
    assert_eq!(korea.name, "N/A");
}

#[test]
fn empty_cells_are_kept_verbatim() {
    let store = load(FACTS);
    let swiss = store.resolve("CH").unwrap();
    assert_eq!(swiss.fact, "");
    assert_eq!(swiss.capital, "Bern");
}

#[test]
fn empty_language_cell_yields_one_empty_language() {
    let store = load("iso;country;lang;fact\nAD;Andorra;;\n");
    let andorra = store.resolve("ad").unwrap();
    assert_eq!(andorra.languages, vec![""]);
    assert_eq!(andorra.fact, "");
}

#[test]
fn duplicate_codes_keep_first_row() {
    let store = load("iso;country\nIT;Italy (first)\nES;Spain\nit;Italy (second)\n");
    let codes: Vec<_> = store.codes().iter().map(|code| code.as_str()).collect();
    assert_eq!(codes, vec!["IT", "ES"]);
    assert_eq!(store.resolve("it").unwrap().name, "Italy (first)");
    assert_eq!(store.resolve("IT").unwrap().name, "Italy (first)");
}

#[test]
fn invalid_codes_are_skipped() {
    let store = load("iso;country\n../etc;Escape\nPT;Portugal\n");
    assert_eq!(store.len(), 1);
    assert!(store.resolve("pt").is_some());
}

#[test]
fn unknown_code_resolves_to_none() {
    let store = load(FACTS);
    assert!(store.resolve("ZZ").is_none());
    assert!(store.resolve("").is_none());
}

#[test]
fn header_only_file_is_empty() {
    let store = load("iso;country\n");
    assert!(store.is_empty());
}

#[test]
fn missing_file_is_a_load_error() {
    let temp = tempfile::tempdir().unwrap();
    let err = RecordStore::load(&temp.path().join("facts.csv")).unwrap_err();
    assert_matches!(err, FlashError::CsvRead(_));
}

#[test]
fn invalid_utf8_is_a_parse_error() {
    let bytes: &[u8] = b"iso;country\nFR;Fr\xffnce\n";
    let err = RecordStore::from_reader(bytes).unwrap_err();
    assert_matches!(err, FlashError::CsvParse(_));
}
