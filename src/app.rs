use std::path::Path;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::domain::{CardFragment, CountryCode};
use crate::error::FlashError;
use crate::flags::{FlagClient, FlagFetcher, FlagOutcome};
use crate::latex::{DocumentTemplate, render_card};
use crate::records::RecordStore;

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// What happened to one country during a run.
#[derive(Debug)]
pub enum UnitReport {
    Generated {
        code: CountryCode,
        name: String,
        flag: FlagOutcome,
    },
    Missing {
        code: CountryCode,
    },
}

impl UnitReport {
    pub fn code(&self) -> &CountryCode {
        match self {
            UnitReport::Generated { code, .. } | UnitReport::Missing { code } => code,
        }
    }
}

#[derive(Debug)]
pub enum DocumentOutcome {
    Written { path: Utf8PathBuf },
    NoCountries,
    WriteFailed { path: Utf8PathBuf, error: FlashError },
}

#[derive(Debug)]
pub struct GenerateResult {
    pub reports: Vec<UnitReport>,
    pub card_count: usize,
    pub document: DocumentOutcome,
}

impl GenerateResult {
    pub fn summary(&self) -> GenerateSummary {
        let (output_path, written, write_error) = match &self.document {
            DocumentOutcome::Written { path } => (Some(path.to_string()), true, None),
            DocumentOutcome::NoCountries => (None, false, None),
            DocumentOutcome::WriteFailed { path, error } => {
                (Some(path.to_string()), false, Some(error.to_string()))
            }
        };
        GenerateSummary {
            cards: self.card_count,
            output_path,
            written,
            write_error,
            load_error: None,
            countries: self.reports.iter().map(CountrySummary::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateSummary {
    pub cards: usize,
    pub output_path: Option<String>,
    pub written: bool,
    pub write_error: Option<String>,
    pub load_error: Option<String>,
    pub countries: Vec<CountrySummary>,
}

impl GenerateSummary {
    /// Summary of a run that stopped because the facts could not be loaded.
    pub fn load_failed(error: &FlashError) -> Self {
        Self {
            cards: 0,
            output_path: None,
            written: false,
            write_error: None,
            load_error: Some(error.to_string()),
            countries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CountrySummary {
    pub code: String,
    pub card: bool,
    pub flag: String,
    pub flag_error: Option<String>,
}

impl From<&UnitReport> for CountrySummary {
    fn from(report: &UnitReport) -> Self {
        let code = report.code().to_string();
        match report {
            UnitReport::Missing { .. } => Self {
                code,
                card: false,
                flag: "skipped".to_string(),
                flag_error: None,
            },
            UnitReport::Generated { flag, .. } => {
                let (status, error) = match flag {
                    FlagOutcome::Saved { .. } => ("saved", None),
                    FlagOutcome::Failed { error } => ("failed", Some(error.to_string())),
                    FlagOutcome::TimedOut { after } => {
                        ("timeout", Some(format!("timed out after {after:?}")))
                    }
                };
                Self {
                    code,
                    card: true,
                    flag: status.to_string(),
                    flag_error: error,
                }
            }
        }
    }
}

pub struct App<C: FlagClient> {
    fetcher: FlagFetcher<C>,
    template: DocumentTemplate,
}

impl<C: FlagClient> App<C> {
    pub fn new(fetcher: FlagFetcher<C>, template: DocumentTemplate) -> Self {
        Self { fetcher, template }
    }

    pub async fn generate_from_path(
        &self,
        csv_path: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<GenerateResult, FlashError> {
        let records = RecordStore::load(csv_path)?;
        Ok(self.generate(&records, sink).await)
    }

    /// Runs every country concurrently, waits for all of them, then writes
    /// the deck. Cards keep the order of `records`.
    pub async fn generate(
        &self,
        records: &RecordStore,
        sink: &dyn ProgressSink,
    ) -> GenerateResult {
        let started = Instant::now();
        if records.is_empty() {
            info!("no countries to render");
            sink.event(ProgressEvent {
                message: "No countries found in CSV".to_string(),
                elapsed: None,
            });
            return GenerateResult {
                reports: Vec::new(),
                card_count: 0,
                document: DocumentOutcome::NoCountries,
            };
        }

        debug!(countries = records.len(), "dispatching");
        let units = records
            .codes()
            .iter()
            .map(|code| self.process_country(records, code));
        let results = join_all(units).await;

        let mut reports = Vec::with_capacity(results.len());
        let mut fragments = Vec::new();
        for (report, fragment) in results {
            report_unit(&report, sink);
            fragments.extend(fragment);
            reports.push(report);
        }

        let document = self.template.assemble(&fragments);
        let store = self.fetcher.store();
        let path = store.output_path().to_path_buf();
        let document = match store.write_document(&document) {
            Ok(()) => {
                info!(cards = fragments.len(), path = %path, "deck written");
                sink.event(ProgressEvent {
                    message: format!("Generated {} flashcards in {path}", fragments.len()),
                    elapsed: Some(started.elapsed()),
                });
                DocumentOutcome::Written { path }
            }
            Err(error) => {
                error!(path = %path, "failed to write deck: {error}");
                sink.event(ProgressEvent {
                    message: format!("Error writing LaTeX file: {error}"),
                    elapsed: Some(started.elapsed()),
                });
                DocumentOutcome::WriteFailed { path, error }
            }
        };

        GenerateResult {
            reports,
            card_count: fragments.len(),
            document,
        }
    }

    async fn process_country(
        &self,
        records: &RecordStore,
        code: &CountryCode,
    ) -> (UnitReport, Option<CardFragment>) {
        let Some(record) = records.resolve(code.as_str()) else {
            return (UnitReport::Missing { code: code.clone() }, None);
        };

        let flag = self.fetcher.save(code).await;
        let image = self.fetcher.store().flag_reference(code);
        let fragment = render_card(record, &image);

        let report = UnitReport::Generated {
            code: code.clone(),
            name: record.name.clone(),
            flag,
        };
        (report, Some(fragment))
    }
}

fn report_unit(report: &UnitReport, sink: &dyn ProgressSink) {
    let emit = |message: String| {
        sink.event(ProgressEvent {
            message,
            elapsed: None,
        })
    };
    match report {
        UnitReport::Missing { code } => emit(format!("No facts found for {code}")),
        UnitReport::Generated { code, name, flag } => {
            match flag {
                FlagOutcome::Saved { .. } => {}
                FlagOutcome::Failed {
                    error: FlashError::FlagStatus { status, .. },
                } => emit(format!("Failed to download flag for {code}: {status}")),
                FlagOutcome::Failed { error } => {
                    emit(format!("Error downloading flag for {code}: {error}"))
                }
                FlagOutcome::TimedOut { after } => emit(format!(
                    "Error downloading flag for {code}: timed out after {after:?}"
                )),
            }
            emit(format!("Generated flashcard for {name}"));
        }
    }
}
