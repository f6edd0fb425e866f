mod clean;
mod output;

pub use clean::{clean_word, tokenize_ipa};
pub use output::{write_alignments, write_groups};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use csv::StringRecord;
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use tracing::{info, warn};

use libcognate::structs::{CognateGroup, Symbol, WordForm};

use crate::args::{InputArgs, ReaderFormat};

#[derive(Error, Debug)]
#[error("no column named \"{column}\" in the data file header")]
pub struct MissingColumnError {
    column: String,
}

#[derive(Error, Debug)]
#[error("record {record} has no field {field}")]
pub struct MissingFieldError {
    record: usize,
    field: usize,
}

#[derive(Error, Debug)]
#[error("the {format:?} reader only supports ASJP transcriptions, found \"{transcription}\"")]
pub struct UnsupportedTranscriptionError {
    format: ReaderFormat,
    transcription: String,
}

/// The transcription convention selected for reading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transcription {
    Asjp,
    Ipa,
    Column(String),
}

impl From<&str> for Transcription {
    fn from(name: &str) -> Self {
        match name {
            "ASJP" => Transcription::Asjp,
            "IPA" => Transcription::Ipa,
            other => Transcription::Column(other.to_string()),
        }
    }
}

/// Where a form's symbols come from and how they are split.
#[derive(Clone, Copy, Debug)]
enum FormSource {
    /// A cleaned ASJP string, one symbol per character.
    Asjp(usize),
    /// A cleaned IPA string split into segments.
    Ipa(usize),
    /// Any other column, one symbol per character.
    Raw(usize),
}

impl FormSource {
    fn symbols(&self, record: &StringRecord) -> Vec<Symbol> {
        match *self {
            FormSource::Asjp(idx) => Symbol::from_chars(&clean_word(record.get(idx).unwrap_or(""))),
            FormSource::Ipa(idx) => tokenize_ipa(&clean_word(record.get(idx).unwrap_or(""))),
            FormSource::Raw(idx) => Symbol::from_chars(record.get(idx).unwrap_or("")),
        }
    }
}

/// Cognate classes are keyed by id alone, or by id and concept when ids are
/// only unique within a concept.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CognateKey {
    Global(String),
    PerConcept { cogid: String, concept: String },
}

/// A word list: forms grouped by concept, plus the expert cognate classes.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub forms_by_concept: IndexMap<String, Vec<WordForm>>,
    pub cognate_classes: IndexMap<CognateKey, CognateGroup>,
    pub languages: IndexSet<String>,
    pub symbols: IndexSet<Symbol>,
}

impl Dataset {
    fn add(&mut self, form: WordForm, cogid: &str, cross_semantic_cogids: bool) {
        if form.is_empty() {
            return;
        }

        self.symbols.extend(form.symbols.iter().cloned());
        self.languages.insert(form.language.clone());

        let key = if cross_semantic_cogids {
            CognateKey::Global(cogid.to_string())
        } else {
            CognateKey::PerConcept {
                cogid: cogid.to_string(),
                concept: form.concept.clone(),
            }
        };
        self.cognate_classes
            .entry(key)
            .or_default()
            .insert(form.clone());

        self.forms_by_concept
            .entry(form.concept.clone())
            .or_default()
            .push(form);
    }

    /// Every form, concept by concept.
    pub fn forms(&self) -> impl Iterator<Item = &WordForm> {
        self.forms_by_concept.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.forms_by_concept.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn require_column(headers: &StringRecord, name: &str) -> anyhow::Result<usize> {
    column_index(headers, name).ok_or_else(|| {
        MissingColumnError {
            column: name.to_string(),
        }
        .into()
    })
}

fn form_source(headers: &StringRecord, transcription: &Transcription) -> anyhow::Result<FormSource> {
    match transcription {
        Transcription::Asjp => match column_index(headers, "ASJP") {
            Some(idx) => Ok(FormSource::Asjp(idx)),
            None => {
                warn!("no ASJP column, reading the IPA column character by character");
                Ok(FormSource::Asjp(require_column(headers, "IPA")?))
            }
        },
        Transcription::Ipa => Ok(FormSource::Ipa(require_column(headers, "IPA")?)),
        Transcription::Column(name) => Ok(FormSource::Raw(require_column(headers, name)?)),
    }
}

fn field<'r>(record: &'r StringRecord, record_idx: usize, field: usize) -> anyhow::Result<&'r str> {
    record.get(field).ok_or_else(|| {
        MissingFieldError {
            record: record_idx,
            field,
        }
        .into()
    })
}

/// Read a word list in the given format.
pub fn read_dataset(
    reader: impl Read,
    format: ReaderFormat,
    delimiter: u8,
    transcription: &Transcription,
    cross_semantic_cogids: bool,
) -> anyhow::Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .quoting(format != ReaderFormat::Ielex)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("failed to read data file header")?
        .clone();

    let mut dataset = Dataset::default();

    match format {
        ReaderFormat::Ielex => {
            if *transcription != Transcription::Asjp {
                return Err(UnsupportedTranscriptionError {
                    format,
                    transcription: format!("{transcription:?}"),
                }
                .into());
            }

            for (record_idx, record) in csv_reader.records().enumerate() {
                let record = record.context("failed to read data record")?;
                let language = field(&record, record_idx, 0)?.trim();
                let concept = field(&record, record_idx, 2)?.trim();
                let variants = field(&record, record_idx, 5)?;
                let cogid = field(&record, record_idx, 6)?.replace(['-', '?'], "");

                let first_variant = variants.split(',').next().unwrap_or("");
                let symbols = Symbol::from_chars(&clean_word(first_variant));
                dataset.add(
                    WordForm::new(language, concept, symbols),
                    cogid.trim(),
                    cross_semantic_cogids,
                );
            }
        }
        ReaderFormat::Cldf | ReaderFormat::Lingpy => {
            let (language_idx, concept_idx, cogid_idx) = match format {
                ReaderFormat::Cldf => (
                    require_column(&headers, "Language ID")?,
                    require_column(&headers, "Feature ID")?,
                    require_column(&headers, "Cognate Class")?,
                ),
                _ => (
                    match column_index(&headers, "DOCULECT_ID") {
                        Some(idx) => idx,
                        None => require_column(&headers, "DOCULECT")?,
                    },
                    require_column(&headers, "CONCEPT")?,
                    require_column(&headers, "COGID")?,
                ),
            };
            let source = form_source(&headers, transcription)?;

            for (record_idx, record) in csv_reader.records().enumerate() {
                let record = record.context("failed to read data record")?;
                let language = field(&record, record_idx, language_idx)?;
                let concept = field(&record, record_idx, concept_idx)?;
                let cogid = field(&record, record_idx, cogid_idx)?;

                dataset.add(
                    WordForm::new(language, concept, source.symbols(&record)),
                    cogid,
                    cross_semantic_cogids,
                );
            }
        }
    }

    Ok(dataset)
}

/// Read the word list named by the input arguments. Files ending in `.csv`
/// are comma-separated, anything else tab-separated.
pub fn load_dataset(args: &InputArgs) -> anyhow::Result<Dataset> {
    let path: &Path = &args.data_path;
    let file = File::open(path).context(format!(
        "failed to open data file: {}",
        path.to_string_lossy()
    ))?;

    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => b',',
        _ => b'\t',
    };
    let cross_semantic_cogids = args
        .cross_semantic_cogids
        .unwrap_or_else(|| args.reader.cross_semantic_cogids());

    let dataset = read_dataset(
        file,
        args.reader,
        delimiter,
        &Transcription::from(args.transcription.as_str()),
        cross_semantic_cogids,
    )
    .context(format!(
        "failed to read data file: {}",
        path.to_string_lossy()
    ))?;

    info!(
        forms = dataset.len(),
        concepts = dataset.forms_by_concept.len(),
        languages = dataset.languages.len(),
        symbols = dataset.symbols.len(),
        cognate_classes = dataset.cognate_classes.len(),
        "read word list"
    );
    Ok(dataset)
}
