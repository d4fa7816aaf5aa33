// Timeline data model - instruments and their legally-effective versions
// Identity persists (instrument-id), values change (one Version per period)

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::natural::natural_cmp;

// ============================================================================
// INSTRUMENT TYPE
// ============================================================================

/// The kind of legal instrument a record describes.
///
/// Deliveries carry this as a free-text field; only two values are
/// meaningful for ordering and display. Anything else is preserved verbatim
/// so labels can still show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstrumentType {
    /// A regulation ("regeling")
    Regeling,
    /// An attachment ("informatie-object")
    InformatieObject,
    /// Missing or empty in the delivery
    Onbekend,
    /// Any other non-empty value, kept as delivered
    Other(String),
}

impl InstrumentType {
    /// Parse a delivered type value. Missing and empty collapse to unknown.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => InstrumentType::Onbekend,
            Some("regeling") => InstrumentType::Regeling,
            Some("informatie-object") => InstrumentType::InformatieObject,
            Some(other) => InstrumentType::Other(other.to_string()),
        }
    }

    /// Wire value, as it appears in deliveries.
    pub fn as_str(&self) -> &str {
        match self {
            InstrumentType::Regeling => "regeling",
            InstrumentType::InformatieObject => "informatie-object",
            InstrumentType::Onbekend => "onbekend",
            InstrumentType::Other(s) => s,
        }
    }

    /// Sort weight: regulations first, attachments second, everything else
    /// last. Lower weight also wins type conflicts when documents disagree
    /// about the same instrument.
    pub fn weight(&self) -> u8 {
        match self {
            InstrumentType::Regeling => 0,
            InstrumentType::InformatieObject => 1,
            InstrumentType::Onbekend | InstrumentType::Other(_) => 2,
        }
    }

    /// Human-readable label used in display names.
    pub fn label(&self) -> String {
        match self {
            InstrumentType::Regeling => "Regulation".to_string(),
            InstrumentType::InformatieObject => "Attachment".to_string(),
            InstrumentType::Onbekend => capitalize("onbekend"),
            InstrumentType::Other(s) => capitalize(s),
        }
    }
}

impl From<String> for InstrumentType {
    fn from(s: String) -> Self {
        InstrumentType::parse(Some(&s))
    }
}

impl From<InstrumentType> for String {
    fn from(t: InstrumentType) -> Self {
        t.as_str().to_string()
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ============================================================================
// VERSION
// ============================================================================

/// Merge identity of a version across documents.
///
/// Two documents describing the same legal version of the same instrument
/// produce the same key; the later-processed record supersedes the earlier
/// one. This is NOT display identity - `versionId` may differ between reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionKey {
    pub instrument_id: String,
    pub version_number: Option<i64>,
    pub valid_from: NaiveDate,
}

/// One legally-effective period of an instrument.
///
/// `valid_from` is required: a record without a parsable start date cannot
/// be placed on a timeline and never enters the model. `valid_to` of `None`
/// means the version is open-ended (still in force).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub instrument_id: String,
    pub instrument_type: InstrumentType,
    pub version_number: Option<i64>,
    pub version_id: Option<String>,
    pub publication_id: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
    pub on_timeline: bool,
    pub status: Option<String>,
    pub operation: String,
    pub supply_time: Option<NaiveDateTime>,
}

impl Version {
    /// Derive the merge key from the identity-bearing fields.
    pub fn key(&self) -> VersionKey {
        VersionKey {
            instrument_id: self.instrument_id.clone(),
            version_number: self.version_number,
            valid_from: self.valid_from,
        }
    }

    /// Whether the version has no effective end date.
    pub fn is_open_ended(&self) -> bool {
        self.valid_to.is_none()
    }

    /// Timeline ordering: start date first, version number as tie-break.
    /// Missing version numbers sort as zero.
    pub fn timeline_order(a: &Version, b: &Version) -> Ordering {
        a.valid_from
            .cmp(&b.valid_from)
            .then_with(|| a.version_number.unwrap_or(0).cmp(&b.version_number.unwrap_or(0)))
    }
}

// ============================================================================
// INSTRUMENT
// ============================================================================

/// A regulation or attachment tracked across time: stable identity plus an
/// ordered history of versions, unique by merge key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub instrument_id: String,
    pub instrument_type: InstrumentType,
    pub display_name: String,
    pub versions: Vec<Version>,
}

impl Instrument {
    pub fn new(instrument_id: String, instrument_type: InstrumentType, versions: Vec<Version>) -> Self {
        let display_name = build_display_name(&instrument_id, &instrument_type);
        let mut instrument = Instrument {
            instrument_id,
            instrument_type,
            display_name,
            versions,
        };
        instrument.sort_versions();
        instrument
    }

    /// Re-derive the display name after the type may have changed.
    pub fn relabel(&mut self) {
        self.display_name = build_display_name(&self.instrument_id, &self.instrument_type);
    }

    pub fn sort_versions(&mut self) {
        self.versions.sort_by(Version::timeline_order);
    }

    /// Document ordering: regulations before attachments before the rest,
    /// then by display name in natural order.
    pub fn document_order(a: &Instrument, b: &Instrument) -> Ordering {
        a.instrument_type
            .weight()
            .cmp(&b.instrument_type.weight())
            .then_with(|| natural_cmp(&a.display_name, &b.display_name))
    }
}

/// Label for an instrument: its type label plus the trailing segment of the
/// identifier (identifiers are URI-like, the tail is the readable part).
pub fn build_display_name(instrument_id: &str, instrument_type: &InstrumentType) -> String {
    let tail = instrument_id
        .rsplit('/')
        .next()
        .filter(|t| !t.is_empty())
        .unwrap_or("onbekend");
    format!("{} \u{2022} {}", instrument_type.label(), tail)
}
