// Delivery document parser - one XML export event -> typed DocumentRecord
// Raw per-element records first, typed model second; field anomalies degrade
// to None instead of failing the document

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::model::{Instrument, InstrumentType, Version};

/// End-date sentinel used by deliveries to mean "no end"; normalized to an
/// open-ended version.
const DATE_FAR_FUTURE: &str = "9999-12-31";

// ============================================================================
// ERRORS
// ============================================================================

/// The document is not well-formed XML. Fatal for the document, and the
/// scenario load aborts on it: a corrupt file usually signals a broken
/// export or transfer, not a single bad record.
#[derive(Debug, Clone)]
pub struct MalformedXmlError {
    pub source_file: String,
    pub message: String,
}

impl std::fmt::Display for MalformedXmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed XML in {}: {}", self.source_file, self.message)
    }
}

impl std::error::Error for MalformedXmlError {}

// ============================================================================
// DOCUMENT RECORD
// ============================================================================

/// Document-level metadata. Every field is optional: a delivery with a
/// sparse metadata block is still a valid delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub publication_id: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub instrument_id: Option<String>,
    pub instrument_type: Option<String>,
    pub delivery_id: Option<String>,
    pub supply_time: Option<NaiveDateTime>,
    pub source_file: String,
}

/// The parsed result of one delivery document, before any cross-document
/// merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub meta: DocumentMeta,
    pub instruments: Vec<Instrument>,
}

// ============================================================================
// RAW INTERMEDIATES (one per XML element, text kept verbatim)
// ============================================================================

#[derive(Debug, Default)]
struct RawMetadata {
    publicatie_id: Option<String>,
    datum_bekendmaking: Option<String>,
    instrument_id: Option<String>,
    instrument_type: Option<String>,
    id_levering: Option<String>,
    aanlevering_tijd: Option<String>,
}

#[derive(Debug, Default)]
struct RawInstrument {
    instrument_id: Option<String>,
    instrument_type: Option<String>,
    toestanden: Vec<RawToestand>,
}

#[derive(Debug, Default)]
struct RawToestand {
    versie_nummer: Option<String>,
    juridisch_werkend_vanaf: Option<String>,
    juridisch_werkend_tot: Option<String>,
    instrument_type: Option<String>,
    instrument_versie_id: Option<String>,
    publicatie_id: Option<String>,
    publicatie_date: Option<String>,
    op_tijdlijn: Option<String>,
    status: Option<String>,
    verwerking: Option<String>,
    // Attributes, not child elements
    creeer_operatie: Option<String>,
    aanlevering_tijd: Option<String>,
}

// ============================================================================
// PARSER
// ============================================================================

/// Parse one delivery document.
///
/// Elements are matched by local name, so both default-namespace and
/// prefixed documents parse the same way. Only well-formedness failures are
/// errors; unknown elements are skipped and missing fields become `None`.
pub fn parse_document(bytes: &[u8], source_file: &str) -> Result<DocumentRecord, MalformedXmlError> {
    let text = std::str::from_utf8(bytes).map_err(|e| MalformedXmlError {
        source_file: source_file.to_string(),
        message: format!("invalid UTF-8: {e}"),
    })?;

    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut meta = RawMetadata::default();
    let mut meta_done = false;
    let mut in_metadata = false;

    let mut raw_instruments: Vec<RawInstrument> = Vec::new();
    let mut current_instrument: Option<RawInstrument> = None;
    let mut current_toestand: Option<RawToestand> = None;
    let mut current_element = String::new();

    // Well-formedness bookkeeping the pull parser doesn't do on its own:
    // a document must have a root element and close everything it opens
    let mut depth = 0usize;
    let mut saw_element = false;

    loop {
        match reader.read_event() {
            Err(e) => {
                return Err(MalformedXmlError {
                    source_file: source_file.to_string(),
                    message: e.to_string(),
                })
            }
            Ok(Event::Eof) => {
                if depth != 0 || !saw_element {
                    return Err(MalformedXmlError {
                        source_file: source_file.to_string(),
                        message: if saw_element {
                            "unexpected end of document".to_string()
                        } else {
                            "no root element".to_string()
                        },
                    });
                }
                break;
            }
            Ok(Event::Start(ref e)) => {
                depth += 1;
                saw_element = true;
                let local = local_name(e.name().as_ref());
                match local.as_str() {
                    // Only the first metadata block counts
                    "metadata" if !meta_done => in_metadata = true,
                    "instrument-toestanden" => {
                        current_instrument = Some(RawInstrument {
                            instrument_id: attr_value(e, "instrument-id"),
                            instrument_type: attr_value(e, "instrument-type"),
                            toestanden: Vec::new(),
                        });
                    }
                    "toestand" if current_instrument.is_some() => {
                        current_toestand = Some(RawToestand {
                            creeer_operatie: attr_value(e, "creeer-operatie"),
                            aanlevering_tijd: attr_value(e, "aanlevering-tijd"),
                            ..RawToestand::default()
                        });
                    }
                    _ => {}
                }
                current_element = local;
            }
            Ok(Event::Empty(ref e)) => {
                // Self-closing containers still contribute their attributes;
                // self-closing leaf fields are equivalent to missing ones
                saw_element = true;
                let local = local_name(e.name().as_ref());
                match local.as_str() {
                    "instrument-toestanden" => {
                        raw_instruments.push(RawInstrument {
                            instrument_id: attr_value(e, "instrument-id"),
                            instrument_type: attr_value(e, "instrument-type"),
                            toestanden: Vec::new(),
                        });
                    }
                    "toestand" => {
                        if let Some(instrument) = current_instrument.as_mut() {
                            instrument.toestanden.push(RawToestand {
                                creeer_operatie: attr_value(e, "creeer-operatie"),
                                aanlevering_tijd: attr_value(e, "aanlevering-tijd"),
                                ..RawToestand::default()
                            });
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref t)) => {
                let value = t.unescape().unwrap_or_default().trim().to_string();
                if value.is_empty() {
                    continue;
                }
                if let Some(toestand) = current_toestand.as_mut() {
                    assign_toestand_field(toestand, &current_element, value);
                } else if current_instrument.is_some() {
                    // The instrument element itself carries only attributes
                } else if in_metadata {
                    assign_metadata_field(&mut meta, &current_element, value);
                }
            }
            Ok(Event::End(ref e)) => {
                depth = depth.saturating_sub(1);
                let local = local_name(e.name().as_ref());
                match local.as_str() {
                    "metadata" if in_metadata => {
                        in_metadata = false;
                        meta_done = true;
                    }
                    "toestand" => {
                        if let (Some(toestand), Some(instrument)) =
                            (current_toestand.take(), current_instrument.as_mut())
                        {
                            instrument.toestanden.push(toestand);
                        }
                    }
                    "instrument-toestanden" => {
                        if let Some(instrument) = current_instrument.take() {
                            raw_instruments.push(instrument);
                        }
                    }
                    _ => {}
                }
                current_element.clear();
            }
            Ok(_) => {}
        }
    }

    let mut instruments: Vec<Instrument> = raw_instruments
        .into_iter()
        .filter_map(finish_instrument)
        .collect();
    instruments.sort_by(Instrument::document_order);

    Ok(DocumentRecord {
        meta: DocumentMeta {
            publication_id: meta.publicatie_id,
            publication_date: meta.datum_bekendmaking.as_deref().and_then(parse_date),
            instrument_id: meta.instrument_id,
            instrument_type: meta.instrument_type,
            delivery_id: meta.id_levering,
            supply_time: meta.aanlevering_tijd.as_deref().and_then(parse_datetime),
            source_file: source_file.to_string(),
        },
        instruments,
    })
}

fn local_name(qname: &[u8]) -> String {
    let full = String::from_utf8_lossy(qname).to_string();
    full.rsplit(':').next().unwrap_or(&full).to_string()
}

fn attr_value(e: &BytesStart<'_>, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        if key.rsplit(':').next().unwrap_or(&key) == name {
            let value = String::from_utf8_lossy(&attr.value).trim().to_string();
            return if value.is_empty() { None } else { Some(value) };
        }
    }
    None
}

fn assign_metadata_field(meta: &mut RawMetadata, element: &str, value: String) {
    let slot = match element {
        "publicatie-id" => &mut meta.publicatie_id,
        "datum-bekendmaking" => &mut meta.datum_bekendmaking,
        "instrument-id" => &mut meta.instrument_id,
        "instrument-type" => &mut meta.instrument_type,
        "id-levering" => &mut meta.id_levering,
        "aanlevering-tijd" => &mut meta.aanlevering_tijd,
        _ => return,
    };
    // First occurrence wins
    slot.get_or_insert(value);
}

fn assign_toestand_field(toestand: &mut RawToestand, element: &str, value: String) {
    let slot = match element {
        "versie-nummer" => &mut toestand.versie_nummer,
        "juridisch-werkend-vanaf" => &mut toestand.juridisch_werkend_vanaf,
        "juridisch-werkend-tot" => &mut toestand.juridisch_werkend_tot,
        "instrument-type" => &mut toestand.instrument_type,
        "instrument-versie-id" => &mut toestand.instrument_versie_id,
        "publicatie-id" => &mut toestand.publicatie_id,
        "publicatie-date" => &mut toestand.publicatie_date,
        "op-tijdlijn" => &mut toestand.op_tijdlijn,
        "status" => &mut toestand.status,
        "verwerking" => &mut toestand.verwerking,
        _ => return,
    };
    slot.get_or_insert(value);
}

// ============================================================================
// RAW -> TYPED
// ============================================================================

fn finish_instrument(raw: RawInstrument) -> Option<Instrument> {
    let instrument_id = raw.instrument_id.unwrap_or_default();

    let mut versions = Vec::new();
    let mut first_version_type: Option<String> = None;
    for toestand in &raw.toestanden {
        if let Some(version) = finish_toestand(toestand, &instrument_id) {
            if versions.is_empty() {
                first_version_type = toestand.instrument_type.clone();
            }
            versions.push(version);
        }
    }

    // An instrument with no placeable versions has nothing to show
    if versions.is_empty() {
        return None;
    }

    // Type fallback chain: first surviving version, then the instrument
    // element's own attribute, then unknown
    let instrument_type =
        InstrumentType::parse(first_version_type.or(raw.instrument_type).as_deref());

    Some(Instrument::new(instrument_id, instrument_type, versions))
}

fn finish_toestand(raw: &RawToestand, instrument_id: &str) -> Option<Version> {
    // Hard filter: without a parsable start date the version cannot be
    // placed on the timeline at all
    let valid_from = raw.juridisch_werkend_vanaf.as_deref().and_then(parse_date)?;

    let valid_to = match raw.juridisch_werkend_tot.as_deref() {
        None | Some(DATE_FAR_FUTURE) => None,
        Some(other) => parse_date(other),
    };

    Some(Version {
        instrument_id: instrument_id.to_string(),
        instrument_type: InstrumentType::parse(raw.instrument_type.as_deref()),
        version_number: raw.versie_nummer.as_deref().and_then(parse_number),
        version_id: raw.instrument_versie_id.clone(),
        publication_id: raw.publicatie_id.clone(),
        publication_date: raw.publicatie_date.as_deref().and_then(parse_date),
        valid_from,
        valid_to,
        on_timeline: raw.op_tijdlijn.as_deref() != Some("false"),
        status: resolve_status(&raw.status, &raw.verwerking),
        operation: raw.creeer_operatie.clone().unwrap_or_default(),
        supply_time: raw.aanlevering_tijd.as_deref().and_then(parse_datetime),
    })
}

/// Status precedence: deliveries carry this as either `status` or the older
/// `verwerking` field. `status` wins when both are present.
fn resolve_status(status: &Option<String>, verwerking: &Option<String>) -> Option<String> {
    status.clone().or_else(|| verwerking.clone())
}

// ============================================================================
// PERMISSIVE VALUE PARSING
// ============================================================================

/// Parse a date from delivery text. Datetime-bearing values resolve to
/// their date part. Anything unparsable is `None`, never an error.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    parse_datetime(raw).map(|dt| dt.date())
}

/// Parse a timestamp from delivery text (supports second and sub-second
/// precision, with or without a zone offset).
pub(crate) fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    None
}

fn parse_number(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn parse(xml: &str) -> DocumentRecord {
        parse_document(xml.as_bytes(), "test.xml").unwrap()
    }

    const FULL_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tijdlijnen xmlns="http://koop.overheid.nl/apps/opera/">
  <metadata>
    <publicatie-id>pub-1</publicatie-id>
    <datum-bekendmaking>2023-05-01</datum-bekendmaking>
    <instrument-id>/akn/nl/act/reg001</instrument-id>
    <instrument-type>regeling</instrument-type>
    <id-levering>lev-1</id-levering>
    <aanlevering-tijd>2023-05-01T10:30:00</aanlevering-tijd>
  </metadata>
  <instrument-toestanden instrument-id="/akn/nl/act/reg001" instrument-type="regeling">
    <toestand creeer-operatie="nieuw" aanlevering-tijd="2023-05-01T10:30:00">
      <versie-nummer>2</versie-nummer>
      <juridisch-werkend-vanaf>2021-01-01</juridisch-werkend-vanaf>
      <juridisch-werkend-tot>2022-01-01</juridisch-werkend-tot>
      <instrument-type>regeling</instrument-type>
      <instrument-versie-id>reg001@2</instrument-versie-id>
      <publicatie-id>pub-1</publicatie-id>
      <publicatie-date>2021-01-01</publicatie-date>
      <status>definitief</status>
    </toestand>
    <toestand>
      <versie-nummer>1</versie-nummer>
      <juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf>
      <juridisch-werkend-tot>9999-12-31</juridisch-werkend-tot>
      <instrument-type>regeling</instrument-type>
    </toestand>
  </instrument-toestanden>
</tijdlijnen>"#;

    #[test]
    fn test_metadata_fields() {
        let record = parse(FULL_DOCUMENT);
        let meta = &record.meta;
        assert_eq!(meta.publication_id.as_deref(), Some("pub-1"));
        assert_eq!(meta.publication_date, Some(date("2023-05-01")));
        assert_eq!(meta.instrument_id.as_deref(), Some("/akn/nl/act/reg001"));
        assert_eq!(meta.instrument_type.as_deref(), Some("regeling"));
        assert_eq!(meta.delivery_id.as_deref(), Some("lev-1"));
        assert!(meta.supply_time.is_some());
        assert_eq!(meta.source_file, "test.xml");
    }

    #[test]
    fn test_versions_parsed_and_sorted() {
        let record = parse(FULL_DOCUMENT);
        assert_eq!(record.instruments.len(), 1);

        let instrument = &record.instruments[0];
        assert_eq!(instrument.instrument_type, InstrumentType::Regeling);
        assert_eq!(instrument.versions.len(), 2);

        // Delivered out of order; sorted by valid_from
        assert_eq!(instrument.versions[0].version_number, Some(1));
        assert_eq!(instrument.versions[1].version_number, Some(2));
    }

    #[test]
    fn test_far_future_end_is_open_ended() {
        let record = parse(FULL_DOCUMENT);
        let versions = &record.instruments[0].versions;
        assert!(versions[0].is_open_ended());
        assert_eq!(versions[1].valid_to, Some(date("2022-01-01")));
    }

    #[test]
    fn test_version_attributes() {
        let record = parse(FULL_DOCUMENT);
        let v2 = &record.instruments[0].versions[1];
        assert_eq!(v2.operation, "nieuw");
        assert!(v2.supply_time.is_some());
        assert_eq!(v2.status.as_deref(), Some("definitief"));

        // The second toestand has neither attribute
        let v1 = &record.instruments[0].versions[0];
        assert_eq!(v1.operation, "");
        assert!(v1.supply_time.is_none());
    }

    #[test]
    fn test_unplaceable_versions_are_dropped() {
        let xml = r#"<root>
  <instrument-toestanden instrument-id="x">
    <toestand>
      <versie-nummer>1</versie-nummer>
      <juridisch-werkend-vanaf>not-a-date</juridisch-werkend-vanaf>
    </toestand>
    <toestand>
      <versie-nummer>2</versie-nummer>
    </toestand>
    <toestand>
      <versie-nummer>3</versie-nummer>
      <juridisch-werkend-vanaf>2020-06-01</juridisch-werkend-vanaf>
    </toestand>
  </instrument-toestanden>
</root>"#;
        let record = parse(xml);
        let versions = &record.instruments[0].versions;
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version_number, Some(3));
    }

    #[test]
    fn test_instrument_without_surviving_versions_is_dropped() {
        let xml = r#"<root>
  <instrument-toestanden instrument-id="x">
    <toestand><versie-nummer>1</versie-nummer></toestand>
  </instrument-toestanden>
  <instrument-toestanden instrument-id="y"/>
</root>"#;
        let record = parse(xml);
        assert!(record.instruments.is_empty());
    }

    #[test]
    fn test_on_timeline_requires_exact_false() {
        let xml = r#"<root>
  <instrument-toestanden instrument-id="x">
    <toestand>
      <juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf>
      <op-tijdlijn>false</op-tijdlijn>
    </toestand>
    <toestand>
      <juridisch-werkend-vanaf>2021-01-01</juridisch-werkend-vanaf>
      <op-tijdlijn>FALSE</op-tijdlijn>
    </toestand>
    <toestand>
      <juridisch-werkend-vanaf>2022-01-01</juridisch-werkend-vanaf>
    </toestand>
  </instrument-toestanden>
</root>"#;
        let record = parse(xml);
        let versions = &record.instruments[0].versions;
        assert!(!versions[0].on_timeline);
        assert!(versions[1].on_timeline);
        assert!(versions[2].on_timeline);
    }

    #[test]
    fn test_status_falls_back_to_verwerking() {
        let xml = r#"<root>
  <instrument-toestanden instrument-id="x">
    <toestand>
      <juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf>
      <verwerking>doorgevoerd</verwerking>
    </toestand>
    <toestand>
      <juridisch-werkend-vanaf>2021-01-01</juridisch-werkend-vanaf>
      <status>definitief</status>
      <verwerking>doorgevoerd</verwerking>
    </toestand>
  </instrument-toestanden>
</root>"#;
        let record = parse(xml);
        let versions = &record.instruments[0].versions;
        assert_eq!(versions[0].status.as_deref(), Some("doorgevoerd"));
        assert_eq!(versions[1].status.as_deref(), Some("definitief"));
    }

    #[test]
    fn test_type_falls_back_to_element_attribute() {
        let xml = r#"<root>
  <instrument-toestanden instrument-id="x" instrument-type="informatie-object">
    <toestand>
      <juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf>
    </toestand>
  </instrument-toestanden>
</root>"#;
        let record = parse(xml);
        assert_eq!(
            record.instruments[0].instrument_type,
            InstrumentType::InformatieObject
        );
    }

    #[test]
    fn test_type_defaults_to_unknown() {
        let xml = r#"<root>
  <instrument-toestanden instrument-id="x">
    <toestand>
      <juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf>
    </toestand>
  </instrument-toestanden>
</root>"#;
        let record = parse(xml);
        assert_eq!(record.instruments[0].instrument_type, InstrumentType::Onbekend);
    }

    #[test]
    fn test_unparsable_numbers_become_none() {
        let xml = r#"<root>
  <instrument-toestanden instrument-id="x">
    <toestand>
      <versie-nummer>abc</versie-nummer>
      <juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf>
      <publicatie-date>never</publicatie-date>
    </toestand>
  </instrument-toestanden>
</root>"#;
        let record = parse(xml);
        let version = &record.instruments[0].versions[0];
        assert_eq!(version.version_number, None);
        assert_eq!(version.publication_date, None);
    }

    #[test]
    fn test_empty_end_date_is_open_ended() {
        let xml = r#"<root>
  <instrument-toestanden instrument-id="x">
    <toestand>
      <juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf>
      <juridisch-werkend-tot></juridisch-werkend-tot>
    </toestand>
  </instrument-toestanden>
</root>"#;
        let record = parse(xml);
        assert!(record.instruments[0].versions[0].is_open_ended());
    }

    #[test]
    fn test_missing_metadata_block_yields_empty_meta() {
        let xml = r#"<root>
  <instrument-toestanden instrument-id="x">
    <toestand><juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf></toestand>
  </instrument-toestanden>
</root>"#;
        let record = parse(xml);
        let meta = &record.meta;
        assert!(meta.publication_id.is_none());
        assert!(meta.publication_date.is_none());
        assert!(meta.delivery_id.is_none());
        assert_eq!(meta.source_file, "test.xml");
    }

    #[test]
    fn test_prefixed_elements_parse_the_same() {
        let xml = r#"<op:root xmlns:op="http://koop.overheid.nl/apps/opera/">
  <op:metadata>
    <op:publicatie-id>pub-9</op:publicatie-id>
  </op:metadata>
  <op:instrument-toestanden instrument-id="x">
    <op:toestand>
      <op:juridisch-werkend-vanaf>2020-01-01</op:juridisch-werkend-vanaf>
    </op:toestand>
  </op:instrument-toestanden>
</op:root>"#;
        let record = parse(xml);
        assert_eq!(record.meta.publication_id.as_deref(), Some("pub-9"));
        assert_eq!(record.instruments.len(), 1);
    }

    #[test]
    fn test_instruments_sorted_by_type_then_name() {
        let xml = r#"<root>
  <instrument-toestanden instrument-id="/x/io10" instrument-type="informatie-object">
    <toestand><juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf></toestand>
  </instrument-toestanden>
  <instrument-toestanden instrument-id="/x/io2" instrument-type="informatie-object">
    <toestand><juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf></toestand>
  </instrument-toestanden>
  <instrument-toestanden instrument-id="/x/reg" instrument-type="regeling">
    <toestand><juridisch-werkend-vanaf>2020-01-01</juridisch-werkend-vanaf></toestand>
  </instrument-toestanden>
</root>"#;
        let record = parse(xml);
        let names: Vec<&str> = record
            .instruments
            .iter()
            .map(|i| i.display_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Regulation \u{2022} reg",
                "Attachment \u{2022} io2",
                "Attachment \u{2022} io10"
            ]
        );
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let err = parse_document(b"<root><unclosed></root>", "broken.xml").unwrap_err();
        assert_eq!(err.source_file, "broken.xml");
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_truncated_document_is_an_error() {
        let err = parse_document(
            b"<root><instrument-toestanden instrument-id=\"x\">",
            "cut.xml",
        )
        .unwrap_err();
        assert_eq!(err.source_file, "cut.xml");
    }

    #[test]
    fn test_input_without_root_element_is_an_error() {
        assert!(parse_document(b"just some text", "notes.xml").is_err());
        assert!(parse_document(b"", "empty.xml").is_err());
    }

    #[test]
    fn test_lenient_date_formats() {
        assert_eq!(parse_date("2020-01-01"), Some(date("2020-01-01")));
        assert_eq!(parse_date("2020-01-01T12:30:00"), Some(date("2020-01-01")));
        assert_eq!(parse_date("2020-13-40"), None);
        assert!(parse_datetime("2023-05-01T10:30:00").is_some());
        assert!(parse_datetime("2023-05-01T10:30:00.250").is_some());
        assert!(parse_datetime("2023-05-01T10:30:00+02:00").is_some());
        assert!(parse_datetime("gisteren").is_none());
    }
}
