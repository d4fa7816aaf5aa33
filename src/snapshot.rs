// State snapshots - all delivery documents of one state merged into one
// immutable view, sequenced per scenario
// Documents fold in filename order; later documents win key/type conflicts

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::merge::InstrumentMerger;
use crate::model::Instrument;
use crate::natural::natural_cmp;
use crate::parser::{parse_document, DocumentMeta, MalformedXmlError};

// ============================================================================
// INPUT CONTRACT
// ============================================================================

/// One raw delivery document: byte content plus the display name used for
/// ordering and provenance. Where the bytes come from (directory listing,
/// manifest, remote fetch) is the loader's business, not ours.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One named state with its delivery documents.
#[derive(Debug, Clone)]
pub struct StateGroup {
    pub name: String,
    pub documents: Vec<DocumentSource>,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Per-document publication summary, recorded for every input document of a
/// state - including documents that contributed no surviving instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationSummary {
    pub publication_id: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub instrument_id: Option<String>,
    pub instrument_type: Option<String>,
}

impl From<&DocumentMeta> for PublicationSummary {
    fn from(meta: &DocumentMeta) -> Self {
        PublicationSummary {
            publication_id: meta.publication_id.clone(),
            publication_date: meta.publication_date,
            instrument_id: meta.instrument_id.clone(),
            instrument_type: meta.instrument_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub scenario: String,
    pub state: String,
    pub source_files: Vec<String>,
    pub publications: Vec<PublicationSummary>,
}

impl SnapshotMeta {
    /// Human-readable summary lines for headings and status bars.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("State: {}", self.state)];

        let publication_ids: Vec<&str> = self
            .publications
            .iter()
            .filter_map(|p| p.publication_id.as_deref())
            .collect();
        if !publication_ids.is_empty() {
            lines.push(format!("Publications: {}", publication_ids.join(", ")));
        }

        if !self.source_files.is_empty() {
            lines.push(format!("Sources: {}", self.source_files.join(", ")));
        }

        lines
    }
}

/// The fully merged view of one state: an immutable value once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub instruments: Vec<Instrument>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Heading for a position in a snapshot sequence (1-based display).
    pub fn heading(&self, index: usize, total: usize) -> String {
        format!("Timeline snapshot {} of {}", index + 1, total)
    }

    /// The span covered by the state's versions: earliest start date and
    /// latest explicit end date (`None` when any shown period is open-ended
    /// or there is no explicit end at all).
    pub fn date_span(&self) -> Option<(NaiveDate, Option<NaiveDate>)> {
        let versions = self.instruments.iter().flat_map(|i| i.versions.iter());
        let earliest = versions.clone().map(|v| v.valid_from).min()?;
        let latest_end = if versions.clone().any(|v| v.valid_to.is_none()) {
            None
        } else {
            versions.filter_map(|v| v.valid_to).max()
        };
        Some((earliest, latest_end))
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// A scenario failed to load. Either one of its documents is corrupt, or no
/// state produced anything to animate. Both leave the caller with no
/// scenario loaded - there is no partial result.
#[derive(Debug)]
pub enum ScenarioError {
    MalformedXml(MalformedXmlError),
    EmptyScenario { scenario: String },
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::MalformedXml(e) => write!(f, "{e}"),
            ScenarioError::EmptyScenario { scenario } => {
                write!(f, "no state in scenario '{scenario}' produced any timeline instruments")
            }
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::MalformedXml(e) => Some(e),
            ScenarioError::EmptyScenario { .. } => None,
        }
    }
}

impl From<MalformedXmlError> for ScenarioError {
    fn from(e: MalformedXmlError) -> Self {
        ScenarioError::MalformedXml(e)
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Build the snapshot for one state.
///
/// Documents are parsed in natural filename order and folded sequentially;
/// this ordering is a correctness requirement, not a performance choice,
/// because later documents supersede earlier ones on key and type
/// conflicts. Provenance (`source_files`, `publications`) is recorded for
/// every document, whether or not it contributed instruments.
pub fn build_snapshot(
    scenario: &str,
    state: &str,
    documents: &[DocumentSource],
) -> Result<Snapshot, MalformedXmlError> {
    let mut ordered: Vec<&DocumentSource> = documents.iter().collect();
    ordered.sort_by(|a, b| natural_cmp(&a.name, &b.name));

    let mut merger = InstrumentMerger::new();
    let mut source_files = Vec::with_capacity(ordered.len());
    let mut publications = Vec::with_capacity(ordered.len());

    for document in ordered {
        let record = parse_document(&document.bytes, &document.name)?;
        source_files.push(record.meta.source_file.clone());
        publications.push(PublicationSummary::from(&record.meta));
        merger.fold_document(record.instruments);
    }

    Ok(Snapshot {
        meta: SnapshotMeta {
            scenario: scenario.to_string(),
            state: state.to_string(),
            source_files,
            publications,
        },
        instruments: merger.finish(),
    })
}

/// Build the snapshot sequence for a scenario from its ordered state groups.
///
/// States that end up with zero instruments are excluded from the sequence.
/// A scenario where nothing survives cannot be animated and is an error,
/// not an empty view.
pub fn build_scenario(scenario: &str, states: &[StateGroup]) -> Result<Vec<Snapshot>, ScenarioError> {
    let mut snapshots = Vec::with_capacity(states.len());
    for state in states {
        let snapshot = build_snapshot(scenario, &state.name, &state.documents)?;
        if !snapshot.is_empty() {
            snapshots.push(snapshot);
        }
    }

    if snapshots.is_empty() {
        return Err(ScenarioError::EmptyScenario {
            scenario: scenario.to_string(),
        });
    }
    Ok(snapshots)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InstrumentType;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn document(name: &str, xml: &str) -> DocumentSource {
        DocumentSource {
            name: name.to_string(),
            bytes: xml.as_bytes().to_vec(),
        }
    }

    fn delivery(publication_id: &str, instrument_id: &str, toestanden: &str) -> String {
        format!(
            r#"<root xmlns="http://koop.overheid.nl/apps/opera/">
  <metadata>
    <publicatie-id>{publication_id}</publicatie-id>
    <instrument-id>{instrument_id}</instrument-id>
    <instrument-type>regeling</instrument-type>
  </metadata>
  <instrument-toestanden instrument-id="{instrument_id}" instrument-type="regeling">
    {toestanden}
  </instrument-toestanden>
</root>"#
        )
    }

    fn toestand(number: i64, valid_from: &str, valid_to: &str, status: &str) -> String {
        format!(
            r#"<toestand>
      <versie-nummer>{number}</versie-nummer>
      <juridisch-werkend-vanaf>{valid_from}</juridisch-werkend-vanaf>
      <juridisch-werkend-tot>{valid_to}</juridisch-werkend-tot>
      <status>{status}</status>
    </toestand>"#
        )
    }

    #[test]
    fn test_single_document_two_versions() {
        let xml = delivery(
            "pub-1",
            "/x/reg001",
            &format!(
                "{}{}",
                toestand(1, "2020-01-01", "9999-12-31", "definitief"),
                toestand(2, "2021-01-01", "2022-01-01", "definitief"),
            ),
        );
        let snapshot =
            build_snapshot("scen-1", "state-1", &[document("a.xml", &xml)]).unwrap();

        assert_eq!(snapshot.instruments.len(), 1);
        let versions = &snapshot.instruments[0].versions;
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version_number, Some(1));
        assert!(versions[0].is_open_ended());
        assert_eq!(versions[1].version_number, Some(2));
        assert_eq!(versions[1].valid_to, Some(date("2022-01-01")));
    }

    #[test]
    fn test_overlapping_key_across_documents() {
        // Same key in both documents; the later file's status must win
        let first = delivery("pub-1", "/x/reg001", &toestand(1, "2020-01-01", "", "ontwerp"));
        let second = delivery("pub-2", "/x/reg001", &toestand(1, "2020-01-01", "", "definitief"));

        let snapshot = build_snapshot(
            "scen-1",
            "state-1",
            &[document("01-first.xml", &first), document("02-second.xml", &second)],
        )
        .unwrap();

        let versions = &snapshot.instruments[0].versions;
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].status.as_deref(), Some("definitief"));
    }

    #[test]
    fn test_documents_fold_in_natural_filename_order() {
        // Passed out of order, and "doc2" must sort before "doc10"
        let early = delivery("pub-a", "/x/reg001", &toestand(1, "2020-01-01", "", "eerste"));
        let late = delivery("pub-b", "/x/reg001", &toestand(1, "2020-01-01", "", "laatste"));

        let snapshot = build_snapshot(
            "scen-1",
            "state-1",
            &[document("doc10.xml", &late), document("doc2.xml", &early)],
        )
        .unwrap();

        // doc10 folds last, so its record supersedes doc2's
        assert_eq!(
            snapshot.instruments[0].versions[0].status.as_deref(),
            Some("laatste")
        );
        assert_eq!(snapshot.meta.source_files, vec!["doc2.xml", "doc10.xml"]);
    }

    #[test]
    fn test_provenance_recorded_for_empty_documents() {
        let with_instruments = delivery("pub-1", "/x/reg001", &toestand(1, "2020-01-01", "", "x"));
        // Valid delivery whose only version has no usable start date
        let without = delivery("pub-2", "/x/reg002", &toestand(1, "", "", "x"));

        let snapshot = build_snapshot(
            "scen-1",
            "state-1",
            &[document("a.xml", &with_instruments), document("b.xml", &without)],
        )
        .unwrap();

        assert_eq!(snapshot.instruments.len(), 1);
        assert_eq!(snapshot.meta.source_files.len(), 2);
        assert_eq!(snapshot.meta.publications.len(), 2);
        assert_eq!(
            snapshot.meta.publications[1].publication_id.as_deref(),
            Some("pub-2")
        );
    }

    #[test]
    fn test_empty_states_are_excluded() {
        let xml = delivery("pub-1", "/x/reg001", &toestand(1, "2020-01-01", "", "x"));
        let states = vec![
            StateGroup {
                name: "state-1".to_string(),
                documents: vec![],
            },
            StateGroup {
                name: "state-2".to_string(),
                documents: vec![document("a.xml", &xml)],
            },
        ];

        let snapshots = build_scenario("scen-1", &states).unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].meta.state, "state-2");
    }

    #[test]
    fn test_all_states_empty_is_an_error() {
        let states = vec![
            StateGroup {
                name: "state-1".to_string(),
                documents: vec![],
            },
            StateGroup {
                name: "state-2".to_string(),
                documents: vec![],
            },
        ];

        match build_scenario("scen-1", &states) {
            Err(ScenarioError::EmptyScenario { scenario }) => assert_eq!(scenario, "scen-1"),
            other => panic!("expected EmptyScenario, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_document_aborts_the_scenario() {
        let good = delivery("pub-1", "/x/reg001", &toestand(1, "2020-01-01", "", "x"));
        let states = vec![
            StateGroup {
                name: "state-1".to_string(),
                documents: vec![document("a.xml", &good)],
            },
            StateGroup {
                name: "state-2".to_string(),
                documents: vec![document("b.xml", "<root><broken></root>")],
            },
        ];

        match build_scenario("scen-1", &states) {
            Err(ScenarioError::MalformedXml(e)) => assert_eq!(e.source_file, "b.xml"),
            other => panic!("expected MalformedXml, got {other:?}"),
        }
    }

    #[test]
    fn test_instruments_merge_across_documents() {
        // Two documents, two different instruments plus one shared
        let first = format!(
            r#"<root>
  <instrument-toestanden instrument-id="/x/reg001" instrument-type="regeling">
    {}
  </instrument-toestanden>
  <instrument-toestanden instrument-id="/x/io1" instrument-type="informatie-object">
    {}
  </instrument-toestanden>
</root>"#,
            toestand(1, "2020-01-01", "", "a"),
            toestand(1, "2020-02-01", "", "a"),
        );
        let second = format!(
            r#"<root>
  <instrument-toestanden instrument-id="/x/reg001" instrument-type="regeling">
    {}
  </instrument-toestanden>
</root>"#,
            toestand(2, "2021-01-01", "", "b"),
        );

        let snapshot = build_snapshot(
            "scen-1",
            "state-1",
            &[document("a.xml", &first), document("b.xml", &second)],
        )
        .unwrap();

        assert_eq!(snapshot.instruments.len(), 2);
        // Regulation sorts first and now carries both versions
        assert_eq!(snapshot.instruments[0].instrument_id, "/x/reg001");
        assert_eq!(snapshot.instruments[0].versions.len(), 2);
        assert_eq!(snapshot.instruments[1].instrument_type, InstrumentType::InformatieObject);
    }

    #[test]
    fn test_date_span() {
        let xml = delivery(
            "pub-1",
            "/x/reg001",
            &format!(
                "{}{}",
                toestand(1, "2020-01-01", "2021-01-01", "a"),
                toestand(2, "2021-01-01", "2022-06-01", "b"),
            ),
        );
        let snapshot = build_snapshot("s", "st", &[document("a.xml", &xml)]).unwrap();
        assert_eq!(
            snapshot.date_span(),
            Some((date("2020-01-01"), Some(date("2022-06-01"))))
        );

        let open = delivery("pub-1", "/x/reg001", &toestand(1, "2020-01-01", "", "a"));
        let snapshot = build_snapshot("s", "st", &[document("a.xml", &open)]).unwrap();
        assert_eq!(snapshot.date_span(), Some((date("2020-01-01"), None)));
    }

    #[test]
    fn test_summary_lines() {
        let xml = delivery("pub-1", "/x/reg001", &toestand(1, "2020-01-01", "", "a"));
        let snapshot = build_snapshot("scen-1", "state-3", &[document("a.xml", &xml)]).unwrap();

        let lines = snapshot.meta.summary_lines();
        assert_eq!(lines[0], "State: state-3");
        assert!(lines.iter().any(|l| l.contains("pub-1")));
        assert!(lines.iter().any(|l| l.contains("a.xml")));
        assert_eq!(snapshot.heading(0, 4), "Timeline snapshot 1 of 4");
    }
}
