// Scenario manifest - index.json over a scenarios directory tree
// Layout: <scenarios-dir>/scen-*/state-*/**/*.xml
// The loader turns one manifest entry into the grouped, ordered state shape
// the snapshot builder consumes; it neither parses nor merges anything

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::natural::natural_cmp;
use crate::snapshot::{DocumentSource, StateGroup};

pub const INDEX_FILE: &str = "index.json";

// ============================================================================
// MANIFEST MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioIndex {
    pub base_path: String,
    pub scenarios: Vec<ScenarioEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEntry {
    pub id: String,
    pub label: String,
    pub states: Vec<StateEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub id: String,
    pub label: String,
    /// Document paths relative to the scenario directory
    pub files: Vec<String>,
}

impl ScenarioIndex {
    /// Look up a scenario by id, or take the first one when no id is given.
    pub fn find_scenario(&self, id: Option<&str>) -> Result<&ScenarioEntry> {
        match id {
            Some(id) => self
                .scenarios
                .iter()
                .find(|s| s.id == id)
                .with_context(|| format!("scenario '{id}' not found in index")),
            None => self
                .scenarios
                .first()
                .context("index contains no scenarios"),
        }
    }
}

/// "scen-3" -> "Scenario 3", "state-12" -> "State 12". Ids without a dashed
/// number keep their full id in the label.
fn derive_label(kind: &str, id: &str) -> String {
    match id.split('-').nth(1) {
        Some(number) if !number.is_empty() => format!("{kind} {number}"),
        _ => format!("{kind} {id}"),
    }
}

// ============================================================================
// INDEX BUILDER
// ============================================================================

/// Scan a scenarios directory and build its manifest. Scenario directories
/// are `scen-*`, state directories `state-*`; every `.xml` below a state
/// belongs to that state. Entries are sorted in natural order so the
/// manifest is deterministic regardless of directory enumeration order.
pub fn build_index(scenarios_dir: &Path) -> Result<ScenarioIndex> {
    let mut scenarios = Vec::new();

    for entry in fs::read_dir(scenarios_dir)
        .with_context(|| format!("failed to list scenarios directory {}", scenarios_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !entry.path().is_dir() || !name.starts_with("scen-") {
            continue;
        }

        let mut states = Vec::new();
        for state_entry in fs::read_dir(entry.path())
            .with_context(|| format!("failed to list scenario directory {}", entry.path().display()))?
        {
            let state_entry = state_entry?;
            let state_name = state_entry.file_name().to_string_lossy().to_string();
            if !state_entry.path().is_dir() || !state_name.starts_with("state-") {
                continue;
            }

            let mut files = Vec::new();
            collect_xml_files(&state_entry.path(), Path::new(&state_name), &mut files)?;
            files.sort_by(|a, b| natural_cmp(a, b));

            states.push(StateEntry {
                label: derive_label("State", &state_name),
                id: state_name,
                files,
            });
        }
        states.sort_by(|a, b| natural_cmp(&a.id, &b.id));

        scenarios.push(ScenarioEntry {
            label: derive_label("Scenario", &name),
            id: name,
            states,
        });
    }
    scenarios.sort_by(|a, b| natural_cmp(&a.id, &b.id));

    Ok(ScenarioIndex {
        base_path: scenarios_dir.to_string_lossy().to_string(),
        scenarios,
    })
}

fn collect_xml_files(dir: &Path, relative: &Path, files: &mut Vec<String>) -> Result<()> {
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let rel = relative.join(entry.file_name());
        if path.is_dir() {
            collect_xml_files(&path, &rel, files)?;
        } else if path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("xml"))
            .unwrap_or(false)
        {
            // Manifest paths use forward slashes on every platform
            files.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}

/// Rebuild the manifest and write it as `index.json` in the scenarios
/// directory. Returns the written path.
pub fn write_index(scenarios_dir: &Path) -> Result<PathBuf> {
    let index = build_index(scenarios_dir)?;
    let path = scenarios_dir.join(INDEX_FILE);
    let json = serde_json::to_string_pretty(&index)?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write index {}", path.display()))?;
    Ok(path)
}

/// Read `index.json` if present, otherwise scan the directory on the fly.
pub fn load_index(scenarios_dir: &Path) -> Result<ScenarioIndex> {
    let path = scenarios_dir.join(INDEX_FILE);
    if path.exists() {
        let json = fs::read_to_string(&path)
            .with_context(|| format!("failed to read index {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("failed to parse index {}", path.display()))
    } else {
        build_index(scenarios_dir)
    }
}

// ============================================================================
// SCENARIO LOADER
// ============================================================================

/// Load one scenario's documents from disk into the grouped, ordered shape
/// the snapshot builder consumes. States are ordered by natural name here -
/// the builder trusts its caller's order. A missing or unreadable file
/// fails the whole load with the offending path.
pub fn load_state_groups(scenarios_dir: &Path, scenario: &ScenarioEntry) -> Result<Vec<StateGroup>> {
    let mut states: Vec<&StateEntry> = scenario.states.iter().collect();
    states.sort_by(|a, b| natural_cmp(&a.id, &b.id));

    let mut groups = Vec::with_capacity(states.len());
    for state in states {
        let mut files: Vec<&String> = state.files.iter().collect();
        files.sort_by(|a, b| natural_cmp(a.as_str(), b.as_str()));

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            let path = scenarios_dir.join(&scenario.id).join(file);
            let bytes = fs::read(&path)
                .with_context(|| format!("failed to read delivery document {}", path.display()))?;
            documents.push(DocumentSource {
                name: file.clone(),
                bytes,
            });
        }

        groups.push(StateGroup {
            name: state.id.clone(),
            documents,
        });
    }
    Ok(groups)
}

// ============================================================================
// TESTS
// ============================================================================
