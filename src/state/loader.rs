//! Load a persisted state document into subjects

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::core::error::StateLoadError;
use crate::core::types::TilePosition;
use crate::simulation::cycle::Simulation;
use crate::state::document::{StateDocument, SubjectElement, BEFORE_BATTLE, ROOT_ELEMENT};
use crate::subject::{CombatMode, Properties, PropertyValue, Subject, SubjectKind};

/// A fully validated state, not yet installed anywhere
#[derive(Debug, Clone)]
pub struct State {
    pub map_name: String,
    pub subjects: Vec<Subject>,
}

impl State {
    /// Add the loaded subjects to a simulation, all or nothing
    pub fn install(self, simulation: &mut Simulation) -> crate::core::error::Result<()> {
        simulation.subjects.extend(self.subjects)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StateLoader;

impl StateLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse and validate a state document
    pub fn load_str(&self, content: &str) -> Result<State, StateLoadError> {
        if content.trim().is_empty() {
            return Err(StateLoadError::Empty);
        }

        match root_element(content)? {
            None => return Err(StateLoadError::Empty),
            Some(name) if name != ROOT_ELEMENT => {
                return Err(StateLoadError::Schema(format!(
                    "root element is <{}>, expected <{}>",
                    name, ROOT_ELEMENT
                )));
            }
            Some(_) => {}
        }

        let document: StateDocument = quick_xml::de::from_str(content)
            .map_err(|e| StateLoadError::Schema(e.to_string()))?;

        if let Some(state_type) = &document.state_type {
            if state_type != BEFORE_BATTLE {
                return Err(StateLoadError::Schema(format!(
                    "unknown state type {:?}",
                    state_type
                )));
            }
        }

        let subjects = document
            .subjects
            .subjects
            .iter()
            .enumerate()
            .map(|(i, element)| {
                subject_from_element(element)
                    .map_err(|e| StateLoadError::Schema(format!("subject #{}: {}", i, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Loaded state for map {} with {} subjects",
            document.map.name,
            subjects.len()
        );

        Ok(State {
            map_name: document.map.name,
            subjects,
        })
    }

    /// Read and parse a state file
    pub fn load_file(&self, path: &Path) -> Result<State, StateLoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StateLoadError::Io(format!("{}: {}", path.display(), e)))?;
        self.load_str(&content)
    }
}

/// Walk the whole document once; returns the root element name if any
fn root_element(content: &str) -> Result<Option<String>, StateLoadError> {
    let mut reader = Reader::from_str(content);
    let mut root = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if root.is_none() {
                    root = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(StateLoadError::Malformed(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(root)
}

fn subject_from_element(element: &SubjectElement) -> Result<Subject, String> {
    let kind = element.kind.trim().parse::<SubjectKind>()?;
    let position = element.position.trim().parse::<TilePosition>()?;

    let direction = element
        .direction
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid direction {:?}: {}", element.direction, e))?;
    if !direction.is_finite() {
        return Err(format!("invalid direction {:?}", element.direction));
    }

    let mut properties = Properties::new();
    for item in &element.properties.items {
        let value = PropertyValue::from_token(&item.key, item.value.trim())
            .map_err(|e| format!("property {}: {}", item.key, e))?;
        properties.set(item.key.as_str(), value);
    }

    let mut subject = Subject::new(kind)
        .at(position)
        .facing(direction)
        .with_properties(properties);

    let combat_mode = element
        .combat_mode
        .trim()
        .parse::<CombatMode>()
        .map_err(|e| e.to_string())?;
    subject.set_combat_mode(combat_mode).map_err(|e| e.to_string())?;

    Ok(subject)
}
