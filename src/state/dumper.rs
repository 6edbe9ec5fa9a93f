//! Write the current battle as a state document

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::core::error::{Result, SkirmishError};
use crate::simulation::cycle::Simulation;
use crate::state::document::{BEFORE_BATTLE, ROOT_ELEMENT};
use crate::subject::{Subject, Subjects};

const XML_HEADER: &str = "<?xml version=\"1.0\" ?>\n";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

#[derive(Debug, Clone, Copy, Default)]
pub struct StateDumper;

impl StateDumper {
    pub fn new() -> Self {
        Self
    }

    pub fn dump(&self, simulation: &Simulation) -> Result<String> {
        self.dump_subjects(&simulation.map_name, &simulation.subjects)
    }

    /// Subjects are written in collection order, dead ones included
    pub fn dump_subjects(&self, map_name: &str, subjects: &Subjects) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);

        start(
            &mut writer,
            BytesStart::new(ROOT_ELEMENT).with_attributes([("type", BEFORE_BATTLE)]),
        )?;

        start(&mut writer, BytesStart::new("map"))?;
        text_element(&mut writer, "name", map_name)?;
        end(&mut writer, "map")?;

        start(&mut writer, BytesStart::new("subjects"))?;
        for subject in subjects.iter() {
            write_subject(&mut writer, subject)?;
        }
        end(&mut writer, "subjects")?;

        end(&mut writer, ROOT_ELEMENT)?;

        let body = String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| SkirmishError::StateDump(e.to_string()))?;
        Ok(format!("{}{}", XML_HEADER, body))
    }

    /// Write `state_<unix-seconds>.xml` into `dir`, creating it if needed
    pub fn save_to_dir(&self, simulation: &Simulation, dir: &Path) -> Result<PathBuf> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| SkirmishError::StateDump(e.to_string()))?
            .as_secs();

        fs::create_dir_all(dir)?;
        let path = dir.join(format!("state_{}.xml", timestamp));
        fs::write(&path, self.dump(simulation)?)?;

        tracing::info!("State saved to {}", path.display());
        Ok(path)
    }
}

fn write_subject(writer: &mut XmlWriter, subject: &Subject) -> Result<()> {
    start(writer, BytesStart::new("subject"))?;
    text_element(writer, "type", subject.kind.token())?;
    text_element(writer, "position", &subject.position.to_string())?;
    // f64 Display drops the fraction of integral values: 42.0 -> "42"
    text_element(writer, "direction", &subject.direction.to_string())?;
    text_element(writer, "combat_mode", subject.combat_mode().token())?;

    start(writer, BytesStart::new("properties"))?;
    for (key, value) in subject.properties.iter() {
        start(writer, BytesStart::new("item"))?;
        text_element(writer, "key", key)?;
        text_element(writer, "value", &value.to_string())?;
        end(writer, "item")?;
    }
    end(writer, "properties")?;

    end(writer, "subject")
}

fn start(writer: &mut XmlWriter, element: BytesStart<'_>) -> Result<()> {
    writer
        .write_event(Event::Start(element))
        .map_err(|e| SkirmishError::StateDump(e.to_string()))
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| SkirmishError::StateDump(e.to_string()))
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    start(writer, BytesStart::new(name))?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(|e| SkirmishError::StateDump(e.to_string()))?;
    end(writer, name)
}
