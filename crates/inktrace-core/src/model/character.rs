//! A writing together with its textual label.

use super::Writing;
use crate::format::FormatError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A labeled handwriting record: the intended glyph plus the strokes that
/// draw it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// The intended glyph, when known.
    #[serde(rename = "utf8", skip_serializing_if = "Option::is_none", default)]
    label: Option<String>,
    writing: Writing,
}

impl Character {
    /// Create a character with an empty writing and no label.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn writing(&self) -> &Writing {
        &self.writing
    }

    pub fn writing_mut(&mut self) -> &mut Writing {
        &mut self.writing
    }

    pub fn set_writing(&mut self, writing: Writing) {
        self.writing = writing;
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Load a character from an XML record file.
    pub fn from_xml_file<P: AsRef<Path>>(path: P) -> Result<Self, FormatError> {
        let xml = fs::read_to_string(path)?;
        Self::from_xml(&xml)
    }

    /// Write the character's XML record to a file.
    pub fn write_xml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), FormatError> {
        fs::write(path, self.to_xml())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    #[test]
    fn test_label_and_writing_are_independent() {
        let mut character = Character::new();
        assert_eq!(character.label(), None);
        assert_eq!(character.writing().stroke_count(), 0);

        character.set_label(Some("永".to_string()));
        assert_eq!(character.label(), Some("永"));
        assert_eq!(character.writing().stroke_count(), 0);

        let mut writing = Writing::new();
        writing.move_to_point(Point::new(1, 2));
        character.set_writing(writing);
        assert_eq!(character.writing().stroke_count(), 1);
        assert_eq!(character.label(), Some("永"));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut character = Character::new();
        character.set_label(Some("a".to_string()));
        character.writing_mut().move_to_point(Point::new(1, 1));

        let mut copy = character.clone();
        copy.writing_mut().line_to_point(Point::new(2, 2));
        copy.set_label(Some("b".to_string()));

        assert_eq!(character.writing().strokes()[0].len(), 1);
        assert_eq!(character.label(), Some("a"));
    }

    #[test]
    fn test_xml_file_round_trip() {
        let mut character = Character::new();
        character.set_label(Some("水".to_string()));
        character.writing_mut().move_to_point(Point::with_timestamp(10, 20, 0));
        character.writing_mut().line_to_point(Point::with_timestamp(30, 40, 120));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("character.xml");
        character.write_xml_file(&path).unwrap();

        let loaded = Character::from_xml_file(&path).unwrap();
        assert_eq!(loaded, character);
    }

    #[test]
    fn test_from_missing_file_is_io_error() {
        let err = Character::from_xml_file("/nonexistent/character.xml").unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }
}
