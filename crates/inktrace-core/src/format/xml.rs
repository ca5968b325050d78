//! The XML record format.
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <character>
//!   <utf8>LABEL</utf8>
//!   <width>W</width>
//!   <height>H</height>
//!   <strokes>
//!     <stroke>
//!       <point x=".." y=".." pressure=".." xtilt=".." ytilt=".." timestamp=".." />
//!       ...
//!     </stroke>
//!     ...
//!   </strokes>
//! </character>
//! ```
//!
//! Point attributes are emitted in that fixed order and only when present;
//! x and y are always present.

use super::FormatError;
use crate::model::{Character, Point, Stroke, Writing};
use std::fmt::Write as _;
use std::str::FromStr;

impl Point {
    /// Serialize to a single `<point ... />` element.
    pub fn to_xml(&self) -> String {
        let mut attrs = vec![format!("x=\"{}\"", self.x), format!("y=\"{}\"", self.y)];

        if let Some(pressure) = self.pressure {
            attrs.push(format!("pressure=\"{pressure}\""));
        }
        if let Some(xtilt) = self.xtilt {
            attrs.push(format!("xtilt=\"{xtilt}\""));
        }
        if let Some(ytilt) = self.ytilt {
            attrs.push(format!("ytilt=\"{ytilt}\""));
        }
        if let Some(timestamp) = self.timestamp {
            attrs.push(format!("timestamp=\"{timestamp}\""));
        }

        format!("<point {} />", attrs.join(" "))
    }
}

impl Stroke {
    /// Serialize to a `<stroke>` element, one point per line.
    pub fn to_xml(&self) -> String {
        let mut s = String::from("<stroke>\n");

        for point in &self.points {
            let _ = writeln!(s, "  {}", point.to_xml());
        }

        s.push_str("</stroke>");
        s
    }
}

impl Writing {
    /// Serialize to the writing's XML content: `<width>`, `<height>` and
    /// `<strokes>`, each stroke reindented one level.
    pub fn to_xml(&self) -> String {
        let mut s = format!(
            "<width>{}</width>\n<height>{}</height>\n<strokes>\n",
            self.width(),
            self.height()
        );

        for stroke in self.strokes() {
            for line in stroke.to_xml().lines() {
                let _ = writeln!(s, "  {line}");
            }
        }

        s.push_str("</strokes>");
        s
    }

    /// Parse a writing from the element sequence produced by
    /// [`Writing::to_xml`].
    ///
    /// Malformed input is a hard failure: missing x/y attributes,
    /// unparsable numbers or unexpected elements are all reported, never
    /// silently accepted.
    pub fn from_xml(xml: &str) -> Result<Self, FormatError> {
        // The fragment has no single root; give it one so it parses as a
        // document.
        let wrapped = format!("<writing>{xml}</writing>");
        let doc = roxmltree::Document::parse(&wrapped)?;

        let mut writing = Writing::new();
        parse_writing_content(doc.root_element(), &mut writing, None)?;
        Ok(writing)
    }
}

impl Character {
    /// Serialize to a complete XML document.
    ///
    /// The `<utf8>` element is omitted entirely for an unlabeled
    /// character, so the label round-trips as absent rather than as an
    /// empty string.
    pub fn to_xml(&self) -> String {
        let mut s = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<character>\n");

        if let Some(label) = self.label() {
            let _ = writeln!(s, "  <utf8>{}</utf8>", escape_text(label));
        }

        for line in self.writing().to_xml().lines() {
            let _ = writeln!(s, "  {line}");
        }

        s.push_str("</character>");
        s
    }

    /// Parse a character from a complete XML document.
    pub fn from_xml(xml: &str) -> Result<Self, FormatError> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();

        if root.tag_name().name() != "character" {
            return Err(FormatError::MissingRoot("character"));
        }

        let mut character = Character::new();
        let mut writing = Writing::new();
        let mut label = None;
        parse_writing_content(root, &mut writing, Some(&mut label))?;

        character.set_label(label);
        character.set_writing(writing);
        Ok(character)
    }
}

/// Walk the children of a `<character>` or synthetic writing root,
/// filling in `writing` (and the label, when one is allowed).
fn parse_writing_content(
    root: roxmltree::Node,
    writing: &mut Writing,
    mut label: Option<&mut Option<String>>,
) -> Result<(), FormatError> {
    for child in root.children().filter(roxmltree::Node::is_element) {
        match child.tag_name().name() {
            "utf8" => match label.as_deref_mut() {
                Some(slot) => *slot = Some(child.text().unwrap_or("").to_string()),
                None => return Err(FormatError::UnexpectedElement("utf8".to_string())),
            },
            "width" => writing.set_width(parse_text(&child, "width")?),
            "height" => writing.set_height(parse_text(&child, "height")?),
            "strokes" => {
                for node in child.children().filter(roxmltree::Node::is_element) {
                    if node.tag_name().name() != "stroke" {
                        return Err(FormatError::UnexpectedElement(
                            node.tag_name().name().to_string(),
                        ));
                    }
                    writing.append_stroke(parse_stroke(&node)?);
                }
            }
            other => return Err(FormatError::UnexpectedElement(other.to_string())),
        }
    }

    Ok(())
}

fn parse_stroke(node: &roxmltree::Node) -> Result<Stroke, FormatError> {
    let mut stroke = Stroke::new();

    for child in node.children().filter(roxmltree::Node::is_element) {
        if child.tag_name().name() != "point" {
            return Err(FormatError::UnexpectedElement(
                child.tag_name().name().to_string(),
            ));
        }
        stroke.append_point(parse_point(&child)?);
    }

    Ok(stroke)
}

fn parse_point(node: &roxmltree::Node) -> Result<Point, FormatError> {
    let mut point = Point::new(require_attr(node, "x")?, require_attr(node, "y")?);

    point.pressure = parse_attr(node, "pressure")?;
    point.xtilt = parse_attr(node, "xtilt")?;
    point.ytilt = parse_attr(node, "ytilt")?;
    point.timestamp = parse_attr(node, "timestamp")?;

    Ok(point)
}

fn parse_attr<T: FromStr>(
    node: &roxmltree::Node,
    name: &'static str,
) -> Result<Option<T>, FormatError> {
    match node.attribute(name) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| FormatError::InvalidNumber {
            field: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn require_attr<T: FromStr>(node: &roxmltree::Node, name: &'static str) -> Result<T, FormatError> {
    parse_attr(node, name)?.ok_or(FormatError::MissingAttribute(name))
}

fn parse_text<T: FromStr>(node: &roxmltree::Node, name: &str) -> Result<T, FormatError> {
    let text = node.text().unwrap_or("");
    text.trim().parse().map_err(|_| FormatError::InvalidNumber {
        field: name.to_string(),
        value: text.to_string(),
    })
}

/// Escape XML text content. Attribute values in this format are always
/// numeric, so only element text needs escaping.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_character() -> Character {
        let mut character = Character::new();
        character.set_label(Some("永".to_string()));
        let writing = character.writing_mut();
        writing.move_to_point(Point::with_timestamp(10, 20, 0));
        writing.line_to_point(Point::with_timestamp(30, 40, 120));
        writing.move_to_point(Point::with_timestamp(50, 60, 400));
        character
    }

    #[test]
    fn test_point_attribute_order_and_omission() {
        let mut point = Point::with_timestamp(1, 2, 99);
        point.ytilt = Some(0.25);
        assert_eq!(
            point.to_xml(),
            r#"<point x="1" y="2" ytilt="0.25" timestamp="99" />"#
        );

        assert_eq!(Point::new(7, 8).to_xml(), r#"<point x="7" y="8" />"#);
    }

    #[test]
    fn test_character_document_layout() {
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <character>\n\
                        \x20 <utf8>永</utf8>\n\
                        \x20 <width>1000</width>\n\
                        \x20 <height>1000</height>\n\
                        \x20 <strokes>\n\
                        \x20   <stroke>\n\
                        \x20     <point x=\"10\" y=\"20\" timestamp=\"0\" />\n\
                        \x20     <point x=\"30\" y=\"40\" timestamp=\"120\" />\n\
                        \x20   </stroke>\n\
                        \x20   <stroke>\n\
                        \x20     <point x=\"50\" y=\"60\" timestamp=\"400\" />\n\
                        \x20   </stroke>\n\
                        \x20 </strokes>\n\
                        </character>";
        assert_eq!(sample_character().to_xml(), expected);
    }

    #[test]
    fn test_unlabeled_character_omits_utf8() {
        let character = Character::new();
        let xml = character.to_xml();
        assert!(!xml.contains("<utf8>"));

        let parsed = Character::from_xml(&xml).unwrap();
        assert_eq!(parsed.label(), None);
    }

    #[test]
    fn test_character_round_trip() {
        let character = sample_character();
        let parsed = Character::from_xml(&character.to_xml()).unwrap();
        assert_eq!(parsed, character);
    }

    #[test]
    fn test_writing_round_trip_preserves_everything() {
        let mut writing = Writing::new();
        writing.set_width(800);
        writing.set_height(600);
        let mut p = Point::with_timestamp(1, 2, 0);
        p.pressure = Some(0.5);
        p.xtilt = Some(-0.1);
        writing.move_to_point(p);
        writing.line_to_point(Point::with_timestamp(3, 4, 50));
        writing.move_to_point(Point::with_timestamp(5, 6, 200));

        let parsed = Writing::from_xml(&writing.to_xml()).unwrap();
        assert_eq!(parsed, writing);
        assert_eq!(parsed.strokes()[0].points[0].pressure, Some(0.5));
    }

    #[test]
    fn test_label_escaping_round_trips() {
        let mut character = Character::new();
        character.set_label(Some("a<b&c>d".to_string()));
        let xml = character.to_xml();
        let parsed = Character::from_xml(&xml).unwrap();
        assert_eq!(parsed.label(), Some("a<b&c>d"));
    }

    #[test]
    fn test_missing_x_is_rejected() {
        let xml = "<character><strokes><stroke><point y=\"2\" /></stroke></strokes></character>";
        let err = Character::from_xml(xml).unwrap_err();
        assert!(matches!(err, FormatError::MissingAttribute("x")));
    }

    #[test]
    fn test_unparsable_number_is_rejected() {
        let xml =
            "<character><strokes><stroke><point x=\"ten\" y=\"2\" /></stroke></strokes></character>";
        let err = Character::from_xml(xml).unwrap_err();
        assert!(matches!(err, FormatError::InvalidNumber { .. }));
    }

    #[test]
    fn test_negative_timestamp_is_rejected() {
        let xml = "<character><strokes><stroke>\
                   <point x=\"1\" y=\"2\" timestamp=\"-5\" />\
                   </stroke></strokes></character>";
        let err = Character::from_xml(xml).unwrap_err();
        assert!(matches!(err, FormatError::InvalidNumber { .. }));
    }

    #[test]
    fn test_unexpected_element_is_rejected() {
        let xml = "<character><strokes><scribble /></strokes></character>";
        let err = Character::from_xml(xml).unwrap_err();
        assert!(matches!(err, FormatError::UnexpectedElement(_)));
    }

    #[test]
    fn test_truncated_document_is_rejected() {
        let character = sample_character();
        let xml = character.to_xml();
        let truncated = &xml[..xml.len() - 20];
        assert!(Character::from_xml(truncated).is_err());
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let err = Character::from_xml("<writing></writing>").unwrap_err();
        assert!(matches!(err, FormatError::MissingRoot("character")));
    }
}
