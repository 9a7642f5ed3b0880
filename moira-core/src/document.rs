//! Local YAML documents.
//!
//! Every file the tool writes or reads carries a `type` field naming its
//! payload:
//!
//! ```yaml
//! type: trigger        # or: user, tag
//! name: cpu-high
//! trigger_type: rising
//! warn_value: 80
//! ```
//!
//! Parsing reads the `type` field first and only then decodes the body, so
//! an unknown type surfaces as [`DocumentError::UnsupportedType`] rather
//! than as a parse failure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::types::{TagCollection, Trigger, UserSettings};

/// Payload selector of a local document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Trigger,
    User,
    Tag,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Trigger => "trigger",
            DocumentKind::User => "user",
            DocumentKind::Tag => "tag",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "trigger" => Some(DocumentKind::Trigger),
            "user" => Some(DocumentKind::User),
            "tag" => Some(DocumentKind::Tag),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed local document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Document {
    Trigger(Trigger),
    User(UserSettings),
    Tag(TagCollection),
}

#[derive(Deserialize)]
struct Descriptor {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Trigger(_) => DocumentKind::Trigger,
            Document::User(_) => DocumentKind::User,
            Document::Tag(_) => DocumentKind::Tag,
        }
    }

    /// Parse a local file body.
    pub fn from_yaml(text: &str) -> Result<Self, DocumentError> {
        let descriptor: Descriptor = serde_yaml::from_str(text)
            .map_err(|source| DocumentError::Parse { kind: "local", source })?;
        let declared = descriptor.kind.unwrap_or_default();
        let kind = DocumentKind::parse(&declared)
            .ok_or(DocumentError::UnsupportedType(declared))?;

        let parsed = match kind {
            DocumentKind::Trigger => serde_yaml::from_str(text).map(Document::Trigger),
            DocumentKind::User => serde_yaml::from_str(text).map(Document::User),
            DocumentKind::Tag => serde_yaml::from_str(text).map(Document::Tag),
        };
        parsed.map_err(|source| DocumentError::Parse {
            kind: kind.as_str(),
            source,
        })
    }

    /// Render the document as written to disk, `type` field first.
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TriggerType;

    const TRIGGER_YAML: &str = "\
type: trigger
name: cpu-high
targets:
  - m1
trigger_type: rising
warn_value: 80
error_value: 95
";

    #[test]
    fn parses_trigger_document() {
        let doc = Document::from_yaml(TRIGGER_YAML).expect("parse");
        let Document::Trigger(trigger) = doc else {
            panic!("expected trigger document");
        };
        assert_eq!(trigger.name, "cpu-high");
        assert_eq!(trigger.trigger_type, TriggerType::Rising);
        assert_eq!(trigger.warn_value, Some(80.0));
        assert!(trigger.sched.is_empty());
    }

    #[test]
    fn unknown_type_is_unsupported_not_parse_error() {
        let err = Document::from_yaml("type: dashboard\nname: x\n").unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedType(ref t) if t == "dashboard"));
    }

    #[test]
    fn missing_type_is_unsupported() {
        let err = Document::from_yaml("name: x\n").unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedType(ref t) if t.is_empty()));
    }

    #[test]
    fn body_error_names_the_declared_kind() {
        let err = Document::from_yaml("type: trigger\ntargets: not-a-list\n").unwrap_err();
        assert!(matches!(err, DocumentError::Parse { kind: "trigger", .. }), "got: {err}");
    }

    #[test]
    fn written_documents_lead_with_type() {
        let doc = Document::Tag(TagCollection {
            list: vec!["db".to_string()],
        });
        let yaml = doc.to_yaml().expect("render");
        assert!(yaml.starts_with("type: tag\n"), "got: {yaml}");
        assert_eq!(Document::from_yaml(&yaml).expect("parse"), doc);
    }
}
