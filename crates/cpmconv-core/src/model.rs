//! Model documents and their canonical defaults.
//!
//! Two independent defaults exist. The extractor substitutes
//! [`extraction_fallback`] (`version: 1`) when the source holds no usable
//! JSON. The packager writes [`default_project_model`] (`version: 11`)
//! whenever the model it receives has no parts. Both are reproduced exactly
//! as the downstream editor expects them.

use serde_json::{json, Map, Value};

/// JSON object type used for model documents
pub type Document = Map<String, Value>;

/// The model description carried by an extraction result
#[derive(Debug, Clone, PartialEq)]
pub enum ModelData {
    /// A JSON object recovered from the source buffer
    Recovered {
        /// Offset of the opening brace in the source buffer
        offset: usize,
        /// The parsed object
        document: Document,
    },
    /// Nothing usable was found; holds [`extraction_fallback`]
    Fallback(Document),
}

impl ModelData {
    /// Wraps a recovered object, falling back when the object is empty
    pub fn recovered(offset: usize, document: Document) -> Self {
        if document.is_empty() {
            Self::fallback()
        } else {
            Self::Recovered { offset, document }
        }
    }

    /// The extractor's fallback skeleton
    pub fn fallback() -> Self {
        Self::Fallback(extraction_fallback())
    }

    /// Returns the underlying document
    pub fn document(&self) -> &Document {
        match self {
            Self::Recovered { document, .. } | Self::Fallback(document) => document,
        }
    }

    /// Returns true if the document came from the source buffer
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    /// Offset of the recovered document, if any
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Recovered { offset, .. } => Some(*offset),
            Self::Fallback(_) => None,
        }
    }

    /// Returns true if the document has a non-empty `parts` field
    pub fn has_parts(&self) -> bool {
        self.document().get("parts").is_some_and(is_truthy)
    }
}

/// Skeleton used by the extractor when no JSON object was recovered
pub fn extraction_fallback() -> Document {
    into_document(json!({
        "version": 1,
        "parts": [],
        "animations": {},
        "poses": {},
        "scaling": {}
    }))
}

/// Model written to `model.json` when the extracted model has no parts
pub fn default_project_model() -> Document {
    into_document(json!({
        "version": 11,
        "parts": [],
        "scaling": {
            "head": [1.0, 1.0, 1.0],
            "body": [1.0, 1.0, 1.0],
            "leftArm": [1.0, 1.0, 1.0],
            "rightArm": [1.0, 1.0, 1.0],
            "leftLeg": [1.0, 1.0, 1.0],
            "rightLeg": [1.0, 1.0, 1.0]
        },
        "animations": {},
        "poses": {},
        "root": []
    }))
}

fn into_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Emptiness check matching the source application's loose semantics:
/// null, false, zero, and empty strings, arrays or objects count as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_differ_in_version() {
        assert_eq!(extraction_fallback()["version"], json!(1));
        assert_eq!(default_project_model()["version"], json!(11));
    }

    #[test]
    fn test_default_key_order() {
        let keys: Vec<_> = default_project_model().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["version", "parts", "scaling", "animations", "poses", "root"]
        );

        let scaling = default_project_model()["scaling"].clone();
        let limbs: Vec<_> = scaling.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            limbs,
            vec!["head", "body", "leftArm", "rightArm", "leftLeg", "rightLeg"]
        );
    }

    #[test]
    fn test_empty_recovered_object_falls_back() {
        let model = ModelData::recovered(3, Document::new());
        assert!(!model.is_recovered());
        assert_eq!(model.offset(), None);
        assert_eq!(model.document(), &extraction_fallback());
    }

    #[test]
    fn test_has_parts() {
        let with_parts = into_document(json!({"parts": [{"id": "head"}]}));
        assert!(ModelData::recovered(0, with_parts).has_parts());

        let empty_parts = into_document(json!({"parts": []}));
        assert!(!ModelData::recovered(0, empty_parts).has_parts());

        let no_parts = into_document(json!({"version": 3}));
        assert!(!ModelData::recovered(0, no_parts).has_parts());

        assert!(!ModelData::fallback().has_parts());
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(2.5)));
        assert!(is_truthy(&json!({"a": 1})));
    }
}
