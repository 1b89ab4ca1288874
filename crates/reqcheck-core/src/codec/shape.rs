//! Declarative record shapes and the recursive decoder that projects
//! untyped JSON onto them.

use serde_json::{json, Map, Value};

use crate::domain::{
    AugmentedFeedback, CriteriaSet, Criterion, Feedback, FeedbackCollection, ImprovedRequirement,
};
use crate::error::{ReqcheckError, Result};

/// Expected JSON type of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// JSON string. Numbers and booleans are coerced to text.
    Text,
    /// Like `Text`, or `null`.
    NullableText,
    /// Nested record.
    Record(RecordShape),
    /// Ordered sequence of elements of one type.
    Sequence(Box<FieldType>),
}

impl FieldType {
    pub fn sequence_of(element: FieldType) -> Self {
        FieldType::Sequence(Box::new(element))
    }

    pub fn json_schema(&self) -> Value {
        match self {
            FieldType::Text => json!({"type": "string"}),
            FieldType::NullableText => json!({"type": ["string", "null"]}),
            FieldType::Record(shape) => shape.json_schema(),
            FieldType::Sequence(element) => {
                json!({"type": "array", "items": element.json_schema()})
            }
        }
    }
}

/// Field names and types of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    pub name: &'static str,
    pub fields: Vec<(&'static str, FieldType)>,
}

impl RecordShape {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, ty: FieldType) -> Self {
        self.fields.push((name, ty));
        self
    }

    /// Strict JSON Schema: every field required, no other keys allowed.
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, ty)| ((*name).to_string(), ty.json_schema()))
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|(name, _)| *name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }
}

/// Types that describe their own JSON shape.
pub trait Shaped {
    fn shape() -> RecordShape;
}

impl Shaped for Criterion {
    fn shape() -> RecordShape {
        RecordShape::new("Criterion")
            .field("title", FieldType::Text)
            .field("explanation", FieldType::Text)
    }
}

impl Shaped for CriteriaSet {
    fn shape() -> RecordShape {
        RecordShape::new("CriteriaSet").field(
            "criteria",
            FieldType::sequence_of(FieldType::Record(Criterion::shape())),
        )
    }
}

impl Shaped for Feedback {
    fn shape() -> RecordShape {
        RecordShape::new("Feedback")
            .field("grade", FieldType::Text)
            .field("suggestion", FieldType::NullableText)
    }
}

impl Shaped for AugmentedFeedback {
    fn shape() -> RecordShape {
        RecordShape::new("AugmentedFeedback")
            .field("criterion", FieldType::Record(Criterion::shape()))
            .field("feedback", FieldType::Record(Feedback::shape()))
    }
}

impl Shaped for FeedbackCollection {
    fn shape() -> RecordShape {
        RecordShape::new("FeedbackCollection").field(
            "feedback_collection",
            FieldType::sequence_of(FieldType::Record(AugmentedFeedback::shape())),
        )
    }
}

impl Shaped for ImprovedRequirement {
    fn shape() -> RecordShape {
        RecordShape::new("ImprovedRequirement").field("improved_requirement", FieldType::Text)
    }
}

/// Project `value` onto `shape`.
///
/// Unknown keys are dropped and declared keys missing from the input are
/// omitted from the result.
pub fn decode_record(value: &Value, shape: &RecordShape) -> Result<Map<String, Value>> {
    decode_at(value, shape, shape.name)
}

fn decode_at(value: &Value, shape: &RecordShape, at: &str) -> Result<Map<String, Value>> {
    let object = value.as_object().ok_or_else(|| {
        ReqcheckError::Schema(format!(
            "{at}: expected object for {}, found {}",
            shape.name,
            json_type(value)
        ))
    })?;

    let mut out = Map::new();
    for (name, ty) in &shape.fields {
        if let Some(field) = object.get(*name) {
            let path = format!("{at}.{name}");
            out.insert((*name).to_string(), decode_field(field, ty, &path)?);
        }
    }
    Ok(out)
}

fn decode_field(value: &Value, ty: &FieldType, at: &str) -> Result<Value> {
    match (ty, value) {
        (FieldType::NullableText, Value::Null) => Ok(Value::Null),
        (FieldType::Text | FieldType::NullableText, Value::String(_)) => Ok(value.clone()),
        (FieldType::Text | FieldType::NullableText, Value::Number(n)) => {
            Ok(Value::String(n.to_string()))
        }
        (FieldType::Text | FieldType::NullableText, Value::Bool(b)) => {
            Ok(Value::String(b.to_string()))
        }
        (FieldType::Record(shape), _) => decode_at(value, shape, at).map(Value::Object),
        (FieldType::Sequence(element), Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_field(item, element, &format!("{at}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        (expected, _) => Err(ReqcheckError::Schema(format!(
            "{at}: expected {}, found {}",
            describe(expected),
            json_type(value)
        ))),
    }
}

fn describe(ty: &FieldType) -> &'static str {
    match ty {
        FieldType::Text => "text",
        FieldType::NullableText => "text or null",
        FieldType::Record(_) => "object",
        FieldType::Sequence(_) => "array",
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_dropped() {
        let value = json!({"title": "t", "explanation": "e", "priority": 3});
        let decoded = decode_record(&value, &Criterion::shape()).unwrap();
        assert_eq!(decoded.len(), 2);
        assert!(!decoded.contains_key("priority"));
    }

    #[test]
    fn missing_keys_are_omitted() {
        let value = json!({"title": "t"});
        let decoded = decode_record(&value, &Criterion::shape()).unwrap();
        assert_eq!(decoded.get("title"), Some(&json!("t")));
        assert!(!decoded.contains_key("explanation"));
    }

    #[test]
    fn nested_sequences_are_decoded_recursively() {
        let value = json!({
            "feedback_collection": [{
                "criterion": {"title": "t", "explanation": "e", "extra": true},
                "feedback": {"grade": "B", "suggestion": null, "confidence": 0.5}
            }]
        });
        let decoded = decode_record(&value, &FeedbackCollection::shape()).unwrap();
        let entry = &decoded["feedback_collection"][0];
        assert_eq!(entry["criterion"], json!({"title": "t", "explanation": "e"}));
        assert_eq!(entry["feedback"], json!({"grade": "B", "suggestion": null}));
    }

    #[test]
    fn numbers_are_coerced_to_text() {
        let value = json!({"title": 1, "explanation": false});
        let decoded = decode_record(&value, &Criterion::shape()).unwrap();
        assert_eq!(decoded["title"], json!("1"));
        assert_eq!(decoded["explanation"], json!("false"));
    }

    #[test]
    fn wrong_element_type_reports_path() {
        let value = json!({"criteria": [{"title": "ok", "explanation": "ok"}, "oops"]});
        let err = decode_record(&value, &CriteriaSet::shape()).unwrap_err();
        let msg = err.to_string();
        assert!(err.is_schema());
        assert!(msg.contains("CriteriaSet.criteria[1]"), "{msg}");
    }

    #[test]
    fn null_rejected_for_required_text() {
        let value = json!({"improved_requirement": null});
        assert!(decode_record(&value, &ImprovedRequirement::shape()).is_err());
    }

    #[test]
    fn non_object_root_rejected() {
        assert!(decode_record(&json!([1, 2]), &CriteriaSet::shape()).is_err());
    }

    #[test]
    fn json_schema_requires_every_field() {
        let schema = FeedbackCollection::shape().json_schema();
        assert_eq!(schema["required"], json!(["feedback_collection"]));
        assert_eq!(schema["additionalProperties"], json!(false));

        let entry = &schema["properties"]["feedback_collection"]["items"];
        assert_eq!(entry["required"], json!(["criterion", "feedback"]));
        let feedback = &entry["properties"]["feedback"];
        assert_eq!(feedback["properties"]["grade"], json!({"type": "string"}));
        assert_eq!(
            feedback["properties"]["suggestion"],
            json!({"type": ["string", "null"]})
        );
    }
}
