// src/models/document.rs
//! Document data model.
//!
//! Defines the single record type managed on the ledger, together with the
//! compile-time field table used to apply partial updates by external tag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::error::RegistryError;

/// A registered document as stored on the ledger.
///
/// Serialized as a JSON object carrying exactly the ten external field tags
/// listed in [`FIELDS`]. The ledger key is not part of the stored value; it is
/// added to read responses as `id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Human-readable document name
    /// Example: "Passport"
    pub name: String,

    /// Identifier of the issuing authority
    pub issuer_id: String,

    /// Issue timestamp, as supplied by the caller
    pub issued_at: String,

    /// Free-text description
    pub description: String,

    /// Expiry timestamp, as supplied by the caller
    pub expires_at: String,

    /// Identifier of the holder
    pub issued_to: String,

    /// Whether the document has been revoked
    pub revoked: bool,

    /// Reason given on the most recent revocation
    pub revoke_reason: String,

    /// Opaque payload (hash, encoded blob, reference...)
    pub document_data: String,

    /// Registration timestamp, as supplied by the caller
    pub registered_at: String,
}

/// Typed access to one document field.
///
/// Each variant holds a plain function returning a mutable reference to the
/// field, so the table below is fully resolved at compile time.
#[derive(Clone, Copy)]
pub enum FieldSlot {
    /// A string-typed field; patch values must be JSON strings
    Text(fn(&mut Document) -> &mut String),
    /// A boolean field; patch values must be JSON booleans
    Flag(fn(&mut Document) -> &mut bool),
}

/// Ordered table of `(external tag, accessor)` pairs for every document field.
///
/// The order matches the positional arguments of `registerDocument`.
pub const FIELDS: [(&str, FieldSlot); 10] = [
    ("name", FieldSlot::Text(|d| &mut d.name)),
    ("issuerId", FieldSlot::Text(|d| &mut d.issuer_id)),
    ("issuedAt", FieldSlot::Text(|d| &mut d.issued_at)),
    ("description", FieldSlot::Text(|d| &mut d.description)),
    ("expiresAt", FieldSlot::Text(|d| &mut d.expires_at)),
    ("issuedTo", FieldSlot::Text(|d| &mut d.issued_to)),
    ("revoked", FieldSlot::Flag(|d| &mut d.revoked)),
    ("revokeReason", FieldSlot::Text(|d| &mut d.revoke_reason)),
    ("documentData", FieldSlot::Text(|d| &mut d.document_data)),
    ("registeredAt", FieldSlot::Text(|d| &mut d.registered_at)),
];

impl Document {
    /// Builds a document from the ten positional field values of
    /// `registerDocument` (the key already stripped off).
    ///
    /// # Arguments
    /// * `values` - Field values in [`FIELDS`] order
    ///
    /// # Returns
    /// The populated document, or `Invalid` if the slice is not exactly ten
    /// values long
    ///
    /// # Revoked flag
    /// Only the literal string `"true"` sets `revoked`; anything else,
    /// including `"TRUE"` or `"1"`, leaves it `false`.
    pub fn from_positional(values: &[String]) -> Result<Self, RegistryError> {
        if values.len() != FIELDS.len() {
            return Err(RegistryError::Invalid(format!(
                "expected {} document fields, got {}",
                FIELDS.len(),
                values.len()
            )));
        }

        let mut document = Document::default();
        for ((_, slot), raw) in FIELDS.iter().zip(values) {
            match slot {
                FieldSlot::Text(field) => *field(&mut document) = raw.clone(),
                FieldSlot::Flag(field) => *field(&mut document) = raw == "true",
            }
        }
        Ok(document)
    }

    /// Overwrites the fields named in `patch`, coercing by declared type.
    ///
    /// Keys that are not document tags are ignored. The patch is validated in
    /// full before anything is written, so a type mismatch leaves the
    /// document untouched.
    ///
    /// # Returns
    /// The tags that were applied, in table order
    ///
    /// # Errors
    /// `Invalid` naming the first field whose value has the wrong JSON type
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> Result<Vec<&'static str>, RegistryError> {
        let mut staged = self.clone();
        let mut applied = Vec::new();

        for (tag, slot) in FIELDS.iter() {
            let Some(value) = patch.get(*tag) else {
                continue;
            };
            match (slot, value) {
                (FieldSlot::Text(field), Value::String(s)) => *field(&mut staged) = s.clone(),
                (FieldSlot::Flag(field), Value::Bool(b)) => *field(&mut staged) = *b,
                (FieldSlot::Text(_), other) => {
                    return Err(RegistryError::Invalid(format!(
                        "field '{}' expects a string, got {}",
                        tag,
                        json_type_name(other)
                    )))
                }
                (FieldSlot::Flag(_), other) => {
                    return Err(RegistryError::Invalid(format!(
                        "field '{}' expects a boolean, got {}",
                        tag,
                        json_type_name(other)
                    )))
                }
            }
            applied.push(*tag);
        }

        *self = staged;
        Ok(applied)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One recorded version of a key, as rendered in a full `getDocument` reply.
///
/// Built from the ledger's history query and never written back.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Transaction that committed this version
    #[serde(rename = "TxId")]
    pub tx_id: String,

    /// Stored JSON at this version, `null` for a deletion marker
    #[serde(rename = "Value")]
    pub value: Value,

    /// Human-readable commit time
    #[serde(rename = "Timestamp")]
    pub timestamp: String,

    /// `"true"` or `"false"`; kept as a string for wire compatibility
    #[serde(rename = "IsDelete")]
    pub is_delete: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn positional(revoked: &str) -> Vec<String> {
        [
            "Passport", "IssuerA", "2024-01-01", "desc", "2030-01-01",
            "Alice", revoked, "", "payload", "2024-01-01",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_from_positional_maps_fields_in_order() {
        let doc = Document::from_positional(&positional("false")).unwrap();
        assert_eq!(doc.name, "Passport");
        assert_eq!(doc.issuer_id, "IssuerA");
        assert_eq!(doc.issued_to, "Alice");
        assert_eq!(doc.document_data, "payload");
        assert_eq!(doc.registered_at, "2024-01-01");
        assert!(!doc.revoked);
    }

    #[test]
    fn test_revoked_only_for_literal_true() {
        assert!(Document::from_positional(&positional("true")).unwrap().revoked);
        for other in ["TRUE", "True", "1", "yes", ""] {
            assert!(!Document::from_positional(&positional(other)).unwrap().revoked);
        }
    }

    #[test]
    fn test_from_positional_rejects_wrong_length() {
        let mut values = positional("false");
        values.pop();
        assert!(matches!(
            Document::from_positional(&values),
            Err(RegistryError::Invalid(_))
        ));
    }

    #[test]
    fn test_serializes_exactly_ten_tags() {
        let doc = Document::from_positional(&positional("false")).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 10);
        for (tag, _) in FIELDS.iter() {
            assert!(object.contains_key(*tag), "missing tag {}", tag);
        }
        assert_eq!(object["revoked"], json!(false));
    }

    #[test]
    fn test_apply_patch_changes_only_named_fields() {
        let mut doc = Document::from_positional(&positional("false")).unwrap();
        let before = doc.clone();
        let patch = json!({"description": "renewed", "bogus": 42});

        let applied = doc.apply_patch(patch.as_object().unwrap()).unwrap();

        assert_eq!(applied, vec!["description"]);
        assert_eq!(doc.description, "renewed");
        assert_eq!(Document { description: before.description.clone(), ..doc.clone() }, before);
    }

    #[test]
    fn test_apply_patch_type_mismatch_leaves_document_untouched() {
        let mut doc = Document::from_positional(&positional("false")).unwrap();
        let before = doc.clone();
        let patch = json!({"name": "Visa", "revoked": "yes"});

        let err = doc.apply_patch(patch.as_object().unwrap()).unwrap_err();

        assert!(err.to_string().contains("revoked"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_apply_patch_can_clear_revocation() {
        let mut doc = Document::from_positional(&positional("true")).unwrap();
        let patch = json!({"revoked": false});
        doc.apply_patch(patch.as_object().unwrap()).unwrap();
        assert!(!doc.revoked);
    }
}
