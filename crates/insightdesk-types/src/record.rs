use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::field::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id)
    }
}

/// One directory entity (an employee, a lead, a source contact).
///
/// Every attribute other than the id is a [`Field`], keyed by its backend
/// attribute name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Field>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn has_hidden_fields(&self) -> bool {
        self.fields.values().any(Field::is_hidden)
    }

    /// Shallow merge: every field present in `update` replaces the field of
    /// the same name; fields absent from `update` are left untouched.
    pub fn merge(&mut self, update: Record) {
        for (name, field) in update.fields {
            self.fields.insert(name, field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Visibility;
    use serde_json::json;

    #[test]
    fn test_merge_overlays_only_present_fields() {
        let mut record = Record::new(7)
            .with_field("name", Field::visible(json!("Ada")))
            .with_field("email", Field::hidden())
            .with_field("phone", Field::missing());

        let update = Record::new(7).with_field("email", Field::visible(json!("ada@example.com")));
        record.merge(update);

        assert_eq!(record.fields.len(), 3);
        assert_eq!(record.field("name"), Some(&Field::visible(json!("Ada"))));
        assert_eq!(
            record.field("email").map(|f| f.visibility_status),
            Some(Visibility::Visible)
        );
        assert_eq!(record.field("phone"), Some(&Field::missing()));
        assert!(!record.has_hidden_fields());
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = Record::new(3).with_field("name", Field::visible(json!("Bo")));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"id": 3, "name": {"value": "Bo", "visibility_status": "visible"}})
        );
    }
}
