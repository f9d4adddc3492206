use insightdesk_types::{Record, RecordId};

/// Where a merged record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// An existing row was updated in place at this position.
    Merged(usize),
    /// The record was not on the page and was appended at this position.
    Appended(usize),
}

/// The currently fetched page of records, in backend order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListCache {
    records: Vec<Record>,
}

impl ListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Wholesale replacement after a list fetch.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Point update by identity. The fetched fields are shallow-merged into
    /// the existing row, leaving order and every other row untouched; a record
    /// not on the current page is appended.
    pub fn merge_by_id(&mut self, update: Record) -> MergeOutcome {
        match self.position(update.id) {
            Some(position) => {
                self.records[position].merge(update);
                MergeOutcome::Merged(position)
            }
            None => {
                self.records.push(update);
                MergeOutcome::Appended(self.records.len() - 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insightdesk_types::Field;
    use serde_json::json;

    fn row(id: u64) -> Record {
        Record::new(id)
            .with_field("name", Field::visible(json!(format!("person-{}", id))))
            .with_field("email", Field::hidden())
    }

    #[test]
    fn test_merge_preserves_length_order_and_other_rows() {
        let original: Vec<Record> = (1..=5).map(row).collect();
        let mut cache = ListCache::from_records(original.clone());

        let update = Record::new(3).with_field("email", Field::visible(json!("p3@acme.test")));
        assert_eq!(cache.merge_by_id(update), MergeOutcome::Merged(2));

        assert_eq!(cache.len(), 5);
        for (position, record) in cache.records().iter().enumerate() {
            if position == 2 {
                assert_eq!(record.id, RecordId(3));
                assert_eq!(record.field("name"), original[2].field("name"));
                assert_eq!(
                    record.field("email"),
                    Some(&Field::visible(json!("p3@acme.test")))
                );
            } else {
                assert_eq!(record, &original[position]);
            }
        }
    }

    #[test]
    fn test_merge_appends_when_absent() {
        let mut cache = ListCache::from_records(vec![row(1), row(2)]);
        let outcome = cache.merge_by_id(row(9));
        assert_eq!(outcome, MergeOutcome::Appended(2));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.records()[2].id, RecordId(9));
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut cache = ListCache::from_records(vec![row(1), row(2)]);
        cache.replace(vec![row(7)]);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(RecordId(1)).is_none());
        assert!(cache.get(RecordId(7)).is_some());
    }
}
