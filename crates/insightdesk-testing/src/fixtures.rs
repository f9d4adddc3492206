//! Sample directory data.

use insightdesk_types::{Field, Record};
use serde_json::json;

const DEPARTMENTS: [&str; 3] = ["Sales", "Engineering", "Marketing"];
const SENIORITY: [&str; 3] = ["Junior", "Senior", "Director"];

/// Fields that stay hidden until a record is unlocked.
pub const GATED_FIELDS: [&str; 2] = ["email", "phone"];

/// A fully disclosed employee. [`crate::FakeBackend`] redacts the gated
/// fields when serving it.
pub fn employee(id: u64) -> Record {
    let index = id as usize;
    let phone = if id % 4 == 0 {
        Field::missing()
    } else {
        Field::visible(json!(format!("+1-555-{:04}", id)))
    };
    Record::new(id)
        .with_field("name", Field::visible(json!(format!("Employee {}", id))))
        .with_field(
            "department",
            Field::visible(json!(DEPARTMENTS[index % DEPARTMENTS.len()])),
        )
        .with_field(
            "seniority",
            Field::visible(json!(SENIORITY[index % SENIORITY.len()])),
        )
        .with_field("email", Field::visible(json!(format!("employee{}@acme.test", id))))
        .with_field("phone", phone)
}

/// Employees with ids `1..=count`.
pub fn employees(count: u64) -> Vec<Record> {
    (1..=count).map(employee).collect()
}
