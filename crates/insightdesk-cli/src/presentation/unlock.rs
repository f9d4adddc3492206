use insightdesk_sdk::{Notice, Record, RecordId};
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::table::{Cell, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockResult {
    Unlocked,
    UpgradeRequired,
    /// Credit status unknown; nothing charged.
    Aborted,
    Failed,
    /// The user declined to spend a credit.
    Cancelled,
}

impl UnlockResult {
    pub fn is_success(self) -> bool {
        matches!(self, UnlockResult::Unlocked | UnlockResult::Cancelled)
    }
}

pub struct UnlockReport<'a> {
    pub id: RecordId,
    pub result: UnlockResult,
    pub auto_charged: bool,
    pub record: Option<&'a Record>,
    pub notices: &'a [Notice],
}

impl UnlockReport<'_> {
    pub fn render_plain(&self, color: bool) -> String {
        let mut out = String::new();
        match self.result {
            UnlockResult::Cancelled => out.push_str("Unlock cancelled; no credit was spent.\n"),
            UnlockResult::Aborted => {
                out.push_str("Could not check your credit balance; nothing was charged.\n")
            }
            _ => {}
        }

        for notice in self.notices {
            out.push_str(&notice.message());
            out.push('\n');
        }

        if self.result == UnlockResult::Unlocked
            && let Some(record) = self.record
        {
            let mut table = Table::new(vec!["FIELD".to_string(), "VALUE".to_string()]);
            for name in record.fields.keys() {
                table.push(vec![Cell::plain(name.clone()), Cell::for_field(record, name)]);
            }
            out.push('\n');
            out.push_str(&table.render(color));
        }
        out
    }

    pub fn render_json(&self) -> Value {
        let record = self.record.map(|record| {
            let fields: Map<String, Value> = record
                .fields
                .keys()
                .map(|name| (name.clone(), Cell::for_field(record, name).to_json()))
                .collect();
            Value::Object(fields)
        });
        json!({
            "id": self.id,
            "result": self.result,
            "auto_charged": self.auto_charged,
            "record": record,
            "notices": self.notices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insightdesk_sdk::Field;

    #[test]
    fn test_unlocked_report_lists_fields() {
        let record = Record::new(4)
            .with_field("email", Field::visible(json!("dee@acme.test")))
            .with_field("phone", Field::missing());
        let notices = [Notice::Unlocked { record: RecordId(4) }];
        let report = UnlockReport {
            id: RecordId(4),
            result: UnlockResult::Unlocked,
            auto_charged: false,
            record: Some(&record),
            notices: &notices,
        };

        assert_eq!(
            report.render_plain(false),
            "Record 4 unlocked.\n\nFIELD  VALUE\nemail  dee@acme.test\nphone  —\n"
        );
        assert_eq!(report.render_json()["record"]["phone"], Value::Null);
    }

    #[test]
    fn test_cancelled_report() {
        let report = UnlockReport {
            id: RecordId(4),
            result: UnlockResult::Cancelled,
            auto_charged: false,
            record: None,
            notices: &[],
        };
        assert_eq!(report.render_plain(false), "Unlock cancelled; no credit was spent.\n");
        assert!(report.result.is_success());
        assert_eq!(report.render_json()["result"], json!("cancelled"));
    }
}
