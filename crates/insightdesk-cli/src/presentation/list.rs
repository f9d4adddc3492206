use insightdesk_sdk::{DirectorySnapshot, Notice, Record, ViewStatus};
use serde_json::{Map, Value, json};

use super::table::{Cell, Table};

/// One fetched page, ready to print.
pub struct ListReport<'a> {
    pub snapshot: &'a DirectorySnapshot,
    pub notices: &'a [Notice],
    pub columns: Vec<String>,
}

impl<'a> ListReport<'a> {
    /// `requested` empty means every field seen on the page, in name order.
    pub fn new(snapshot: &'a DirectorySnapshot, notices: &'a [Notice], requested: &[String]) -> Self {
        let columns = if requested.is_empty() {
            let mut names: Vec<String> = Vec::new();
            for record in &snapshot.records {
                for name in record.fields.keys() {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
            }
            names.sort();
            names
        } else {
            requested.iter().map(|c| c.trim().to_string()).collect()
        };
        Self {
            snapshot,
            notices,
            columns,
        }
    }

    fn row(&self, record: &Record) -> Vec<Cell> {
        std::iter::once(Cell::plain(record.id.to_string()))
            .chain(self.columns.iter().map(|column| Cell::for_field(record, column)))
            .collect()
    }

    pub fn table(&self) -> Table {
        let headers = std::iter::once("ID".to_string())
            .chain(self.columns.iter().map(|c| c.to_uppercase()))
            .collect();
        let mut table = Table::new(headers);
        for record in &self.snapshot.records {
            table.push(self.row(record));
        }
        table
    }

    pub fn render_plain(&self, color: bool) -> String {
        let mut out = String::new();
        let page = &self.snapshot.page;

        if matches!(self.snapshot.status, ViewStatus::Normal) {
            if self.snapshot.records.is_empty() {
                out.push_str("No records match.\n");
            } else {
                let table = self.table();
                out.push_str(&table.render(color));
                out.push('\n');
                let sizes: Vec<String> = page.size_options.iter().map(usize::to_string).collect();
                out.push_str(&format!(
                    "Page {} of {} | {} results | {} per page (choose from {})\n",
                    page.index + 1,
                    page.page_count().max(1),
                    page.total_count,
                    page.size,
                    sizes.join(", ")
                ));
                if table.rows().iter().flatten().any(Cell::is_locked) {
                    out.push_str("Hidden fields show as \"Unlock\"; run `insightdesk unlock <ID>` to reveal a record.\n");
                }
            }
        }

        for notice in self.notices {
            out.push_str(&notice.message());
            out.push('\n');
        }
        out
    }

    pub fn render_json(&self) -> Value {
        let page = &self.snapshot.page;
        let records: Vec<Value> = self
            .snapshot
            .records
            .iter()
            .map(|record| {
                let mut row = Map::new();
                row.insert("id".to_string(), json!(record.id));
                for column in &self.columns {
                    row.insert(column.clone(), Cell::for_field(record, column).to_json());
                }
                Value::Object(row)
            })
            .collect();
        let filters: Map<String, Value> = self
            .snapshot
            .filters
            .iter()
            .map(|(label, value)| (label.as_str().to_string(), json!(value)))
            .collect();

        json!({
            "page": page.index + 1,
            "page_count": page.page_count(),
            "per_page": page.size,
            "size_options": page.size_options,
            "total_count": page.total_count,
            "status": self.snapshot.status,
            "filters": filters,
            "sort": {
                "field": self.snapshot.sort.field(),
                "direction": self.snapshot.sort.direction(),
            },
            "records": records,
            "notices": self.notices,
            "error": self.snapshot.last_error,
        })
    }
}
