pub mod list;
pub mod table;
pub mod unlock;

pub use list::ListReport;
pub use table::{Cell, CellStyle, Table};
pub use unlock::{UnlockReport, UnlockResult};

use is_terminal::IsTerminal;

/// Colors only when stdout is a terminal.
pub fn use_color() -> bool {
    std::io::stdout().is_terminal()
}
