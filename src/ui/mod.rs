pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, header, info, muted, record, section, sql, status, success, timing, warn};
pub use table::{records_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
