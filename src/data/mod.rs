//! External data collaborators: the record source behind `/db` and the CSV
//! quote loader behind `/loadcsv`.

pub mod csv;
pub mod source;

pub use csv::{StockPrice, load_quotes};
pub use source::{DataSource, MemoryDataSource};
