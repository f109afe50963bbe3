pub mod csv_row;
pub mod notepad;
pub mod result_item;
pub mod submission;

pub use csv_row::{CsvStatistic, CSV_HEADER};
pub use notepad::{NotepadContent, StudentContent};
pub use result_item::{current_timestamp, Extension, ResultItem, TIMESTAMP_FORMAT};
pub use submission::{StudentRecord, Submission};
