pub mod csv_export;
pub mod notepad_format;
pub mod record_parser;
pub mod result_catalog;
pub mod result_store;
pub mod students_register;
pub mod submission_parser;

pub use notepad_format::NotepadFormat;
pub use record_parser::RecordParser;
pub use result_store::{PruneReport, ResultStore};
pub use students_register::StudentsRegister;
