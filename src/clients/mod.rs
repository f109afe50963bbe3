pub mod notepad_client;

pub use notepad_client::NotepadClient;
