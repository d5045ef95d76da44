pub mod draft;
pub mod settings;
