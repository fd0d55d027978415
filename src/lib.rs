pub mod compiler;
pub mod config;
pub mod dsl;
pub mod error;
pub mod net;

pub use compiler::core::{ResourcingMap, Translator};
pub use config::TranslatorOptions;
pub use dsl::Diagram;
pub use error::TranslateError;
pub use net::Net;
