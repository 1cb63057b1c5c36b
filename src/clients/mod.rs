pub mod fanza;
pub mod javbus;
pub mod translator;

pub use fanza::{FanzaClient, MovieSummary, SummarySource};
pub use javbus::JavbusClient;
pub use translator::{TranslateError, Translator};
