pub mod cancel;
pub mod config;
pub mod engine;
pub mod errors;
pub mod queue;
pub mod replace;
pub mod results;
pub mod walker;

pub use cancel::CancelToken;
pub use config::ReplaceConfig;
pub use engine::run;
pub use errors::{ReplaceError, ReplaceResult};
pub use results::ReplaceSummary;
