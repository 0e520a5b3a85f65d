pub mod settings;

pub use settings::{EngineSettings, InputEncoding, LedgerSettings, YearRange, CONFIG_ENV_VAR};
