mod analyze;

pub use analyze::AnalyzeSettings;
pub use analyze::analyze;
