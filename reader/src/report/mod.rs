pub mod model;

pub use model::DetectorReport;
