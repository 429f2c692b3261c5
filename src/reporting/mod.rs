pub mod assembler;
pub mod csv_export;
pub mod formatter;
pub mod metadata;

pub use assembler::write_reports;
pub use metadata::ReportMetadata;
