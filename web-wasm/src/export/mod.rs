pub mod download;

pub use download::download_report;
