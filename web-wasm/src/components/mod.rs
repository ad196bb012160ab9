pub mod error_banner;
pub mod header;
pub mod progress_bar;
pub mod report_view;
pub mod section;
pub mod upload_area;
