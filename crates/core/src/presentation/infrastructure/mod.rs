pub mod console_report_presenter;
pub mod overlay_presenter;
