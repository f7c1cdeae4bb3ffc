mod report_controller;
mod saved_report_controller;

pub use report_controller::{attachment, ReportQuery};
pub use saved_report_controller::EXECUTION_ID_HEADER;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    report_controller::configure(cfg);
}
