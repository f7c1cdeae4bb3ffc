mod modifier_controller;

pub use modifier_controller::{ValidateSelectionsRequest, ValidateSelectionsResponse};

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    modifier_controller::configure(cfg);
}
