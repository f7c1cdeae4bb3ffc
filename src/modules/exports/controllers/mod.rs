mod export_controller;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    export_controller::configure(cfg);
}
