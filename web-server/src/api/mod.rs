// web-server/src/api/mod.rs
pub mod auth;
pub mod experts;
pub mod journal;
pub mod media;
pub mod plants;
pub mod signup;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        actix_web::web::scope("/api")
            .service(auth::login)
            .service(auth::logout)
            .service(auth::send_email)
            .service(signup::signup)
            .service(plants::list_plants)
            .service(plants::add_plant)
            .service(journal::add_entry)
            .service(media::upload_image)
            .service(experts::apply),
    );
}
