// web-server/src/middleware/auth_guard.rs
//
// Route guard: requests for protected path prefixes must carry a valid
// session cookie; everything else passes through untouched. Invalid or
// missing sessions redirect to the login page (the caller at this boundary
// is a browser, not an API client). Fails closed: any verification failure
// is treated as an invalid session.
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::session::SESSION_COOKIE_NAME;
use common::verify_token;

const LOGIN_PATH: &str = "/login";

#[derive(Clone)]
pub struct RouteGuard {
    protected: Vec<String>,
    secret: Vec<u8>,
}

impl RouteGuard {
    pub fn new(protected: Vec<String>, secret: &str) -> Self {
        Self {
            protected,
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|prefix| path.starts_with(prefix))
    }
}

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RouteGuardMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardMiddleware {
            service,
            guard: self.clone(),
        }))
    }
}

pub struct RouteGuardMiddleware<S> {
    service: S,
    guard: RouteGuard,
}

impl<S, B> Service<ServiceRequest> for RouteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.guard.is_protected(req.path()) {
            let valid = req
                .cookie(SESSION_COOKIE_NAME)
                .map(|cookie| verify_token(cookie.value(), &self.guard.secret).is_some())
                .unwrap_or(false);

            if !valid {
                tracing::debug!("Redirecting unauthenticated request for {}", req.path());

                let (request, _payload) = req.into_parts();
                let response = HttpResponse::Found()
                    .insert_header((header::LOCATION, LOGIN_PATH))
                    .finish()
                    .map_into_right_body();

                return Box::pin(async move { Ok(ServiceResponse::new(request, response)) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
