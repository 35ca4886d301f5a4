use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};

use actix_service::{forward_ready, Service, Transform};
use actix_utils::future::{ready, Ready};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{Error, HttpRequest, HttpResponse};
use futures_util::future::{CatchUnwind, FutureExt};
use pin_project_lite::pin_project;

/// Turns a panicking handler into a `500 Internal Server Error` response.
pub struct CatchPanic;

impl<S, B> Transform<S, ServiceRequest> for CatchPanic
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = CatchPanicMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CatchPanicMiddleware { service }))
    }
}

pub struct CatchPanicMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for CatchPanicMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = CatchPanicFuture<S::Future>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request = req.request().clone();

        CatchPanicFuture {
            fut: AssertUnwindSafe(self.service.call(req)).catch_unwind(),
            request,
        }
    }
}

pin_project! {
    pub struct CatchPanicFuture<F> {
        #[pin]
        fut: CatchUnwind<AssertUnwindSafe<F>>,
        request: HttpRequest,
    }
}

impl<F, B> Future for CatchPanicFuture<F>
where
    F: Future<Output = Result<ServiceResponse<B>, Error>>,
    B: MessageBody + 'static,
{
    type Output = Result<ServiceResponse<BoxBody>, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match std::task::ready!(this.fut.poll(cx)) {
            Ok(result) => Poll::Ready(result.map(ServiceResponse::map_into_boxed_body)),
            Err(panic) => {
                tracing::error!(
                    "Handler for {} {} panicked: {}",
                    this.request.method(),
                    this.request.path(),
                    panic_message(&*panic)
                );

                let response = HttpResponse::InternalServerError().json(serde_json::json!({
                    "message": "Internal server error",
                }));

                Poll::Ready(Ok(ServiceResponse::new(this.request.clone(), response)))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App};

    use super::*;

    async fn boom() -> HttpResponse {
        panic!("boom")
    }

    async fn fine() -> HttpResponse {
        HttpResponse::Ok().body("fine")
    }

    #[actix_web::test]
    async fn test_panic_becomes_internal_server_error() {
        let app = test::init_service(
            App::new()
                .wrap(CatchPanic)
                .route("/boom", web::get().to(boom))
                .route("/fine", web::get().to(fine)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/boom").to_request()).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = test::call_service(&app, test::TestRequest::get().uri("/fine").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "fine");
    }
}
