//! 受保护路由的认证中间件
//!
//! 校验成功后把 `AuthenticatedUser` 放入请求扩展，handler 通过
//! `web::ReqData<AuthenticatedUser>` 取用。

use std::rc::Rc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{error, info, trace};

use crate::api::services::helpers::{error_from_app, extract_access_token};
use crate::auth::AuthGuard;
use crate::errors::AppError;

#[derive(Clone, Copy, Debug, Default)]
pub struct RequireAuth;

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn reject(req: ServiceRequest, err: &AppError) -> ServiceResponse<EitherBody<B>> {
        info!("Authentication failed for {}: {}", req.path(), err.message());
        req.into_response(error_from_app(err).map_into_right_body())
    }
}

impl<S, B> Service<ServiceRequest> for RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(guard) = req.app_data::<web::Data<AuthGuard>>().cloned() else {
                error!("AuthGuard is not registered as app data");
                let err = AppError::internal("auth guard missing");
                return Ok(Self::reject(req, &err));
            };

            let token = extract_access_token(req.request());
            match guard.authenticate(token.as_deref()) {
                Ok(user) => {
                    trace!("Authenticated user {}", user.user_id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => Ok(Self::reject(req, &err)),
            }
        })
    }
}
