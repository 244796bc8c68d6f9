use crate::auth::Capabilities;
use crate::error::{ApiError, ApiResult};
use crate::user::touch_last_active;
use actix_session::SessionExt;
use actix_web::dev::{
    self, Extensions, Payload, Service, ServiceRequest, ServiceResponse, Transform,
};
use actix_web::{web::Data, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use sea_orm::{DatabaseConnection, DbErr};
use std::rc::Rc;

/// Session key holding the authenticated user id.
pub const SESSION_USER_ID: &str = "user_id";
/// Session key holding the role id at login time. Authorization always
/// reloads the role from the database.
pub const SESSION_ROLE_ID: &str = "role_id";

/// Client data stored for a single request cycle.
#[derive(Clone, Debug, Default)]
pub struct ClientCtxInner {
    /// Capability context. None is a guest.
    pub caps: Option<Capabilities>,
    /// Set when the session names a user but the lookup failed.
    pub load_error: Option<String>,
}

impl ClientCtxInner {
    pub async fn from_session(user_id: Option<i32>, db: &DatabaseConnection) -> Self {
        let user_id = match user_id {
            Some(id) => id,
            None => return Self::default(),
        };

        let caps = match Capabilities::load(db, user_id).await {
            Ok(caps) => caps,
            Err(err) => {
                log::error!("Unable to load capabilities for user {}: {}", user_id, err);
                return Self {
                    caps: None,
                    load_error: Some(err.to_string()),
                };
            }
        };

        if caps.is_some() {
            if let Err(err) = touch_last_active(db, user_id).await {
                log::warn!("Unable to record activity for user {}: {}", user_id, err);
            }
        } else {
            log::debug!("Session refers to missing user {}", user_id);
        }

        Self {
            caps,
            load_error: None,
        }
    }
}

/// Client context passed to routes.
/// Wraps ClientCtxInner, which is set at the beginning of the request.
#[derive(Clone, Debug)]
pub struct ClientCtx(Data<ClientCtxInner>);

impl Default for ClientCtx {
    fn default() -> Self {
        Self(Data::new(ClientCtxInner::default()))
    }
}

impl ClientCtx {
    pub fn get_or_default_from_extensions(extensions: &mut Extensions) -> Self {
        match extensions.get::<Data<ClientCtxInner>>() {
            Some(inner) => Self(inner.clone()),
            None => {
                let inner = Data::new(ClientCtxInner::default());
                extensions.insert(inner.clone());
                Self(inner)
            }
        }
    }

    pub fn caps(&self) -> Option<&Capabilities> {
        self.0.caps.as_ref()
    }

    pub fn get_id(&self) -> Option<i32> {
        self.caps().map(|c| c.user_id)
    }

    /// Require user to be logged in. Returns the capability context, 401
    /// for guests, or 500 when the session user could not be loaded.
    pub fn require_login(&self) -> ApiResult<&Capabilities> {
        match (self.caps(), &self.0.load_error) {
            (Some(caps), _) => Ok(caps),
            (None, Some(err)) => Err(ApiError::Database(DbErr::Custom(err.clone()))),
            (None, None) => Err(ApiError::Unauthorized),
        }
    }
}

/// This implementation is what actually provides the `client: ClientCtx` in the parameters of route functions.
impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(ClientCtx::get_or_default_from_extensions(
            &mut req.extensions_mut(),
        )))
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for ClientCtx
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientCtxMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientCtxMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Client context middleware
pub struct ClientCtxMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ClientCtxMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();

        let user_id = match req.get_session().get::<i32>(SESSION_USER_ID) {
            Ok(id) => id,
            Err(err) => {
                log::error!("Unable to read session data in middleware: {}", err);
                None
            }
        };
        let db = req.app_data::<Data<DatabaseConnection>>().cloned();

        Box::pin(async move {
            // Without a database there is no one to authenticate.
            if let Some(db) = db {
                let inner = ClientCtxInner::from_session(user_id, db.get_ref()).await;
                req.extensions_mut().insert(Data::new(inner));
            }

            svc.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(caps: Option<Capabilities>, load_error: Option<&str>) -> ClientCtx {
        ClientCtx(Data::new(ClientCtxInner {
            caps,
            load_error: load_error.map(str::to_string),
        }))
    }

    #[test]
    fn test_require_login() {
        let member = ctx(Some(Capabilities::new(4, "member", 2)), None);
        assert_eq!(member.require_login().map(|c| c.user_id).ok(), Some(4));

        assert!(matches!(
            ctx(None, None).require_login(),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            ctx(None, Some("connection reset")).require_login(),
            Err(ApiError::Database(_))
        ));
    }
}
