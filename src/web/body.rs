//! Request body handling shared by every mutating endpoint.
//!
//! Clients may send either `application/json` or
//! `application/x-www-form-urlencoded`; both decode into the same type.

use crate::error::ApiError;
use actix_web::dev::Payload;
use actix_web::web::{Form, Json};
use actix_web::{Either, Error, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// JSON or form-encoded body.
#[derive(Debug)]
pub struct Body<T>(pub T);

impl<T> Body<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Body<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for Body<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Either::<Json<T>, Form<T>>::from_request(req, payload);
        Box::pin(async move {
            match fut.await {
                Ok(Either::Left(json)) => Ok(Body(json.into_inner())),
                Ok(Either::Right(form)) => Ok(Body(form.into_inner())),
                Err(err) => {
                    log::debug!("Rejected request body: {:?}", err);
                    Err(ApiError::bad_request("Invalid request body").into())
                }
            }
        })
    }
}

/// An id that may arrive as a JSON number or as a (possibly empty) string.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FlexibleId {
    Number(i64),
    Text(String),
}

impl FlexibleId {
    /// The id as a positive `i32`, if it is one.
    pub fn to_id(&self) -> Option<i32> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<i64>().ok()?,
        };
        i32::try_from(n).ok().filter(|n| *n > 0)
    }
}

/// Reads an optional [`FlexibleId`] as a positive id.
pub fn flexible_id(id: &Option<FlexibleId>) -> Option<i32> {
    id.as_ref().and_then(FlexibleId::to_id)
}

#[cfg(test)]
mod tests {
    use super::FlexibleId;

    #[test]
    fn test_flexible_id() {
        assert_eq!(FlexibleId::Number(42).to_id(), Some(42));
        assert_eq!(FlexibleId::Text(" 7 ".to_string()).to_id(), Some(7));
        assert_eq!(FlexibleId::Text(String::new()).to_id(), None);
        assert_eq!(FlexibleId::Text("abc".to_string()).to_id(), None);
        assert_eq!(FlexibleId::Number(0).to_id(), None);
        assert_eq!(FlexibleId::Number(i64::MAX).to_id(), None);
    }

    #[test]
    fn test_flexible_id_deserializes_from_json() {
        let id: FlexibleId = serde_json::from_str("15").unwrap();
        assert_eq!(id.to_id(), Some(15));
        let id: FlexibleId = serde_json::from_str("\"15\"").unwrap();
        assert_eq!(id.to_id(), Some(15));
    }
}
