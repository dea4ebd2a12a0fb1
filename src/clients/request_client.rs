use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Request, RequestCreate, RequestFilter, RequestId, RequestStatus, StaffId};
use crate::request_actor::{RequestAction, RequestActionResult, RequestError};

/// Client for the Request store actor.
#[derive(Clone)]
pub struct RequestClient {
    inner: ResourceClient<Request>,
}

impl_basic_client!(RequestClient, Request, RequestError, request);

impl RequestClient {
    #[instrument(skip(self), fields(product_id = %params.product_id, district = %params.district))]
    pub async fn create_request(&self, params: RequestCreate) -> Result<RequestId, RequestError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(RequestError::from)
    }

    /// Requests still in progress, newest first.
    #[instrument(skip(self))]
    pub async fn list_active_requests(&self) -> Result<Vec<Request>, RequestError> {
        debug!("Sending request");
        self.inner
            .list(RequestFilter::active())
            .await
            .map_err(RequestError::from)
    }

    #[instrument(skip(self))]
    pub async fn list_requests(&self, filter: RequestFilter) -> Result<Vec<Request>, RequestError> {
        debug!("Sending request");
        self.inner.list(filter).await.map_err(RequestError::from)
    }

    /// Ask the store to apply one transition against its authoritative copy.
    #[instrument(skip(self, at))]
    pub async fn advance_request(
        &self,
        id: RequestId,
        to: RequestStatus,
        handled_by: StaffId,
        at: DateTime<Utc>,
    ) -> Result<Request, RequestError> {
        debug!("Sending request");
        let action = RequestAction::Advance { to, handled_by, at };
        match self.inner.perform_action(id, action).await {
            Ok(RequestActionResult::Advance(Ok(request))) => Ok(request),
            Ok(RequestActionResult::Advance(Err(rejected))) => Err(rejected.into()),
            Err(e) => Err(e.into()),
        }
    }
}
