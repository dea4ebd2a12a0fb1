use std::cmp::Ordering;

use crate::actor_framework::Entity;
use crate::domain::{Request, RequestCreate, RequestFilter, RequestId};
use super::actions::{RequestAction, RequestActionResult};

impl Entity for Request {
    type Id = RequestId;
    type CreateParams = RequestCreate;
    type Update = ();
    type Action = RequestAction;
    type ActionResult = RequestActionResult;
    type Filter = RequestFilter;

    const TABLE: &'static str = "requests";

    fn id(&self) -> &RequestId {
        &self.id
    }

    /// Creates a new Request in the `requested` status.
    ///
    /// # Errors
    /// Rejects an empty product id or district.
    fn from_create_params(id: RequestId, params: RequestCreate) -> Result<Self, String> {
        if params.product_id.trim().is_empty() {
            return Err("product_id is required".to_string());
        }
        if params.district.trim().is_empty() {
            return Err("district is required".to_string());
        }
        Ok(Request::new(id, params.product_id, params.district, params.requested_at))
    }

    /// Requests only change through lifecycle transitions.
    fn on_update(&mut self, _update: ()) -> Result<(), String> {
        Err("requests change only through lifecycle transitions".to_string())
    }

    fn handle_action(&mut self, action: RequestAction) -> Result<RequestActionResult, String> {
        match action {
            RequestAction::Advance { to, handled_by, at } => {
                let outcome = self.advance(to, handled_by, at).map(|()| self.clone());
                Ok(RequestActionResult::Advance(outcome))
            }
        }
    }

    fn action_committed(result: &RequestActionResult) -> bool {
        match result {
            RequestActionResult::Advance(outcome) => outcome.is_ok(),
        }
    }

    fn matches(&self, filter: &RequestFilter) -> bool {
        filter.statuses.is_empty() || filter.statuses.contains(&self.status)
    }

    /// Newest first; ties broken by id so listings are stable.
    fn list_order(&self, other: &Self) -> Ordering {
        other
            .requested_at
            .cmp(&self.requested_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}
