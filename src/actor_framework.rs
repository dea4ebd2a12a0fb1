use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any stored record must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + Serialize + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Update: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Filter: Send + Sync + Debug;

    /// Table name used to key change notifications
    const TABLE: &'static str;

    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and creation parameters
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, String>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), String> {
        Ok(())
    }
    fn on_update(&mut self, update: Self::Update) -> Result<(), String>;

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, String>;

    /// Whether an action result represents a committed write.
    fn action_committed(_result: &Self::ActionResult) -> bool {
        true
    }

    // --- Listing ---

    fn matches(&self, _filter: &Self::Filter) -> bool {
        true
    }

    /// Ordering applied to list results
    fn list_order(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error("Rejected: {0}")]
    Rejected(String),
}

// =============================================================================
// 2. CHANGE NOTIFICATIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
}

/// Emitted by a ResourceActor after every committed write.
#[derive(Debug, Clone)]
pub struct ChangeNotification {
    pub table: &'static str,
    pub kind: ChangeKind,
    pub payload: serde_json::Value,
}

// =============================================================================
// 3. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: T::Filter,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 4. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
    changes: broadcast::Sender<ChangeNotification>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (changes, _) = broadcast::channel(buffer_size.max(1));
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
            changes: changes.clone(),
        };
        let client = ResourceClient {
            sender,
            changes: Some(changes),
        };
        (actor, client)
    }

    pub async fn run(mut self) {
        debug!(table = T::TABLE, "ResourceActor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let id = (self.next_id_fn)();
                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create() {
                                let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                                continue;
                            }
                            self.notify(ChangeKind::Insert, &item);
                            self.store.insert(id.clone(), item);
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let mut items: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| item.matches(&filter))
                        .cloned()
                        .collect();
                    items.sort_by(|a, b| a.list_order(b));
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, update, respond_to } => {
                    let Some(item) = self.store.get_mut(&id) else {
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    // Hooks validate on a scratch copy so a rejected update leaves no trace.
                    let mut updated = item.clone();
                    if let Err(e) = updated.on_update(update) {
                        let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                        continue;
                    }
                    *item = updated.clone();
                    self.notify(ChangeKind::Update, &updated);
                    let _ = respond_to.send(Ok(updated));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let Some(item) = self.store.get_mut(&id) else {
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    match item.handle_action(action) {
                        Ok(result) => {
                            if T::action_committed(&result) {
                                let snapshot = item.clone();
                                self.notify(ChangeKind::Update, &snapshot);
                            }
                            let _ = respond_to.send(Ok(result));
                        }
                        Err(e) => {
                            let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                        }
                    }
                }
            }
        }
        debug!(table = T::TABLE, "ResourceActor stopped");
    }

    fn notify(&self, kind: ChangeKind, item: &T) {
        let payload = match serde_json::to_value(item) {
            Ok(value) => value,
            Err(e) => {
                warn!(table = T::TABLE, error = %e, "Failed to serialize change payload");
                serde_json::Value::Null
            }
        };
        // No subscribers is not an error.
        let _ = self.changes.send(ChangeNotification {
            table: T::TABLE,
            kind,
            payload,
        });
    }
}

// =============================================================================
// 5. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    changes: Option<broadcast::Sender<ChangeNotification>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            changes: self.changes.clone(),
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    /// Client without a change stream, used to drive mocks.
    #[cfg(test)]
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender, changes: None }
    }

    /// Subscribe to change notifications for this table.
    ///
    /// Clients built without a backing actor hand out an already closed stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotification> {
        match &self.changes {
            Some(changes) => changes.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Create { params, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Get { id, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn list(&self, filter: T::Filter) -> Result<Vec<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::List { filter, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Update { id, update, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Action { id, action, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}

// =============================================================================
// 6. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
    use std::sync::Arc;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq, Serialize)]
    struct Bin {
        id: String,
        label: String,
        count: u32,
    }

    #[derive(Debug)]
    struct BinCreate {
        label: String,
    }

    #[derive(Debug)]
    struct BinUpdate {
        label: Option<String>,
    }

    #[derive(Debug)]
    enum BinAction {
        Add(u32),
        Peek,
    }

    impl Entity for Bin {
        type Id = String;
        type CreateParams = BinCreate;
        type Update = BinUpdate;
        type Action = BinAction;
        type ActionResult = u32;
        type Filter = ();

        const TABLE: &'static str = "bins";

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create_params(id: String, params: BinCreate) -> Result<Self, String> {
            if params.label.is_empty() {
                return Err("label is required".to_string());
            }
            Ok(Self { id, label: params.label, count: 0 })
        }

        fn on_update(&mut self, update: BinUpdate) -> Result<(), String> {
            if let Some(label) = update.label {
                if label.is_empty() {
                    return Err("label is required".to_string());
                }
                self.label = label;
            }
            Ok(())
        }

        fn handle_action(&mut self, action: BinAction) -> Result<u32, String> {
            match action {
                BinAction::Add(n) => {
                    self.count += n;
                    Ok(self.count)
                }
                BinAction::Peek => Ok(self.count),
            }
        }

        fn action_committed(_result: &u32) -> bool {
            true
        }

        fn list_order(&self, other: &Self) -> Ordering {
            self.label.cmp(&other.label)
        }
    }

    fn start() -> ResourceClient<Bin> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("bin_{}", counter.fetch_add(1, AtomicOrdering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    // --- Test ---

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = start();

        let id = client.create(BinCreate { label: "b".into() }).await.unwrap();
        client.create(BinCreate { label: "a".into() }).await.unwrap();

        assert_eq!(client.perform_action(id.clone(), BinAction::Add(3)).await.unwrap(), 3);
        assert_eq!(client.perform_action(id.clone(), BinAction::Peek).await.unwrap(), 3);

        let labels: Vec<String> = client.list(()).await.unwrap().into_iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_record_untouched() {
        let client = start();
        let id = client.create(BinCreate { label: "kept".into() }).await.unwrap();

        let err = client
            .update(id.clone(), BinUpdate { label: Some(String::new()) })
            .await
            .unwrap_err();
        assert!(matches!(err, FrameworkError::Rejected(_)));

        let bin = client.get(id).await.unwrap().unwrap();
        assert_eq!(bin.label, "kept");
    }

    #[tokio::test]
    async fn test_missing_ids_and_invalid_creates() {
        let client = start();
        assert_eq!(
            client.perform_action("nope".into(), BinAction::Peek).await,
            Err(FrameworkError::NotFound("nope".into()))
        );
        assert!(matches!(
            client.create(BinCreate { label: String::new() }).await,
            Err(FrameworkError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_writes_emit_change_notifications() {
        let client = start();
        let mut changes = client.subscribe();

        let id = client.create(BinCreate { label: "x".into() }).await.unwrap();
        let insert = changes.recv().await.unwrap();
        assert_eq!(insert.table, "bins");
        assert_eq!(insert.kind, ChangeKind::Insert);
        assert_eq!(insert.payload["label"], "x");

        client.perform_action(id, BinAction::Add(1)).await.unwrap();
        let update = changes.recv().await.unwrap();
        assert_eq!(update.kind, ChangeKind::Update);
        assert_eq!(update.payload["count"], 1);
    }

    #[tokio::test]
    async fn test_closed_actor_reports_closed() {
        let (actor, client) = ResourceActor::<Bin>::new(4, || "bin".to_string());
        drop(actor);
        assert_eq!(client.get("bin".into()).await, Err(FrameworkError::ActorClosed));
    }
}
