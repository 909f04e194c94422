use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// Engine-wide event bus used for lifecycle notifications and diagnostics
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Events published by the stores, the filtered views and the evaluator
pub mod events {
    use super::Event;
    use crate::cell::Cell;
    use crate::dataset::ColumnKind;

    /// A dataset was stored under an id
    #[derive(Debug, Clone)]
    pub struct DatasetStored {
        pub dataset_id: String,
        pub row_count: usize,
        pub column_count: usize,
    }

    /// The global filter set was replaced (or cleared)
    #[derive(Debug, Clone)]
    pub struct FiltersReplaced {
        pub condition_count: usize,
    }

    /// A filtered view was recomputed from its raw dataset
    #[derive(Debug, Clone)]
    pub struct ViewRecomputed {
        pub dataset_id: String,
        pub raw_rows: usize,
        pub filtered_rows: usize,
    }

    /// A filter value could not be coerced to the column kind and was
    /// compared as supplied
    #[derive(Debug, Clone)]
    pub struct CoercionFallback {
        pub column: String,
        pub operator: String,
        pub value: Cell,
        pub target_kind: ColumnKind,
    }

    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        DatasetStored,
        FiltersReplaced,
        ViewRecomputed,
        CoercionFallback
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Subscribe with a closure receiving the concrete event type
    pub fn subscribe_fn<E, F>(&self, mut f: F)
    where
        E: Event,
        F: FnMut(&E) + Send + Sync + 'static,
    {
        self.subscribe::<E>(handler_from_fn(move |event: &dyn Event| {
            if let Some(event) = event.as_any().downcast_ref::<E>() {
                f(event);
            }
        }));
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}
