//! Filtered views: each raw dataset with the global filter set applied

use std::sync::Arc;

use ahash::AHashSet;
use parking_lot::Mutex;
use tv_core::events::events::ViewRecomputed;
use tv_core::{Dataset, EngineConfig, EventBus, Result};

use crate::cache::BoundedCache;
use crate::filter::{FilterEvaluator, FilterSet};
use crate::store::{DatasetId, DatasetStore, FilterSetStore};

struct ViewState {
    views: BoundedCache<DatasetId, Arc<Dataset>>,
    /// Cached views computed under a filter set that has since changed
    stale: AHashSet<DatasetId>,
    /// Bumped on every filter change; a recompute that started under an
    /// older generation does not cache its result
    generation: u64,
}

/// Owns the dataset and filter stores and keeps one derived view per
/// dataset id. Views are always recomputed from the raw dataset, never
/// patched incrementally.
pub struct FilteredViews {
    datasets: Arc<DatasetStore>,
    filters: Arc<FilterSetStore>,
    evaluator: FilterEvaluator,
    state: Mutex<ViewState>,
    events: Option<Arc<EventBus>>,
}

impl FilteredViews {
    pub fn new(datasets: Arc<DatasetStore>, filters: Arc<FilterSetStore>, capacity: Option<usize>) -> Self {
        Self {
            datasets,
            filters,
            evaluator: FilterEvaluator::new(),
            state: Mutex::new(ViewState {
                views: BoundedCache::new(capacity),
                stale: AHashSet::new(),
                generation: 0,
            }),
            events: None,
        }
    }

    /// Build stores and views from configuration, persisting filters to
    /// `config.filter_file` and reporting on `events`
    pub fn from_config(config: &EngineConfig, events: Arc<EventBus>) -> Self {
        let datasets = DatasetStore::new(config.dataset_capacity).with_events(events.clone());
        let filters = FilterSetStore::json_file(&config.filter_file).with_events(events.clone());
        Self::new(Arc::new(datasets), Arc::new(filters), config.view_capacity).with_events(events)
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.evaluator = FilterEvaluator::with_events(events.clone());
        self.events = Some(events);
        self
    }

    pub fn datasets(&self) -> &Arc<DatasetStore> {
        &self.datasets
    }

    pub fn filters(&self) -> &Arc<FilterSetStore> {
        &self.filters
    }

    /// Recompute the view for `id` from its raw dataset and the current
    /// filter set. If the filter set changes while this runs, the result is
    /// returned but not cached.
    pub fn recompute(&self, id: &DatasetId) -> Result<Arc<Dataset>> {
        let generation = self.state.lock().generation;
        let raw = self.datasets.get(id)?;
        let filters = self.filters.load();
        let view = if filters.is_empty() {
            raw.clone()
        } else {
            Arc::new(self.evaluator.apply(&raw, &filters)?)
        };

        {
            let mut state = self.state.lock();
            if state.generation != generation {
                tracing::debug!("Filters changed while recomputing view {}; not caching it", id);
                return Ok(view);
            }
            state.views.insert(id.clone(), view.clone());
            state.stale.remove(id);
        }

        tracing::debug!(
            "Recomputed view {}: {} of {} rows",
            id,
            view.num_rows(),
            raw.num_rows()
        );
        if let Some(events) = &self.events {
            events.publish(ViewRecomputed {
                dataset_id: id.to_string(),
                raw_rows: raw.num_rows(),
                filtered_rows: view.num_rows(),
            });
        }
        Ok(view)
    }

    /// Filtered view for `id`, recomputed if missing or stale
    pub fn get(&self, id: &DatasetId) -> Result<Arc<Dataset>> {
        {
            let mut state = self.state.lock();
            if !state.stale.contains(id) {
                if let Some(view) = state.views.get(id) {
                    return Ok(view);
                }
            }
        }
        self.recompute(id)
    }

    /// Upload flow: store a new dataset, clear the filter set and compute
    /// its (unfiltered) view
    pub fn ingest(&self, dataset: Dataset) -> Result<DatasetId> {
        let id = self.datasets.put(dataset);
        self.filters_changed_by(self.filters.clear(), Some(&id))?;
        Ok(id)
    }

    /// Upload flow re-using an existing id
    pub fn ingest_at(&self, id: DatasetId, dataset: Dataset) -> Result<()> {
        self.datasets.put_at(id.clone(), dataset);
        self.filters_changed_by(self.filters.clear(), Some(&id))
    }

    /// Replace the global filter set. Every cached view becomes stale;
    /// `active` is recomputed immediately.
    /// A set that does not fit the active dataset is rejected before
    /// anything is persisted.
    pub fn replace_filters(&self, filters: FilterSet, active: Option<&DatasetId>) -> Result<()> {
        self.check_against(&filters, active)?;
        self.filters_changed_by(self.filters.replace(filters), active)
    }

    /// Append to the global filter set, then behave like a replacement
    pub fn append_filters(&self, more: FilterSet, active: Option<&DatasetId>) -> Result<()> {
        self.check_against(&more, active)?;
        self.filters_changed_by(self.filters.append(more).map(|_| ()), active)
    }

    pub fn clear_filters(&self, active: Option<&DatasetId>) -> Result<()> {
        self.filters_changed_by(self.filters.clear(), active)
    }

    /// Ids whose cached view is out of date
    pub fn stale_ids(&self) -> Vec<DatasetId> {
        let state = self.state.lock();
        let mut ids: Vec<_> = state.stale.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop every cached view
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.views.clear();
        state.stale.clear();
    }

    fn check_against(&self, filters: &FilterSet, active: Option<&DatasetId>) -> Result<()> {
        match active {
            Some(id) => {
                let dataset = self.datasets.get(id)?;
                self.evaluator.check(&dataset, filters)
            }
            None => Ok(()),
        }
    }

    fn filters_changed_by(&self, outcome: Result<()>, active: Option<&DatasetId>) -> Result<()> {
        outcome?;
        self.mark_all_stale();
        match active {
            Some(id) => self.recompute(id).map(|_| ()),
            None => Ok(()),
        }
    }

    fn mark_all_stale(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        let ids = state.views.keys();
        state.stale.extend(ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterCondition, FilterOperator};
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use crate::store::{FilterBackend, MemoryBackend};
    use parking_lot::Mutex as PlMutex;
    use std::sync::mpsc::{self, Receiver, Sender};
    use tv_core::{Cell, CoreError};

    type Gate = Arc<PlMutex<Option<(Sender<()>, Receiver<()>)>>>;

    /// Memory backend whose next read, once armed, reports that it has
    /// loaded and then waits to be released
    struct GatedBackend {
        inner: MemoryBackend,
        gate: Gate,
    }

    impl FilterBackend for GatedBackend {
        fn read(&self) -> Result<Option<FilterSet>> {
            let filters = self.inner.read()?;
            let armed = self.gate.lock().take();
            if let Some((loaded, release)) = armed {
                loaded.send(()).unwrap();
                release.recv().unwrap();
            }
            Ok(filters)
        }

        fn write(&self, filters: &FilterSet) -> Result<()> {
            self.inner.write(filters)
        }
    }

    fn sales() -> Dataset {
        Dataset::from_columns(vec![
            (
                "region",
                Arc::new(StringArray::from(vec!["east", "west", "east"])) as ArrayRef,
            ),
            (
                "sales",
                Arc::new(Int64Array::from(vec![Some(10), None, Some(30)])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    fn views() -> FilteredViews {
        FilteredViews::new(
            Arc::new(DatasetStore::default()),
            Arc::new(FilterSetStore::in_memory()),
            None,
        )
    }

    fn east() -> FilterSet {
        vec![FilterCondition::new("region", FilterOperator::Eq, "east")]
    }

    #[test]
    fn test_ingest_clears_filters() {
        let views = views();
        views.filters().replace(east()).unwrap();

        let id = views.ingest(sales()).unwrap();
        assert!(views.filters().load().is_empty());
        assert_eq!(views.get(&id).unwrap().num_rows(), 3);
    }

    #[test]
    fn test_replace_recomputes_active_view() {
        let views = views();
        let id = views.ingest(sales()).unwrap();

        views.replace_filters(east(), Some(&id)).unwrap();
        let view = views.get(&id).unwrap();
        assert_eq!(
            view.cells("region").unwrap(),
            vec![Cell::from("east"), Cell::from("east")]
        );
        assert!(views.stale_ids().is_empty());
    }

    #[test]
    fn test_other_views_recompute_lazily() {
        let views = views();
        let first = views.ingest(sales()).unwrap();
        let second = views.ingest(sales()).unwrap();
        // Both views are cached; the second upload left the first one stale
        assert_eq!(views.stale_ids(), vec![first.clone()]);

        views.replace_filters(east(), Some(&second)).unwrap();
        assert_eq!(views.stale_ids(), vec![first.clone()]);
        assert_eq!(views.get(&first).unwrap().num_rows(), 2);
        assert!(views.stale_ids().is_empty());
    }

    #[test]
    fn test_unknown_dataset() {
        let views = views();
        let err = views.get(&DatasetId::from("9")).unwrap_err();
        assert!(matches!(err, CoreError::DatasetNotFound(_)));
    }

    #[test]
    fn test_invalid_filter_is_rejected_before_persisting() {
        let views = views();
        let id = views.ingest(sales()).unwrap();
        let bad = vec![FilterCondition::new("profit", FilterOperator::Gt, 1i64)];
        let err = views.replace_filters(bad, Some(&id)).unwrap_err();
        assert!(matches!(err, CoreError::UnknownColumn { .. }));
        // Nothing was persisted and the view still reads
        assert!(views.filters().load().is_empty());
        assert_eq!(views.get(&id).unwrap().num_rows(), 3);
    }

    #[test]
    fn test_append_filters() {
        let views = views();
        let id = views.ingest(sales()).unwrap();
        views.replace_filters(east(), Some(&id)).unwrap();
        views
            .append_filters(
                vec![FilterCondition::new("sales", FilterOperator::Gt, 15i64)],
                Some(&id),
            )
            .unwrap();
        assert_eq!(views.get(&id).unwrap().cells("sales").unwrap(), vec![Cell::from(30i64)]);
    }

    #[test]
    fn test_recompute_overtaken_by_filter_change_is_not_cached() {
        let gate: Gate = Arc::new(PlMutex::new(None));
        let backend = GatedBackend {
            inner: MemoryBackend::default(),
            gate: gate.clone(),
        };
        let views = FilteredViews::new(
            Arc::new(DatasetStore::default()),
            Arc::new(FilterSetStore::new(Box::new(backend))),
            None,
        );
        let id = views.ingest(sales()).unwrap();

        let (loaded_tx, loaded_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *gate.lock() = Some((loaded_tx, release_rx));

        std::thread::scope(|s| {
            // Reader loads the empty set, then stalls before caching
            let reader = s.spawn(|| views.recompute(&id).unwrap());
            loaded_rx.recv().unwrap();
            views.replace_filters(east(), Some(&id)).unwrap();
            release_tx.send(()).unwrap();
            assert_eq!(reader.join().unwrap().num_rows(), 3);
        });

        assert_eq!(views.get(&id).unwrap().num_rows(), 2);
        assert!(views.stale_ids().is_empty());
        assert_eq!(views.filters().load(), east());
    }

    #[test]
    fn test_events_report_recomputation() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(PlMutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe_fn::<ViewRecomputed, _>(move |e| sink.lock().push((e.raw_rows, e.filtered_rows)));

        let views = views().with_events(bus);
        let id = views.ingest(sales()).unwrap();
        views.replace_filters(east(), Some(&id)).unwrap();
        assert_eq!(*seen.lock(), vec![(3, 3), (3, 2)]);
    }
}
