//! End-to-end flows through the browser update loop against a scripted API.
//!
//! Commands run via `run_to_completion` under a paused tokio clock, so every
//! delayed follow-up (debounced refreshes, poll intervals, the post-job
//! reload) executes deterministically inside each test.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use curator::api::{
    ApiError, Collection, CollectionApi, Company, CompanyPage, CompanyStatus, JobStatus,
    TransferJob, TransferRequest, TransferResponse,
};
use curator::browser::{update, Msg, NotificationLevel, State};
use curator::command::run_to_completion;
use curator::config::BrowserConfig;

/// In-memory collections service. Datasets are mutated by successful
/// transfers, so authoritative refreshes and reloads observe what a real
/// server would report.
struct MockApi {
    collections: Vec<(String, String)>,
    datasets: Mutex<HashMap<String, Vec<Company>>>,
    transfer_results: Mutex<VecDeque<Result<TransferResponse, ApiError>>>,
    poll_results: Mutex<VecDeque<Result<TransferJob, ApiError>>>,
    requests: Mutex<Vec<TransferRequest>>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    /// Collections as (id, name, company count); company ids are unique
    /// across collections.
    fn new(setup: &[(&str, &str, usize)]) -> Arc<Self> {
        let mut collections = Vec::new();
        let mut datasets = HashMap::new();
        for (index, (id, name, count)) in setup.iter().enumerate() {
            collections.push((id.to_string(), name.to_string()));
            let base = index as i64 * 1000;
            let companies = (0..*count as i64)
                .map(|n| Company {
                    id: base + n,
                    company_name: format!("{name} Co {n}"),
                    liked: false,
                    status: CompanyStatus::New,
                })
                .collect();
            datasets.insert(id.to_string(), companies);
        }
        Arc::new(Self {
            collections,
            datasets: Mutex::new(datasets),
            transfer_results: Mutex::new(VecDeque::new()),
            poll_results: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn script_transfer(&self, result: Result<TransferResponse, ApiError>) {
        self.transfer_results.lock().unwrap().push_back(result);
    }

    fn script_poll(&self, result: Result<TransferJob, ApiError>) {
        self.poll_results.lock().unwrap().push_back(result);
    }

    fn calls(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(name))
            .count()
    }

    fn last_request(&self) -> TransferRequest {
        self.requests.lock().unwrap().last().unwrap().clone()
    }

    /// Move the requested companies between datasets, like the server does
    /// once it accepts a transfer.
    fn apply_transfer(&self, source: &str, request: &TransferRequest) {
        let mut datasets = self.datasets.lock().unwrap();
        let from = datasets.get_mut(source).unwrap();
        let moved: Vec<Company> = if request.transfer_all {
            from.drain(..).collect()
        } else {
            let wanted: HashSet<i64> = request.company_ids.iter().copied().collect();
            let (moved, kept): (Vec<Company>, Vec<Company>) =
                from.drain(..).partition(|c| wanted.contains(&c.id));
            *from = kept;
            moved
        };
        datasets
            .get_mut(&request.dest_collection_id)
            .unwrap()
            .extend(moved);
    }
}

#[async_trait]
impl CollectionApi for MockApi {
    async fn list_collections(&self) -> Result<Vec<Collection>, ApiError> {
        self.calls.lock().unwrap().push("list_collections".into());
        let datasets = self.datasets.lock().unwrap();
        Ok(self
            .collections
            .iter()
            .map(|(id, name)| Collection {
                id: id.clone(),
                collection_name: name.clone(),
                total: datasets[id].len() as u64,
            })
            .collect())
    }

    async fn list_companies(
        &self,
        collection_id: &str,
        offset: usize,
        limit: usize,
        search: &str,
    ) -> Result<CompanyPage, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("list_companies {collection_id} {offset}"));
        let datasets = self.datasets.lock().unwrap();
        let Some(dataset) = datasets.get(collection_id) else {
            return Err(ApiError::from_status(404, "{}"));
        };
        let needle = search.to_lowercase();
        let filtered: Vec<Company> = dataset
            .iter()
            .filter(|c| needle.is_empty() || c.company_name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let total = filtered.len() as u64;
        let companies = filtered
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();
        Ok(CompanyPage { companies, total })
    }

    async fn submit_transfer(
        &self,
        collection_id: &str,
        request: TransferRequest,
    ) -> Result<TransferResponse, ApiError> {
        self.calls.lock().unwrap().push("submit_transfer".into());
        self.requests.lock().unwrap().push(request.clone());
        let result = self
            .transfer_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted transfer");
        if result.is_ok() {
            self.apply_transfer(collection_id, &request);
        }
        result
    }

    async fn job_status(&self, _job_id: &str) -> Result<TransferJob, ApiError> {
        self.calls.lock().unwrap().push("job_status".into());
        self.poll_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted poll")
    }
}

fn job(status: JobStatus, progress: u64, total: u64) -> TransferJob {
    TransferJob {
        job_id: "j1".into(),
        status,
        progress,
        total,
        eta_seconds: None,
        error_message: None,
    }
}

fn accepted_with_job() -> TransferResponse {
    TransferResponse {
        job_id: Some("j1".into()),
        status: "accepted".into(),
        message: "transfer queued".into(),
    }
}

fn completed_sync() -> TransferResponse {
    TransferResponse {
        job_id: None,
        status: "completed".into(),
        message: "done".into(),
    }
}

async fn boot(api: Arc<MockApi>) -> State {
    let (mut state, init) = State::new(api, BrowserConfig::default());
    run_to_completion(&mut state, update, init).await;
    state
}

async fn dispatch(state: &mut State, msg: Msg) {
    let cmd = update(state, msg);
    run_to_completion(state, update, cmd).await;
}

fn select_rows(state: &mut State, rows: std::ops::Range<usize>) {
    for index in rows {
        update(
            state,
            Msg::RowClicked {
                index,
                range_select: false,
            },
        );
    }
}

fn notifications(state: &State, level: NotificationLevel) -> Vec<String> {
    state
        .notifications
        .iter()
        .filter(|n| n.level == level)
        .map(|n| format!("{}: {}", n.title, n.detail))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_startup_loads_first_collection_page() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 40)]);
    let state = boot(api.clone()).await;

    assert_eq!(state.registry.selected().unwrap().id, "c1");
    assert_eq!(state.list.companies.len(), 50);
    assert_eq!(state.list.total, 120);
    assert!(state.list.has_more);
    assert_eq!(api.calls("list_companies"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_load_more_pages_cover_the_collection_without_overlap() {
    let api = MockApi::new(&[("c1", "All Companies", 120)]);
    let mut state = boot(api.clone()).await;

    dispatch(&mut state, Msg::LoadMoreRequested).await;
    assert_eq!(state.list.companies.len(), 100);

    tokio::time::advance(Duration::from_millis(801)).await;
    dispatch(&mut state, Msg::LoadMoreRequested).await;

    assert_eq!(state.list.companies.len(), 120);
    assert!(!state.list.has_more);
    let unique: HashSet<i64> = state.list.loaded_ids().into_iter().collect();
    assert_eq!(unique.len(), 120);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_load_triggers_are_throttled() {
    let api = MockApi::new(&[("c1", "All Companies", 120)]);
    let mut state = boot(api.clone()).await;

    dispatch(&mut state, Msg::LoadMoreRequested).await;
    dispatch(&mut state, Msg::LoadMoreRequested).await;
    assert_eq!(state.list.companies.len(), 100);

    tokio::time::advance(Duration::from_millis(801)).await;
    dispatch(&mut state, Msg::LoadMoreRequested).await;
    assert_eq!(state.list.companies.len(), 120);
}

#[tokio::test(start_paused = true)]
async fn test_collection_switch_back_is_served_from_cache() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 5)]);
    let mut state = boot(api.clone()).await;

    dispatch(&mut state, Msg::CollectionSelected("c2".into())).await;
    assert_eq!(state.list.companies.len(), 5);

    dispatch(&mut state, Msg::CollectionSelected("c1".into())).await;
    assert_eq!(state.list.companies.len(), 50);
    assert_eq!(state.list.total, 120);
    // c1 once at startup, c2 once; the switch back hit the cache.
    assert_eq!(api.calls("list_companies"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_search_results_bypass_the_cache() {
    let api = MockApi::new(&[("c1", "All Companies", 120)]);
    let mut state = boot(api.clone()).await;

    dispatch(&mut state, Msg::SearchChanged("Co 7".into())).await;
    assert!(state.list.companies.len() < 50);
    assert!(state
        .list
        .companies
        .iter()
        .all(|c| c.company_name.contains("Co 7")));

    // Clearing the search restores the cached view without a fetch.
    let fetches = api.calls("list_companies");
    dispatch(&mut state, Msg::SearchChanged("".into())).await;
    assert_eq!(state.list.companies.len(), 50);
    assert_eq!(api.calls("list_companies"), fetches);
}

#[tokio::test(start_paused = true)]
async fn test_small_transfer_removes_rows_and_reports_success() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 40)]);
    api.script_transfer(Ok(completed_sync()));
    let mut state = boot(api.clone()).await;

    select_rows(&mut state, 0..3);
    dispatch(
        &mut state,
        Msg::TransferRequested {
            dest_collection_id: "c2".into(),
            transfer_all: false,
        },
    )
    .await;

    assert_eq!(state.list.companies.len(), 47);
    assert_eq!(state.list.total, 117);
    assert!(state.selection.is_empty());
    assert_eq!(sorted_request_ids(&api), vec![0, 1, 2]);

    let info = notifications(&state, NotificationLevel::Info);
    assert_eq!(info, vec!["Processing 3 companies: Mark as Liked..."]);
    let success = notifications(&state, NotificationLevel::Success);
    assert_eq!(success.len(), 1);
    assert!(success[0].contains("3 companies"));

    // The debounced refresh ran and agrees with the server.
    assert!(api.calls("list_collections") >= 2);
    assert_eq!(state.registry.get("c1").unwrap().total, 117);
    assert_eq!(state.registry.get("c2").unwrap().total, 43);
}

#[tokio::test(start_paused = true)]
async fn test_small_transfer_failure_restores_the_rows() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 40)]);
    api.script_transfer(Err(ApiError::from_status(
        503,
        r#"{"detail":"server unavailable"}"#,
    )));
    let mut state = boot(api.clone()).await;

    select_rows(&mut state, 0..3);
    dispatch(
        &mut state,
        Msg::TransferRequested {
            dest_collection_id: "c2".into(),
            transfer_all: false,
        },
    )
    .await;

    assert_eq!(state.list.companies.len(), 50);
    assert_eq!(state.list.total, 120);
    let ids: HashSet<i64> = state.list.loaded_ids().into_iter().collect();
    assert!(ids.contains(&0) && ids.contains(&1) && ids.contains(&2));

    let errors = notifications(&state, NotificationLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Transfer failed"));
    assert!(errors[0].contains("server unavailable"));

    // No optimistic count shift and no debounced refresh were scheduled.
    assert_eq!(state.registry.get("c1").unwrap().total, 120);
    assert_eq!(api.calls("list_collections"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_optimistic_mutation_applies_before_any_network_call() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 40)]);
    let mut state = boot(api.clone()).await;

    select_rows(&mut state, 0..2);
    // Run only the synchronous part of the transfer; drop the effect.
    let _cmd = update(
        &mut state,
        Msg::TransferRequested {
            dest_collection_id: "c2".into(),
            transfer_all: false,
        },
    );

    assert_eq!(state.list.companies.len(), 48);
    assert!(state.selection.is_empty());
    assert_eq!(
        notifications(&state, NotificationLevel::Info),
        vec!["Processing 2 companies: Mark as Liked..."]
    );
    assert_eq!(api.calls("submit_transfer"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_large_transfer_patches_statuses_in_place() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 40)]);
    let mut state = boot(api.clone()).await;

    select_rows(&mut state, 0..15);
    let _cmd = update(
        &mut state,
        Msg::TransferRequested {
            dest_collection_id: "c2".into(),
            transfer_all: false,
        },
    );

    // Rows stay in the list with new statuses; counts are untouched.
    assert_eq!(state.list.companies.len(), 50);
    assert_eq!(state.list.total, 120);
    assert!(state.list.companies[..15]
        .iter()
        .all(|c| c.status == CompanyStatus::Liked && c.liked));
    assert!(state.list.companies[15..]
        .iter()
        .all(|c| c.status == CompanyStatus::New));
}

#[tokio::test(start_paused = true)]
async fn test_large_sync_transfer_defers_success_and_keeps_the_cache() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 40)]);
    api.script_transfer(Ok(completed_sync()));
    let mut state = boot(api.clone()).await;

    select_rows(&mut state, 0..15);
    dispatch(
        &mut state,
        Msg::TransferRequested {
            dest_collection_id: "c2".into(),
            transfer_all: false,
        },
    )
    .await;

    // The rows are only status-patched, so no success is reported yet.
    assert!(notifications(&state, NotificationLevel::Success).is_empty());
    assert_eq!(notifications(&state, NotificationLevel::Info).len(), 1);
    assert_eq!(state.list.companies.len(), 50);
    assert!(state.list.companies[..15]
        .iter()
        .all(|c| c.status == CompanyStatus::Liked));

    // The cache survived: switching away and back does not refetch.
    let fetches = api.calls("list_companies");
    dispatch(&mut state, Msg::CollectionSelected("c2".into())).await;
    dispatch(&mut state, Msg::CollectionSelected("c1".into())).await;
    assert_eq!(api.calls("list_companies"), fetches + 1);
    assert_eq!(state.list.companies.len(), 50);
}

#[tokio::test(start_paused = true)]
async fn test_transfer_all_job_completes_with_one_notification_and_reload() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 40)]);
    api.script_transfer(Ok(accepted_with_job()));
    api.script_poll(Ok(job(JobStatus::Processing, 30, 120)));
    api.script_poll(Ok(job(JobStatus::Processing, 90, 120)));
    api.script_poll(Ok(job(JobStatus::Completed, 120, 120)));
    let mut state = boot(api.clone()).await;

    dispatch(
        &mut state,
        Msg::TransferRequested {
            dest_collection_id: "c2".into(),
            transfer_all: true,
        },
    )
    .await;

    let request = api.last_request();
    assert!(request.transfer_all);
    assert!(request.company_ids.is_empty());

    let success = notifications(&state, NotificationLevel::Success);
    assert_eq!(success, vec!["Status updated!: 120 companies processed successfully"]);

    // The post-completion reload observed the server-side move.
    assert!(state.list.companies.is_empty());
    assert_eq!(state.list.total, 0);
    assert_eq!(state.registry.get("c1").unwrap().total, 0);
    assert_eq!(state.registry.get("c2").unwrap().total, 160);

    // The job display expired and polling stopped.
    assert!(state.job.current().is_none());
    assert!(state.active_transfer.is_none());
    assert_eq!(api.calls("job_status"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_job_failure_notifies_and_keeps_the_patch_by_default() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 40)]);
    api.script_transfer(Ok(accepted_with_job()));
    api.script_poll(Ok(TransferJob {
        error_message: Some("quota exceeded".into()),
        ..job(JobStatus::Failed, 10, 15)
    }));
    let mut state = boot(api.clone()).await;

    select_rows(&mut state, 0..15);
    dispatch(
        &mut state,
        Msg::TransferRequested {
            dest_collection_id: "c2".into(),
            transfer_all: false,
        },
    )
    .await;

    assert_eq!(
        notifications(&state, NotificationLevel::Error),
        vec!["Update failed: quota exceeded"]
    );
    // Patched rows are left alone; the next authoritative reload corrects
    // any drift.
    assert!(state.list.companies[..15]
        .iter()
        .all(|c| c.status == CompanyStatus::Liked));
    assert!(state.job.current().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_job_failure_rolls_back_the_patch_when_configured() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 40)]);
    api.script_transfer(Ok(accepted_with_job()));
    api.script_poll(Ok(job(JobStatus::Failed, 0, 15)));

    let mut config = BrowserConfig::default();
    config.rollback_patch_on_job_failure = true;
    let (mut state, init) = State::new(api.clone(), config);
    run_to_completion(&mut state, update, init).await;

    select_rows(&mut state, 0..15);
    dispatch(
        &mut state,
        Msg::TransferRequested {
            dest_collection_id: "c2".into(),
            transfer_all: false,
        },
    )
    .await;

    assert!(state.list.companies[..15]
        .iter()
        .all(|c| c.status == CompanyStatus::New && !c.liked));
}

#[tokio::test(start_paused = true)]
async fn test_poll_failure_stops_polling_but_refresh_still_runs() {
    let api = MockApi::new(&[("c1", "All Companies", 120), ("c2", "Liked Companies", 40)]);
    api.script_transfer(Ok(accepted_with_job()));
    api.script_poll(Err(ApiError::Network("connection reset".into())));
    let mut state = boot(api.clone()).await;

    select_rows(&mut state, 0..15);
    dispatch(
        &mut state,
        Msg::TransferRequested {
            dest_collection_id: "c2".into(),
            transfer_all: false,
        },
    )
    .await;

    // One poll, then silence; an unscripted second poll would panic.
    assert_eq!(api.calls("job_status"), 1);
    assert!(notifications(&state, NotificationLevel::Error).is_empty());
    // The debounced refresh still delivered authoritative counts.
    assert_eq!(state.registry.get("c1").unwrap().total, 105);
    assert_eq!(state.registry.get("c2").unwrap().total, 55);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_invalidates_late_deliveries() {
    let api = MockApi::new(&[("c1", "All Companies", 120)]);
    let mut state = boot(api.clone()).await;

    state.dispose();
    dispatch(&mut state, Msg::ListReloadDue(0)).await;
    dispatch(&mut state, Msg::PollDue(99)).await;
    dispatch(&mut state, Msg::CollectionsRefreshDue(99)).await;

    // Nothing fetched beyond the startup calls.
    assert_eq!(api.calls("list_companies"), 1);
    assert_eq!(api.calls("list_collections"), 1);
    assert_eq!(api.calls("job_status"), 0);
}

fn sorted_request_ids(api: &MockApi) -> Vec<i64> {
    let mut ids = api.last_request().company_ids;
    ids.sort_unstable();
    ids
}
