use std::{
    collections::{BTreeSet, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{DogId, DogRecord, SortOrder},
    protocol::{ErrorBody, LoginRequest, MatchResponse, SearchResponse},
};
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};
use url::Url;

pub mod error;
pub mod favorites;
pub mod query;
pub mod session;

pub use error::{BreedsFetchFailed, LoginFailed, MatchError, SearchError};
pub use query::{build_search_query, total_pages, QueryDescriptor, PAGE_SIZE};
pub use session::{SessionContext, SessionPhase};

use favorites::FavoritesTracker;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Current search results as shown to the user. Rebuilt wholesale on every
/// successful query completion, never patched incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchView {
    /// Hydrated records in the ranking order the id search returned.
    pub records: Vec<DogRecord>,
    pub total_results: u64,
    pub current_page: u32,
    pub is_loading: bool,
    pub error: Option<SearchError>,
}

/// Outcome of the most recent match workflow, independent of the search
/// view. Cleared at the start of every new attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchView {
    pub matched_record: Option<DogRecord>,
    pub is_loading: bool,
    pub error: Option<MatchError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreedListView {
    /// Breed names sorted ascending for display.
    pub breeds: Vec<String>,
    pub is_loading: bool,
    pub error: Option<BreedsFetchFailed>,
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    SearchUpdated(SearchView),
    BreedsUpdated(BreedListView),
    /// A match workflow reached a terminal state the user must see: a
    /// matched record, a failure, or the no-favorites guard. Session expiry
    /// never produces this event.
    PresentMatch(MatchView),
    SessionExpired,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
}

impl ClientConfig {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
        })
    }
}

struct SearchState {
    view: SearchView,
    filters: BTreeSet<String>,
    sort: SortOrder,
}

impl SearchState {
    fn new() -> Self {
        Self {
            view: SearchView::default(),
            filters: BTreeSet::new(),
            sort: SortOrder::default(),
        }
    }
}

/// Outcome of the session-guard classification applied to every response
/// before any workflow-specific handling.
enum Classified {
    Ok(Response),
    AuthExpired,
    Failed(String),
}

enum DetailsFailure {
    AuthExpired,
    Failed(String),
}

/// Client-side controller for the adoptable-dog catalog: paginated filtered
/// search with two-phase hydration, an in-memory favorites selection, and
/// the match workflow, all behind a shared cookie session.
pub struct AdoptionClient {
    http: Client,
    base_url: Url,
    session: SessionContext,
    search: Mutex<SearchState>,
    match_state: Mutex<MatchView>,
    breeds: Mutex<BreedListView>,
    favorites: Mutex<FavoritesTracker>,
    search_generation: AtomicU64,
    match_generation: AtomicU64,
    events: broadcast::Sender<ClientEvent>,
}

impl AdoptionClient {
    pub fn new(config: ClientConfig) -> reqwest::Result<Arc<Self>> {
        let http = Client::builder().cookie_store(true).build()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Arc::new(Self {
            http,
            base_url: config.base_url,
            session: SessionContext::new(),
            search: Mutex::new(SearchState::new()),
            match_state: Mutex::new(MatchView::default()),
            breeds: Mutex::new(BreedListView::default()),
            favorites: Mutex::new(FavoritesTracker::default()),
            search_generation: AtomicU64::new(0),
            match_generation: AtomicU64::new(0),
            events,
        }))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    // ---- session ----

    pub async fn login(&self, name: &str, email: &str) -> Result<(), LoginFailed> {
        let request = LoginRequest {
            name: name.to_string(),
            email: email.to_string(),
        };
        let result = self
            .http
            .post(self.endpoint("/auth/login"))
            .json(&request)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                self.session.transition(SessionPhase::Authenticated);
                info!(name, "logged in");
                Ok(())
            }
            Ok(response) => {
                let fallback = format!("Login failed ({})", response.status().as_u16());
                let message = match response.json::<ErrorBody>().await {
                    Ok(ErrorBody {
                        message: Some(message),
                    }) => message,
                    _ => fallback,
                };
                Err(LoginFailed { message })
            }
            Err(err) => Err(LoginFailed {
                message: err.to_string(),
            }),
        }
    }

    /// Ends the session. Best-effort on the wire: the local state is torn
    /// down even when the logout call fails, as the original flow does.
    pub async fn logout(&self) {
        if let Err(err) = self.http.post(self.endpoint("/auth/logout")).send().await {
            warn!("logout request failed: {err}");
        }
        self.session.transition(SessionPhase::LoggedOut);
        self.reset_after_signout().await;
        info!("logged out");
    }

    pub fn session_phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<SessionPhase> {
        self.session.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Session-guard transition for an authentication-required signal. Acts
    /// once per expiry: clears every workflow view (which also drops their
    /// loading flags), bumps both generations so in-flight completions are
    /// discarded, and announces the expiry. No error is recorded anywhere.
    async fn expire_session(&self) {
        if !self.session.transition(SessionPhase::Expired) {
            return;
        }
        warn!("session expired; abandoning in-flight workflows");
        self.reset_after_signout().await;
        let _ = self.events.send(ClientEvent::SessionExpired);
    }

    async fn reset_after_signout(&self) {
        self.search_generation.fetch_add(1, Ordering::SeqCst);
        self.match_generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut search = self.search.lock().await;
            search.view = SearchView::default();
            search.filters.clear();
            search.sort = SortOrder::default();
        }
        *self.match_state.lock().await = MatchView::default();
        *self.breeds.lock().await = BreedListView::default();
        self.favorites.lock().await.clear();
    }

    /// First classification applied to every response: 401 triggers the
    /// session guard before any success/failure handling; other non-2xx
    /// statuses and transport errors collapse into a failure detail string.
    async fn classify(&self, result: reqwest::Result<Response>) -> Classified {
        match result {
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                self.expire_session().await;
                Classified::AuthExpired
            }
            Ok(response) if !response.status().is_success() => {
                Classified::Failed(format!("status {}", response.status().as_u16()))
            }
            Ok(response) => Classified::Ok(response),
            Err(err) => Classified::Failed(err.to_string()),
        }
    }

    // ---- breed directory ----

    pub async fn load_breeds(&self) -> BreedListView {
        {
            let mut breeds = self.breeds.lock().await;
            breeds.is_loading = true;
            breeds.error = None;
        }
        let outcome = self
            .classify(self.http.get(self.endpoint("/dogs/breeds")).send().await)
            .await;

        let mut breeds = self.breeds.lock().await;
        match outcome {
            Classified::AuthExpired => {}
            Classified::Failed(detail) => {
                warn!(detail, "breed directory fetch failed");
                breeds.is_loading = false;
                breeds.error = Some(BreedsFetchFailed(detail));
            }
            Classified::Ok(response) => match response.json::<Vec<String>>().await {
                Ok(mut list) => {
                    list.sort();
                    debug!(count = list.len(), "breed directory loaded");
                    breeds.breeds = list;
                    breeds.is_loading = false;
                }
                Err(err) => {
                    breeds.is_loading = false;
                    breeds.error = Some(BreedsFetchFailed(err.to_string()));
                }
            },
        }
        let view = breeds.clone();
        drop(breeds);
        let _ = self.events.send(ClientEvent::BreedsUpdated(view.clone()));
        view
    }

    pub async fn breed_list_view(&self) -> BreedListView {
        self.breeds.lock().await.clone()
    }

    // ---- search workflow ----

    /// Replaces the breed filter selection and re-runs the search from the
    /// first page.
    pub async fn set_breed_filters(&self, breeds: Vec<String>) -> SearchView {
        {
            let mut search = self.search.lock().await;
            search.filters = breeds.into_iter().collect();
        }
        self.run_search(1).await
    }

    pub async fn set_sort(&self, sort: SortOrder) -> SearchView {
        {
            self.search.lock().await.sort = sort;
        }
        self.run_search(1).await
    }

    pub async fn toggle_sort(&self) -> SearchView {
        {
            let mut search = self.search.lock().await;
            search.sort = search.sort.toggled();
        }
        self.run_search(1).await
    }

    /// Explicit pagination input. Ignored when the target is the current
    /// page or outside `1..=total_pages` for the last known total.
    pub async fn go_to_page(&self, page: u32) -> SearchView {
        let (current_page, total_results) = {
            let search = self.search.lock().await;
            (search.view.current_page, search.view.total_results)
        };
        let pages = total_pages(total_results);
        if page < 1 || page == current_page || u64::from(page) > pages {
            debug!(page, current_page, pages, "pagination input ignored");
            return self.search_view().await;
        }
        self.run_search(page).await
    }

    pub async fn current_filters(&self) -> Vec<String> {
        self.search.lock().await.filters.iter().cloned().collect()
    }

    pub async fn current_sort(&self) -> SortOrder {
        self.search.lock().await.sort
    }

    pub async fn search_view(&self) -> SearchView {
        self.search.lock().await.view.clone()
    }

    pub async fn total_pages(&self) -> u64 {
        total_pages(self.search.lock().await.view.total_results)
    }

    /// Runs one search invocation: id search, then batched detail
    /// hydration. Each invocation takes a fresh generation; completions
    /// whose generation is no longer the latest are discarded silently, so
    /// a superseded search can never overwrite newer state.
    pub async fn run_search(&self, page: u32) -> SearchView {
        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let descriptor = {
            let mut search = self.search.lock().await;
            search.view.is_loading = true;
            search.view.error = None;
            if page == 1 {
                // A fresh first page must never show the previous query's
                // rows; later pages keep theirs until the new page lands.
                search.view.records.clear();
            }
            let view = search.view.clone();
            let _ = self.events.send(ClientEvent::SearchUpdated(view));
            build_search_query(&search.filters, search.sort, page)
        };
        debug!(page, generation, "search issued");

        let outcome = self
            .classify(
                self.http
                    .get(self.endpoint("/dogs/search"))
                    .query(descriptor.params())
                    .send()
                    .await,
            )
            .await;

        let ids: Vec<DogId> = match outcome {
            Classified::AuthExpired => return self.search_view().await,
            Classified::Failed(detail) => {
                self.fail_search(generation, SearchError::SearchFailed(detail))
                    .await;
                return self.search_view().await;
            }
            Classified::Ok(response) => match response.json::<SearchResponse>().await {
                Ok(body) => {
                    let mut search = self.search.lock().await;
                    if self.search_generation.load(Ordering::SeqCst) != generation {
                        debug!(generation, "discarding superseded search completion");
                        return search.view.clone();
                    }
                    // Total and page advance before hydration so pagination
                    // reflects the requested page while details resolve.
                    search.view.total_results = body.total;
                    search.view.current_page = page;
                    if body.result_ids.is_empty() {
                        search.view.total_results = 0;
                        search.view.records.clear();
                        search.view.is_loading = false;
                        let view = search.view.clone();
                        drop(search);
                        info!(page, "search resolved with no results");
                        let _ = self.events.send(ClientEvent::SearchUpdated(view.clone()));
                        return view;
                    }
                    let view = search.view.clone();
                    drop(search);
                    let _ = self.events.send(ClientEvent::SearchUpdated(view));
                    body.result_ids
                }
                Err(err) => {
                    self.fail_search(generation, SearchError::SearchFailed(err.to_string()))
                        .await;
                    return self.search_view().await;
                }
            },
        };

        let records = match self.fetch_details(&ids).await {
            Ok(records) => records,
            Err(DetailsFailure::AuthExpired) => return self.search_view().await,
            Err(DetailsFailure::Failed(detail)) => {
                self.fail_search(generation, SearchError::DetailsFetchFailed(detail))
                    .await;
                return self.search_view().await;
            }
        };
        let records = reorder_by_ranking(&ids, records);

        let mut search = self.search.lock().await;
        if self.search_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded hydration completion");
            return search.view.clone();
        }
        search.view.records = records;
        search.view.is_loading = false;
        let view = search.view.clone();
        drop(search);
        info!(
            page,
            total = view.total_results,
            shown = view.records.len(),
            "search resolved"
        );
        let _ = self.events.send(ClientEvent::SearchUpdated(view.clone()));
        view
    }

    async fn fail_search(&self, generation: u64, error: SearchError) {
        let mut search = self.search.lock().await;
        if self.search_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded search failure");
            return;
        }
        warn!(%error, "search workflow failed");
        search.view.is_loading = false;
        search.view.error = Some(error);
        let view = search.view.clone();
        drop(search);
        let _ = self.events.send(ClientEvent::SearchUpdated(view));
    }

    /// Batched detail hydration shared by search and match.
    async fn fetch_details(&self, ids: &[DogId]) -> Result<Vec<DogRecord>, DetailsFailure> {
        let outcome = self
            .classify(self.http.post(self.endpoint("/dogs")).json(ids).send().await)
            .await;
        match outcome {
            Classified::AuthExpired => Err(DetailsFailure::AuthExpired),
            Classified::Failed(detail) => Err(DetailsFailure::Failed(detail)),
            Classified::Ok(response) => response
                .json::<Vec<DogRecord>>()
                .await
                .map_err(|err| DetailsFailure::Failed(err.to_string())),
        }
    }

    // ---- favorites ----

    pub async fn toggle_favorite(&self, id: &DogId) -> bool {
        let favorited = self.favorites.lock().await.toggle(id);
        debug!(id = %id, favorited, "favorite toggled");
        favorited
    }

    pub async fn is_favorite(&self, id: &DogId) -> bool {
        self.favorites.lock().await.contains(id)
    }

    pub async fn favorite_count(&self) -> usize {
        self.favorites.lock().await.len()
    }

    pub async fn favorites(&self) -> Vec<DogId> {
        self.favorites.lock().await.snapshot()
    }

    // ---- match workflow ----

    /// Submits the favorites set for a match and hydrates the returned id.
    /// Every terminal state other than session expiry emits `PresentMatch`.
    pub async fn run_match(&self) -> MatchView {
        let favorite_ids = self.favorites.lock().await.snapshot();
        if favorite_ids.is_empty() {
            let mut state = self.match_state.lock().await;
            state.matched_record = None;
            state.is_loading = false;
            state.error = Some(MatchError::NoFavoritesSelected);
            let view = state.clone();
            drop(state);
            let _ = self.events.send(ClientEvent::PresentMatch(view.clone()));
            return view;
        }

        let generation = {
            let mut state = self.match_state.lock().await;
            if state.is_loading {
                debug!("match request already in flight; trigger ignored");
                return state.clone();
            }
            state.is_loading = true;
            state.matched_record = None;
            state.error = None;
            self.match_generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        info!(favorites = favorite_ids.len(), "requesting match");

        let outcome = self
            .classify(
                self.http
                    .post(self.endpoint("/dogs/match"))
                    .json(&favorite_ids)
                    .send()
                    .await,
            )
            .await;
        let matched_id = match outcome {
            Classified::AuthExpired => return self.match_view().await,
            Classified::Failed(detail) => {
                return self
                    .fail_match(generation, MatchError::MatchRequestFailed(detail))
                    .await;
            }
            Classified::Ok(response) => match response.json::<MatchResponse>().await {
                Ok(body) => body.matched_id,
                Err(err) => {
                    return self
                        .fail_match(generation, MatchError::MatchRequestFailed(err.to_string()))
                        .await;
                }
            },
        };

        let records = match self.fetch_details(std::slice::from_ref(&matched_id)).await {
            Ok(records) => records,
            Err(DetailsFailure::AuthExpired) => return self.match_view().await,
            Err(DetailsFailure::Failed(detail)) => {
                return self
                    .fail_match(generation, MatchError::DetailsFetchFailed(detail))
                    .await;
            }
        };
        let Some(record) = records.into_iter().next() else {
            return self
                .fail_match(generation, MatchError::MatchDetailsUnavailable)
                .await;
        };

        let mut state = self.match_state.lock().await;
        if self.match_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded match completion");
            return state.clone();
        }
        state.matched_record = Some(record);
        state.is_loading = false;
        let view = state.clone();
        drop(state);
        info!(matched = %matched_id, "match resolved");
        let _ = self.events.send(ClientEvent::PresentMatch(view.clone()));
        view
    }

    pub async fn match_view(&self) -> MatchView {
        self.match_state.lock().await.clone()
    }

    async fn fail_match(&self, generation: u64, error: MatchError) -> MatchView {
        let mut state = self.match_state.lock().await;
        if self.match_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded match failure");
            return state.clone();
        }
        warn!(%error, "match workflow failed");
        state.is_loading = false;
        state.error = Some(error);
        let view = state.clone();
        drop(state);
        let _ = self.events.send(ClientEvent::PresentMatch(view.clone()));
        view
    }
}

/// Batch detail responses are not guaranteed to preserve input order, so
/// hydrated records are put back into the id-search ranking. Ids the detail
/// endpoint did not resolve are dropped.
fn reorder_by_ranking(ranking: &[DogId], records: Vec<DogRecord>) -> Vec<DogRecord> {
    let mut by_id: HashMap<DogId, DogRecord> = records
        .into_iter()
        .map(|record| (record.id.clone(), record))
        .collect();
    ranking
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
