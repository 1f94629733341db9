use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;
use uuid::Uuid;

use crate::errors::AppError;
use crate::listing::filters::{FilterError, FilterState, PillKind, MAX_TERM_CHARS};
use crate::listing::session::{JobCard, ListingView};
use crate::listing::taxonomy::Industry;
use crate::models::job::{Job, JobField};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PillRequest {
    pub term: String,
    pub kind: PillKind,
}

#[derive(Debug, Deserialize)]
pub struct IndustryRequest {
    pub industry: String,
}

#[derive(Debug, Deserialize)]
pub struct TermRequest {
    pub term: String,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub job_id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct IndustrySummary {
    pub industry: Industry,
    pub keyword_count: usize,
}

#[derive(Debug, Serialize)]
pub struct IndustryKeywords {
    pub industry: Industry,
    pub keywords: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub card: JobCard,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub generation: u64,
    pub jobs: usize,
    pub facets: usize,
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

fn blocking_task_failed(e: JoinError) -> AppError {
    AppError::Internal(anyhow::Error::new(e).context("Listing computation failed"))
}

/// Applies a filter change to a session and returns its fresh view. Pill changes are
/// logged as search activity once the session lock is released.
async fn update_session<F>(
    state: &AppState,
    id: Uuid,
    change: F,
) -> Result<ListingView, AppError>
where
    F: FnOnce(&mut FilterState) -> Result<bool, FilterError> + Send + 'static,
{
    let snapshot = state.catalog.current().await;
    let searcher = state.searcher.clone();
    let settings = state.settings;
    let (view, log) = state
        .sessions
        .with_session(id, move |session| {
            let before = session.filters().clone();
            session.update_filters(change)?;
            let after = session.filters();
            let pills_changed = before.include_pills() != after.include_pills()
                || before.exclude_pills() != after.exclude_pills();
            let log = pills_changed
                .then(|| (session.user_id().map(str::to_string), after.clone()));
            let view = session.view(&snapshot, searcher.as_ref(), &settings, Utc::now());
            Ok::<_, FilterError>((view, log))
        })
        .await
        .map_err(blocking_task_failed)?
        .ok_or_else(|| session_not_found(id))??;

    if let Some((user_id, filters)) = log {
        state.activity.pills_changed(user_id.as_deref(), &filters);
    }
    Ok(view)
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.create(req.user_id).await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(session_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:id/view
pub async fn handle_get_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingView>, AppError> {
    let snapshot = state.catalog.current().await;
    let searcher = state.searcher.clone();
    let settings = state.settings;
    let view = state
        .sessions
        .with_session(id, move |session| {
            session.view(&snapshot, searcher.as_ref(), &settings, Utc::now())
        })
        .await
        .map_err(blocking_task_failed)?
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/pills
pub async fn handle_add_pill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PillRequest>,
) -> Result<Json<ListingView>, AppError> {
    let view = update_session(&state, id, move |f| f.add_pill(req.kind, &req.term)).await?;
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id/pills
pub async fn handle_remove_pill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PillRequest>,
) -> Result<Json<ListingView>, AppError> {
    let view = update_session(&state, id, move |f| Ok(f.remove_pill(req.kind, &req.term))).await?;
    Ok(Json(view))
}

/// PUT /api/v1/sessions/:id/industry
pub async fn handle_select_industry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<IndustryRequest>,
) -> Result<Json<ListingView>, AppError> {
    let industry = Industry::from_label(&req.industry)
        .ok_or_else(|| FilterError::UnknownIndustry(req.industry.clone()))?;
    let view = update_session(&state, id, move |f| f.select_industry(industry)).await?;
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id/industry
pub async fn handle_clear_industry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingView>, AppError> {
    let view = update_session(&state, id, |f| Ok(f.clear_industry())).await?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/excluded-terms/toggle
pub async fn handle_toggle_excluded_term(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TermRequest>,
) -> Result<Json<ListingView>, AppError> {
    // Toggling always changes the set, whichever way it goes.
    let view = update_session(&state, id, move |f| {
        f.toggle_excluded_term(&req.term).map(|_| true)
    })
    .await?;
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id/excluded-terms
pub async fn handle_clear_excluded_terms(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingView>, AppError> {
    let view = update_session(&state, id, |f| Ok(f.clear_excluded_terms())).await?;
    Ok(Json(view))
}

/// PUT /api/v1/sessions/:id/page
pub async fn handle_set_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PageRequest>,
) -> Result<Json<ListingView>, AppError> {
    let snapshot = state.catalog.current().await;
    let searcher = state.searcher.clone();
    let settings = state.settings;
    let view = state
        .sessions
        .with_session(id, move |session| {
            session.set_page(req.page);
            session.view(&snapshot, searcher.as_ref(), &settings, Utc::now())
        })
        .await
        .map_err(blocking_task_failed)?
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/clicks
pub async fn handle_job_click(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ClickRequest>,
) -> Result<(StatusCode, Json<ClickResponse>), AppError> {
    let snapshot = state.catalog.current().await;
    let (_, job) = snapshot
        .find_by_id(&req.job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", req.job_id)))?;

    let (user_id, filters) = state
        .sessions
        .with_session(id, |session| {
            (session.user_id().map(str::to_string), session.filters().clone())
        })
        .await
        .map_err(blocking_task_failed)?
        .ok_or_else(|| session_not_found(id))?;

    state.activity.job_clicked(user_id.as_deref(), job, &filters);

    Ok((
        StatusCode::ACCEPTED,
        Json(ClickResponse {
            job_id: job.id.clone(),
            url: job.url.clone(),
        }),
    ))
}

/// GET /api/v1/industries
pub async fn handle_list_industries() -> Json<Vec<IndustrySummary>> {
    Json(
        Industry::CLASSIFIED
            .iter()
            .map(|&industry| IndustrySummary {
                industry,
                keyword_count: industry.keywords().len(),
            })
            .collect(),
    )
}

/// GET /api/v1/industries/:label/keywords
pub async fn handle_industry_keywords(
    Path(label): Path<String>,
) -> Result<Json<IndustryKeywords>, AppError> {
    let industry = Industry::from_label(&label)
        .ok_or_else(|| AppError::NotFound(format!("Industry '{label}' not found")))?;
    Ok(Json(IndustryKeywords {
        industry,
        keywords: industry.keywords(),
    }))
}

/// GET /api/v1/jobs/search?q=
/// Loose preview search over every job, independent of any session's pills.
pub async fn handle_search_preview(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params.q.trim().to_lowercase();
    if query.is_empty() {
        return Err(AppError::Validation("q must not be empty".to_string()));
    }
    if query.chars().count() > MAX_TERM_CHARS {
        return Err(AppError::Validation(format!(
            "q cannot exceed {MAX_TERM_CHARS} characters"
        )));
    }

    let snapshot = state.catalog.current().await;
    let matches = {
        let snapshot = snapshot.clone();
        let searcher = state.searcher.clone();
        let query = query.clone();
        let threshold = state.settings.base_threshold;
        tokio::task::spawn_blocking(move || {
            let corpus: Vec<&Job> = snapshot.jobs().iter().collect();
            searcher.search(&corpus, &JobField::SEARCHABLE, &query, threshold)
        })
        .await
        .map_err(blocking_task_failed)?
    };

    let now = Utc::now();
    let limit = params.limit.unwrap_or(state.settings.page_size);
    let results = matches
        .iter()
        .take(limit)
        .filter_map(|m| {
            snapshot.job(m.index).map(|job| SearchHit {
                card: JobCard {
                    job: job.clone(),
                    industry: snapshot.industry(m.index),
                    is_new: job.is_new_at(now, state.settings.new_job_window),
                },
                score: m.score,
            })
        })
        .collect();

    Ok(Json(SearchResponse {
        query,
        total: matches.len(),
        results,
    }))
}

/// POST /api/v1/jobs/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    let snapshot = state.catalog.refresh().await?;
    Ok(Json(RefreshResponse {
        generation: snapshot.generation(),
        jobs: snapshot.len(),
        facets: snapshot.facets().len(),
    }))
}
