//! Route table and request handlers.
//!
//! GET handlers are loaders: they read from the store and render a page.
//! POST handlers are actions: they mutate the store and answer with a
//! `303 See Other` so the browser re-fetches every page it shows.

use axum::{
    extract::{Form, Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::views::{self, Sidebar};
use super::{AppState, WebError};
use crate::contact::{Contact, ContactId, ContactUpdate};

const STYLESHEET: &str = include_str!("../../assets/app.css");

/// Query string accepted by every page that renders the sidebar.
#[derive(Debug, Default, Deserialize)]
pub(super) struct SearchParams {
    q: Option<String>,
}

/// Body of the favorite toggle. Anything other than `true` means false.
#[derive(Debug, Default, Deserialize)]
pub(super) struct FavoriteForm {
    favorite: Option<String>,
}

impl FavoriteForm {
    fn value(&self) -> bool {
        self.favorite.as_deref() == Some("true")
    }
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create_contact))
        .route("/contacts/{id}", get(show_contact).post(toggle_favorite))
        .route("/contacts/{id}/edit", get(edit_contact).post(update_contact))
        .route("/contacts/{id}/destroy", post(destroy_contact))
        .route("/app.css", get(stylesheet))
        .route("/health", get(health))
}

/// An identifier that doesn't parse can't name a contact.
fn parse_id(raw: &str) -> Result<ContactId, WebError> {
    raw.parse().map_err(|_| WebError::NotFound)
}

/// Render the shell around `outlet`, listing the contacts that match `query`.
async fn render_page(
    state: &AppState,
    query: Option<&str>,
    active: Option<ContactId>,
    outlet: &str,
) -> Result<Html<String>, WebError> {
    let contacts = state.store.search(query).await?;
    let sidebar = Sidebar {
        contacts: &contacts,
        query,
        active,
    };
    Ok(Html(views::page(&state.title, &sidebar, outlet)))
}

async fn load_contact(state: &AppState, id: ContactId) -> Result<Contact, WebError> {
    state.store.get(id).await?.ok_or(WebError::NotFound)
}

async fn index(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, WebError> {
    debug!(query = ?params.q, "Rendering contact list");
    render_page(&state, params.q.as_deref(), None, &views::index_page()).await
}

async fn create_contact(State(state): State<AppState>) -> Result<Redirect, WebError> {
    let contact = state.store.create().await?;
    info!(id = %contact.id, "Created contact");
    Ok(Redirect::to(&format!("/contacts/{}/edit", contact.id)))
}

async fn show_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, WebError> {
    let id = parse_id(&id)?;
    let contact = load_contact(&state, id).await?;
    debug!(%id, "Rendering contact");
    render_page(
        &state,
        params.q.as_deref(),
        Some(id),
        &views::contact_detail(&contact, params.q.as_deref()),
    )
    .await
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SearchParams>,
    Form(form): Form<FavoriteForm>,
) -> Result<Redirect, WebError> {
    let id = parse_id(&id)?;
    let favorite = form.value();
    state
        .store
        .update(id, ContactUpdate::favorite(favorite))
        .await?;
    info!(%id, favorite, "Updated favorite");
    Ok(Redirect::to(&views::contact_url(id, "", params.q.as_deref())))
}

async fn edit_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, WebError> {
    let id = parse_id(&id)?;
    let contact = load_contact(&state, id).await?;
    debug!(%id, "Rendering edit form");
    render_page(
        &state,
        params.q.as_deref(),
        Some(id),
        &views::edit_form(&contact, params.q.as_deref()),
    )
    .await
}

async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SearchParams>,
    Form(fields): Form<ContactUpdate>,
) -> Result<Redirect, WebError> {
    let id = parse_id(&id)?;
    state.store.update(id, fields).await?;
    info!(%id, "Updated contact");
    Ok(Redirect::to(&views::contact_url(id, "", params.q.as_deref())))
}

async fn destroy_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, WebError> {
    let id = parse_id(&id)?;
    state.store.delete(id).await?;
    info!(%id, "Deleted contact");
    Ok(Redirect::to("/"))
}

async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, WebError> {
    let stats = state.store.stats().await?;
    Ok(Json(json!({
        "status": "ok",
        "contacts": stats.total,
    })))
}
