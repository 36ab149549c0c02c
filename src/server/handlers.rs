use axum::extract::rejection::{FormRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Form;
use serde::Serialize;

use crate::ordering;
use crate::pagination::PaginationWindow;
use crate::query::{QueryDescriptor, RawParams};
use crate::render::{MountPrefix, ViewContext};
use crate::rpc::{AuditLogRequest, ReadRequest, SearchRequest};

use super::outcome::{respond, HandlerResult, OrRedirect, Outcome, ROOT};
use super::prefix::RequestPrefix;
use super::SharedState;

/// Query strings for the audit pager links, filters included.
#[derive(Serialize)]
struct AuditPager {
    less: Option<String>,
    more: Option<String>,
}

fn query_params(query: Result<Query<RawParams>, QueryRejection>) -> RawParams {
    query.map(|Query(params)| params).unwrap_or_default()
}

fn form_params(form: Result<Form<RawParams>, FormRejection>) -> RawParams {
    form.map(|Form(params)| params).unwrap_or_default()
}

pub async fn index(
    State(state): State<SharedState>,
    RequestPrefix(prefix): RequestPrefix,
    query: Result<Query<RawParams>, QueryRejection>,
) -> Response {
    let descriptor = QueryDescriptor::from_params(&query_params(query));
    let result = latest_changes(&state, &descriptor).await;
    respond(state, prefix, result).await
}

async fn latest_changes(state: &SharedState, descriptor: &QueryDescriptor) -> HandlerResult {
    let rsp = state
        .service
        .audit_log(AuditLogRequest {
            reverse: true,
            ..AuditLogRequest::default()
        })
        .await
        .or_redirect(ROOT, "Config.AuditLog")?;

    let mut latest = rsp.changes;
    ordering::sort_change_logs(&mut latest, descriptor.reverse);

    Ok(Outcome::view(
        "index",
        ViewContext::new().with("Latest", latest),
    ))
}

pub async fn audit_log(
    State(state): State<SharedState>,
    RequestPrefix(prefix): RequestPrefix,
    query: Result<Query<RawParams>, QueryRejection>,
) -> Response {
    let descriptor = QueryDescriptor::from_params(&query_params(query));
    let result = audit_page(&state, &descriptor).await;
    respond(state, prefix, result).await
}

async fn audit_page(state: &SharedState, descriptor: &QueryDescriptor) -> HandlerResult {
    let rsp = state
        .service
        .audit_log(AuditLogRequest {
            from: descriptor.numeric_filter("from"),
            to: descriptor.numeric_filter("to"),
            limit: descriptor.limit_i64(),
            offset: descriptor.offset_i64(),
            reverse: true,
        })
        .await
        .or_redirect(ROOT, "Config.AuditLog")?;

    let mut latest = rsp.changes;
    ordering::sort_change_logs(&mut latest, descriptor.reverse);
    let window = PaginationWindow::for_query(descriptor, latest.len());

    Ok(Outcome::view(
        "audit",
        ViewContext::new()
            .with("Latest", latest)
            .with("Less", window.less_token())
            .with("More", window.more_token())
            .with(
                "Pager",
                AuditPager {
                    less: window.less.map(|page| descriptor.audit_query(page)),
                    more: window.more.map(|page| descriptor.audit_query(page)),
                },
            ),
    ))
}

pub async fn search_form(
    State(state): State<SharedState>,
    RequestPrefix(prefix): RequestPrefix,
) -> Response {
    respond(state, prefix, Ok(Outcome::view("search", ViewContext::new()))).await
}

pub async fn search_results(
    State(state): State<SharedState>,
    RequestPrefix(prefix): RequestPrefix,
    form: Result<Form<RawParams>, FormRejection>,
) -> Response {
    let descriptor = QueryDescriptor::from_params(&form_params(form));
    let result = search_page(&state, &prefix, &descriptor).await;
    respond(state, prefix, result).await
}

async fn search_page(
    state: &SharedState,
    prefix: &MountPrefix,
    descriptor: &QueryDescriptor,
) -> HandlerResult {
    let rsp = state
        .service
        .search(SearchRequest {
            id: descriptor.filter("id").to_string(),
            author: descriptor.filter("author").to_string(),
            limit: descriptor.limit_i64(),
            offset: descriptor.offset_i64(),
        })
        .await
        .or_redirect(&prefix.join("search"), "Config.Search")?;

    let mut results = rsp.configs;
    ordering::sort_configs(&mut results);
    let window = PaginationWindow::for_query(descriptor, results.len());

    Ok(Outcome::view(
        "results",
        ViewContext::new()
            .with("Name", descriptor.describe_search())
            .with("Query", &descriptor.filters)
            .with("Results", results)
            .with("Less", window.less_token())
            .with("More", window.more_token()),
    ))
}

pub async fn config(
    State(state): State<SharedState>,
    RequestPrefix(prefix): RequestPrefix,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let result = match path.or_redirect(ROOT, "config id") {
        Ok(Path(id)) => config_page(&state, id).await,
        Err(fallback) => Err(fallback),
    };
    respond(state, prefix, result).await
}

async fn config_page(state: &SharedState, id: String) -> HandlerResult {
    if id.trim().is_empty() {
        return Err(Outcome::redirect(ROOT));
    }

    let rsp = state
        .service
        .read(ReadRequest { id: id.clone() })
        .await
        .or_redirect(ROOT, "Config.Read")?;

    Ok(Outcome::view(
        "config",
        ViewContext::new()
            .with("Id", id)
            .with("Config", rsp.change),
    ))
}

/// `/config` without an id.
pub async fn config_missing() -> Response {
    super::outcome::found(ROOT)
}
