use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use proptest::prelude::*;
use tower::ServiceExt;

use crate::ordering;
use crate::pagination::PaginationWindow;
use crate::query::{page_offset, parse_page, QueryDescriptor, RawParams, PAGE_LIMIT};
use crate::render::{MountPrefix, Renderer, RendererConfig};
use crate::rpc::{
    AuditLogRequest, AuditLogResponse, Change, ChangeLog, ChangeSet, ConfigService, ReadRequest,
    ReadResponse, RpcError, SearchRequest, SearchResponse,
};
use crate::server::{build_router, AppState, MountSettings};

#[derive(Clone, Debug, PartialEq)]
enum Call {
    AuditLog(AuditLogRequest),
    Search(SearchRequest),
    Read(ReadRequest),
}

#[derive(Default)]
struct FakeConfigService {
    changes: Vec<ChangeLog>,
    configs: Vec<Change>,
    unavailable: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeConfigService {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn down(endpoint: &'static str) -> RpcError {
        RpcError::Remote {
            endpoint,
            status: 500,
            detail: "service unavailable".to_string(),
        }
    }
}

#[async_trait]
impl ConfigService for FakeConfigService {
    async fn audit_log(&self, request: AuditLogRequest) -> Result<AuditLogResponse, RpcError> {
        self.record(Call::AuditLog(request));
        if self.unavailable {
            return Err(Self::down("Config.AuditLog"));
        }
        Ok(AuditLogResponse {
            changes: self.changes.clone(),
        })
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, RpcError> {
        self.record(Call::Search(request));
        if self.unavailable {
            return Err(Self::down("Config.Search"));
        }
        Ok(SearchResponse {
            configs: self.configs.clone(),
        })
    }

    async fn read(&self, request: ReadRequest) -> Result<ReadResponse, RpcError> {
        let id = request.id.clone();
        self.record(Call::Read(request));
        if self.unavailable || id == "missing" {
            return Err(RpcError::Remote {
                endpoint: "Config.Read",
                status: 404,
                detail: format!("{id} not found"),
            });
        }
        Ok(ReadResponse {
            change: self.configs.iter().find(|c| c.id == id).cloned(),
        })
    }
}

fn change(id: &str, author: &str, timestamp: i64) -> Change {
    Change {
        id: id.to_string(),
        path: format!("{id}/settings"),
        author: author.to_string(),
        comment: "tweak".to_string(),
        timestamp,
        change_set: Some(ChangeSet {
            timestamp,
            checksum: "abc123".to_string(),
            data: r#"{"a":1}"#.to_string(),
            source: "cli".to_string(),
        }),
    }
}

fn log(id: &str, timestamp: i64) -> ChangeLog {
    ChangeLog {
        action: "update".to_string(),
        change: Some(change(id, "alice", timestamp)),
    }
}

/// Small templates that print the context values the assertions look at.
fn stub_templates() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let views = [
        ("layout", "{% block body %}{% endblock %}"),
        (
            "index",
            "{% for log in Latest %}{{ log.change.id }};{% endfor %}",
        ),
        (
            "audit",
            "{{ Less }}|{{ More }}|{{ Latest|length }}|{{ URL('audit') }}",
        ),
        ("search", "<form action=\"{{ URL('search') }}\"></form>"),
        (
            "results",
            "{{ Name }}|{{ Results|length }}|{{ Less }}|{{ More }}",
        ),
        (
            "config",
            "{{ Id }}|{{ Config.author }}|{{ JSON(Config.change_set.data) }}",
        ),
    ];
    for (name, body) in views {
        fs::write(dir.path().join(format!("{name}.html")), body).unwrap();
    }
    dir
}

fn state_for(service: Arc<FakeConfigService>, template_dir: PathBuf) -> Arc<AppState> {
    let renderer = Renderer::new(RendererConfig {
        template_dir,
        layout: "layout".to_string(),
        reload: true,
    })
    .unwrap();
    Arc::new(AppState {
        renderer,
        service,
        mount: MountSettings::default(),
    })
}

async fn send(state: Arc<AppState>, request: Request<Body>) -> Response {
    build_router(state).oneshot(request).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn search_by_author_second_page() {
    let service = Arc::new(FakeConfigService {
        configs: vec![
            change("b", "alice", 2),
            change("a", "alice", 1),
            change("c", "alice", 3),
        ],
        ..FakeConfigService::default()
    });
    let dir = stub_templates();
    let state = state_for(service.clone(), dir.path().to_path_buf());

    let response = send(state, post_form("/search", "id=&author=alice&p=2")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "author: alice|3|1|0");
    assert_eq!(
        service.calls(),
        vec![Call::Search(SearchRequest {
            id: String::new(),
            author: "alice".to_string(),
            limit: 25,
            offset: 25,
        })]
    );
}

#[tokio::test]
async fn search_full_page_offers_more() {
    let configs = (0..25).map(|i| change(&format!("cfg{i:02}"), "bob", i)).collect();
    let service = Arc::new(FakeConfigService {
        configs,
        ..FakeConfigService::default()
    });
    let dir = stub_templates();
    let state = state_for(service, dir.path().to_path_buf());

    let response = send(state, post_form("/search", "id=cfg&p=junk")).await;
    assert_eq!(body_text(response).await, "id: cfg|25|0|2");
}

#[tokio::test]
async fn search_failure_redirects_back_to_form() {
    let service = Arc::new(FakeConfigService {
        unavailable: true,
        ..FakeConfigService::default()
    });
    let dir = stub_templates();
    let state = state_for(service, dir.path().to_path_buf());

    let response = send(state.clone(), post_form("/search", "author=alice")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/search");

    let mut request = post_form("/search", "author=alice");
    request
        .headers_mut()
        .insert("x-forwarded-prefix", "/gw/config".parse().unwrap());
    let response = send(state, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/gw/config/search");
}

#[tokio::test]
async fn read_failure_redirects_to_root() {
    let service = Arc::new(FakeConfigService::default());
    let dir = stub_templates();
    let state = state_for(service.clone(), dir.path().to_path_buf());

    let response = send(state, get("/config/missing")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    assert_eq!(
        service.calls(),
        vec![Call::Read(ReadRequest {
            id: "missing".to_string()
        })]
    );
}

#[tokio::test]
async fn config_without_id_redirects_without_calling_service() {
    let service = Arc::new(FakeConfigService::default());
    let dir = stub_templates();
    let state = state_for(service.clone(), dir.path().to_path_buf());

    for uri in ["/config", "/config/"] {
        let response = send(state.clone(), get(uri)).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&response), "/");
    }
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn undecodable_config_id_redirects_to_root() {
    let service = Arc::new(FakeConfigService::default());
    let dir = stub_templates();
    let state = state_for(service.clone(), dir.path().to_path_buf());

    let response = send(state, get("/config/%FF")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn config_page_shows_pretty_data() {
    let service = Arc::new(FakeConfigService {
        configs: vec![change("helloworld", "alice", 1_700_000_000)],
        ..FakeConfigService::default()
    });
    let dir = stub_templates();
    let state = state_for(service, dir.path().to_path_buf());

    let response = send(state, get("/config/helloworld")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.starts_with("helloworld|alice|"), "{body}");
    assert!(body.contains("\n\t"), "{body}");
}

#[tokio::test]
async fn audit_page_tokens_and_request() {
    let changes = (0..25).map(|i| log(&format!("c{i}"), i)).collect();
    let service = Arc::new(FakeConfigService {
        changes,
        ..FakeConfigService::default()
    });
    let dir = stub_templates();
    let state = state_for(service.clone(), dir.path().to_path_buf());

    let response = send(state, get("/audit?p=3&from=100&to=abc")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "2|4|25|/audit");
    assert_eq!(
        service.calls(),
        vec![Call::AuditLog(AuditLogRequest {
            from: 100,
            to: 0,
            limit: 25,
            offset: 50,
            reverse: true,
        })]
    );
}

#[tokio::test]
async fn audit_pager_links_keep_filters() {
    let changes = (0..25).map(|i| log(&format!("c{i}"), i)).collect();
    let service = Arc::new(FakeConfigService {
        changes,
        ..FakeConfigService::default()
    });
    let templates = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
    let state = state_for(service, templates);

    let response = send(state, get("/audit?from=100&to=200&p=2&reverse=1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(
        body.contains(r#"href="/audit?p=1&amp;from=100&amp;to=200&amp;reverse=true""#),
        "{body}"
    );
    assert!(
        body.contains(r#"href="/audit?p=3&amp;from=100&amp;to=200&amp;reverse=true""#),
        "{body}"
    );
}

#[tokio::test]
async fn audit_short_page_has_no_more() {
    let service = Arc::new(FakeConfigService {
        changes: vec![log("only", 1)],
        ..FakeConfigService::default()
    });
    let dir = stub_templates();
    let state = state_for(service, dir.path().to_path_buf());

    let response = send(state, get("/audit")).await;
    assert_eq!(body_text(response).await, "0|0|1|/audit");
}

#[tokio::test]
async fn audit_failure_redirects_to_root() {
    let service = Arc::new(FakeConfigService {
        unavailable: true,
        ..FakeConfigService::default()
    });
    let dir = stub_templates();
    let state = state_for(service, dir.path().to_path_buf());

    let response = send(state, get("/audit?p=2")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn index_orders_oldest_first_unless_reversed() {
    let service = Arc::new(FakeConfigService {
        changes: vec![log("new", 30), log("mid", 20), log("old", 10)],
        ..FakeConfigService::default()
    });
    let dir = stub_templates();
    let state = state_for(service.clone(), dir.path().to_path_buf());

    let response = send(state.clone(), get("/")).await;
    assert_eq!(body_text(response).await, "old;mid;new;");

    let response = send(state, get("/?reverse=true")).await;
    assert_eq!(body_text(response).await, "new;mid;old;");

    for call in service.calls() {
        match call {
            Call::AuditLog(request) => assert!(request.reverse),
            other => panic!("unexpected call {other:?}"),
        }
    }
}

#[tokio::test]
async fn render_failure_redirects_to_root() {
    let dir = stub_templates();
    fs::remove_file(dir.path().join("index.html")).unwrap();
    let service = Arc::new(FakeConfigService::default());
    let state = state_for(service, dir.path().to_path_buf());

    let response = send(state, get("/")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn links_follow_mount_prefix() {
    let service = Arc::new(FakeConfigService::default());
    let dir = stub_templates();
    let state = state_for(service, dir.path().to_path_buf());

    let mut request = get("/search");
    request
        .headers_mut()
        .insert("x-forwarded-prefix", "/gw/config/".parse().unwrap());
    let response = send(state.clone(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "<form action=\"/gw/config/search\"></form>"
    );

    let response = send(state, get("/search")).await;
    assert_eq!(body_text(response).await, "<form action=\"/search\"></form>");
}

#[tokio::test]
async fn template_edits_show_up_without_restart() {
    let service = Arc::new(FakeConfigService::default());
    let dir = stub_templates();
    let state = state_for(service, dir.path().to_path_buf());

    let response = send(state.clone(), get("/search")).await;
    assert_eq!(body_text(response).await, "<form action=\"/search\"></form>");

    fs::write(dir.path().join("search.html"), "edited").unwrap();
    let response = send(state, get("/search")).await;
    assert_eq!(body_text(response).await, "edited");
}

#[tokio::test]
async fn bundled_templates_render_every_view() {
    let service = Arc::new(FakeConfigService {
        changes: vec![
            log("helloworld", 1_700_000_000),
            ChangeLog {
                action: "delete".to_string(),
                change: None,
            },
        ],
        configs: vec![change("helloworld", "alice", 1_700_000_000)],
        ..FakeConfigService::default()
    });
    let templates = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
    let state = state_for(service, templates);

    let requests = vec![
        get("/"),
        get("/audit?p=2"),
        get("/search"),
        post_form("/search", "author=alice&p=2"),
        get("/config/helloworld"),
        get("/config/unknown"),
    ];
    for request in requests {
        let uri = request.uri().to_string();
        let response = send(state.clone(), request).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = body_text(response).await;
        assert!(body.contains("<nav>"), "{uri}");
    }
}

fn params(pairs: &[(&str, &str)]) -> RawParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn descriptor_for_known_scenario() {
    let descriptor = QueryDescriptor::from_params(&params(&[
        ("id", ""),
        ("author", "alice"),
        ("p", "2"),
    ]));
    assert_eq!(descriptor.offset, 25);
    assert_eq!(descriptor.describe_search(), "author: alice");
    let window = PaginationWindow::for_query(&descriptor, 10);
    assert_eq!(window.less, Some(1));
    assert_eq!(window.more, None);
}

#[test]
fn mount_prefix_join_matches_links() {
    let prefix = MountPrefix::parse("/gw").unwrap();
    assert_eq!(prefix.join("config/x"), "/gw/config/x");
    assert_eq!(MountPrefix::root().join("audit?p=2"), "/audit?p=2");
}

proptest! {
    #[test]
    fn page_is_always_at_least_one(raw in ".{0,12}") {
        prop_assert!(parse_page(Some(&raw)) >= 1);
    }

    #[test]
    fn offset_follows_page(page in 1u64..100_000) {
        let descriptor = QueryDescriptor::from_params(&params(&[("p", &page.to_string())]));
        prop_assert_eq!(descriptor.page, page);
        prop_assert_eq!(descriptor.limit, PAGE_LIMIT);
        prop_assert_eq!(descriptor.offset, (page - 1) * PAGE_LIMIT);
        prop_assert_eq!(page_offset(page, PAGE_LIMIT), descriptor.offset);
    }

    #[test]
    fn window_tokens_follow_page_and_count(page in 1u64..10_000, returned in 0usize..60) {
        let window = PaginationWindow::compute(page, PAGE_LIMIT, returned);
        prop_assert_eq!(window.less.is_some(), page > 1);
        prop_assert_eq!(window.more.is_some(), returned as u64 == PAGE_LIMIT);
        if let Some(less) = window.less {
            prop_assert_eq!(less, page - 1);
        }
        if let Some(more) = window.more {
            prop_assert_eq!(more, page + 1);
        }
    }

    #[test]
    fn change_log_sort_is_stable(stamps in proptest::collection::vec(0i64..5, 0..40), reverse: bool) {
        let mut logs: Vec<ChangeLog> = stamps
            .iter()
            .enumerate()
            .map(|(i, ts)| log(&i.to_string(), *ts))
            .collect();
        ordering::sort_change_logs(&mut logs, reverse);

        for pair in logs.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if reverse {
                prop_assert!(a.timestamp() >= b.timestamp());
            } else {
                prop_assert!(a.timestamp() <= b.timestamp());
            }
            if a.timestamp() == b.timestamp() {
                let ia: usize = a.change.as_ref().unwrap().id.parse().unwrap();
                let ib: usize = b.change.as_ref().unwrap().id.parse().unwrap();
                prop_assert!(ia < ib);
            }
        }
    }
}
