//! Router behaviour through the public API, without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use axum::http::{Method, StatusCode};

use pathmux::config::RouterConfig;
use pathmux::routing::RouteError;
use pathmux::{handler_fn, middleware_fn, Chain, Router};

mod common;

use common::{body, serve};

/// Handler that echoes every param as sorted `name=value` lines. Raw
/// segments show up too, under their own text.
fn echo_params() -> impl pathmux::Handler {
    handler_fn(|w, _, ctx| {
        let mut lines: Vec<String> = ctx
            .all_params()
            .iter()
            .map(|(name, values)| format!("{name}={}", values.join(",")))
            .collect();
        lines.sort();
        w.write_str(&lines.join("\n"));
    })
}

fn tag(label: &'static str) -> impl pathmux::Handler {
    handler_fn(move |w, _, _| w.write_str(label))
}

#[test]
fn test_exact_match_is_case_insensitive() {
    let mut router = Router::new();
    router.get("/Users/List", tag("list")).unwrap();

    assert_eq!(body(&serve(&router, Method::GET, "/users/list")), "list");
    assert_eq!(body(&serve(&router, Method::GET, "/USERS/LIST")), "list");
    assert_eq!(serve(&router, Method::POST, "/users/list").status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_raw_beats_match() {
    let mut router = Router::new();
    router.get("/users/:id", echo_params()).unwrap();
    router.get("/users/me", tag("me")).unwrap();

    assert_eq!(body(&serve(&router, Method::GET, "/users/me")), "me");
    assert!(body(&serve(&router, Method::GET, "/users/42")).contains("id=42"));
}

#[test]
fn test_backtracks_out_of_dead_raw_branch() {
    let mut router = Router::new();
    router.get("/users/new/edit", tag("edit")).unwrap();
    router.get("/users/:id/profile", echo_params()).unwrap();

    assert_eq!(body(&serve(&router, Method::GET, "/users/new/edit")), "edit");
    assert!(body(&serve(&router, Method::GET, "/users/new/profile")).contains("id=new"));
}

#[test]
fn test_wildcard_only_after_everything_else_fails() {
    let mut router = Router::new();
    router.get("/files/readme", tag("readme")).unwrap();
    router.get("/files/*path", echo_params()).unwrap();
    router.get("/api/*rest", echo_params()).unwrap();
    router.get("/api/v1/:resource", echo_params()).unwrap();

    assert_eq!(body(&serve(&router, Method::GET, "/files/readme")), "readme");
    assert!(body(&serve(&router, Method::GET, "/files/a/b")).contains("path=a/b"));

    // a deeper capture route wins over the shallower wildcard
    let w = serve(&router, Method::GET, "/api/v1/status");
    assert!(body(&w).contains("resource=status"));
    assert!(!body(&w).contains("rest="));
    assert!(body(&serve(&router, Method::GET, "/api/v2/status")).contains("rest=v2/status"));
    assert!(body(&serve(&router, Method::GET, "/api/v1/a/b")).contains("rest=v1/a/b"));
    assert!(router.has_wildcard());
}

#[test]
fn test_capture_and_wildcard_siblings_conflict() {
    let mut router = Router::new();
    router.get("/api/:version/status", tag("status")).unwrap();
    assert!(matches!(
        router.get("/api/*rest", tag("rest")),
        Err(RouteError::ConflictingSegment { .. })
    ));
    assert!(!router.has_wildcard());
    assert_eq!(body(&serve(&router, Method::GET, "/api/v1/status")), "status");
}

#[test]
fn test_route_without_handler_is_not_found() {
    let mut router = Router::new();
    router.get("/a/b/c", tag("c")).unwrap();
    router.get("/a/:x", echo_params()).unwrap();
    assert_eq!(serve(&router, Method::GET, "/a/b").status(), StatusCode::NOT_FOUND);
    assert!(body(&serve(&router, Method::GET, "/a/z")).contains("x=z"));

    router.get("/files/x/y", tag("y")).unwrap();
    router.get("/files/*rest", echo_params()).unwrap();
    assert_eq!(serve(&router, Method::GET, "/files/x").status(), StatusCode::NOT_FOUND);
    assert!(body(&serve(&router, Method::GET, "/files/z/w")).contains("rest=z/w"));
}

#[test]
fn test_failed_registration_does_not_block_later_routes() {
    let mut router = Router::new();
    assert!(matches!(
        router.get("/x/:id/#(", tag("")),
        Err(RouteError::InvalidRegex { .. })
    ));
    router.get("/x/*rest", echo_params()).unwrap();
    assert!(body(&serve(&router, Method::GET, "/x/1/2")).contains("rest=1/2"));
}

#[test]
fn test_regex_segments() {
    let mut router = Router::new();
    router.get(r"/archive/#{year}\d{4}", echo_params()).unwrap();
    router.get(r"/month/#{date}(\d{4})-(\d{2})", echo_params()).unwrap();

    assert!(body(&serve(&router, Method::GET, "/archive/2024")).contains("year=2024"));
    assert_eq!(serve(&router, Method::GET, "/archive/24").status(), StatusCode::NOT_FOUND);
    assert!(body(&serve(&router, Method::GET, "/month/2024-05")).contains("date=2024-05,2024,05"));
}

#[test]
fn test_registration_errors() {
    let mut router = Router::new();
    router.get("/a/:x", tag("x")).unwrap();

    assert!(matches!(
        router.get("a/b", tag("")),
        Err(RouteError::MissingLeadingSlash { .. })
    ));
    assert!(matches!(
        router.handle_chain(Method::GET, "/b", Chain::new()),
        Err(RouteError::MissingHandler { .. })
    ));
    assert!(matches!(
        router.get("/a/:x", tag("")),
        Err(RouteError::Redefined { .. })
    ));
    assert!(matches!(
        router.get("/a/:y", tag("")),
        Err(RouteError::ConflictingSegment { .. })
    ));
    assert!(matches!(
        router.get("/c/*rest/d", tag("")),
        Err(RouteError::WildcardNotLast { .. })
    ));
    assert!(matches!(router.get("/d/#", tag("")), Err(RouteError::EmptyRegex { .. })));
    assert!(matches!(
        router.get("/d/#{id", tag("")),
        Err(RouteError::UnclosedRegexName { .. })
    ));
    assert!(matches!(
        router.get("/d/#(", tag("")),
        Err(RouteError::InvalidRegex { .. })
    ));
    assert!(matches!(
        router.serve_files("/static", "/tmp", None),
        Err(RouteError::InvalidFilesPath { .. })
    ));

    // the first route still works after all the failures
    assert_eq!(body(&serve(&router, Method::GET, "/a/1")), "x");
}

#[test]
fn test_middleware_order_and_short_circuit() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let outer_log = Arc::clone(&log);
    let gate_log = Arc::clone(&log);
    let chain = Chain::new()
        .append(middleware_fn(move |w, req, ctx, next| {
            outer_log.lock().unwrap().push("outer");
            next.run(w, req, ctx);
        }))
        .append(middleware_fn(move |w, req, ctx, next| {
            gate_log.lock().unwrap().push("gate");
            if req.headers().contains_key("x-allow") {
                next.run(w, req, ctx);
            } else {
                w.text(StatusCode::FORBIDDEN, "denied");
            }
        }))
        .handler(tag("handler"));

    let mut router = Router::new();
    router.handle_chain(Method::GET, "/guarded", chain).unwrap();

    let w = serve(&router, Method::GET, "/guarded");
    assert_eq!(w.status(), StatusCode::FORBIDDEN);
    assert_eq!(*log.lock().unwrap(), vec!["outer", "gate"]);

    let req = axum::http::Request::builder()
        .uri("/guarded")
        .header("x-allow", "1")
        .body(axum::body::Bytes::new())
        .unwrap();
    let mut w = pathmux::ResponseWriter::new();
    router.serve(&mut w, &req);
    assert_eq!(body(&w), "handler");
}

#[test]
fn test_custom_not_found() {
    let mut router = Router::new();
    assert_eq!(body(&serve(&router, Method::GET, "/nope")), "404 page not found\n");

    router.set_not_found(handler_fn(|w, _, _| w.text(StatusCode::NOT_FOUND, "custom")));
    assert_eq!(body(&serve(&router, Method::GET, "/nope")), "custom");
}

#[test]
fn test_trailing_slash_modes() {
    let mut relaxed = Router::new();
    relaxed.get("/users/", tag("users")).unwrap();
    assert_eq!(serve(&relaxed, Method::GET, "/users").status(), StatusCode::OK);
    assert_eq!(serve(&relaxed, Method::GET, "/users/").status(), StatusCode::OK);

    let mut strict = Router::with_config(RouterConfig {
        strict_trailing_slash: true,
    });
    strict.get("/users/", tag("users")).unwrap();
    assert_eq!(serve(&strict, Method::GET, "/users").status(), StatusCode::NOT_FOUND);
    assert_eq!(serve(&strict, Method::GET, "/users/").status(), StatusCode::OK);
}

#[test]
fn test_panic_handler_recovers() {
    let mut router = Router::new();
    router
        .get(
            "/boom",
            handler_fn(|w, _, _| {
                w.write_str("partial");
                panic!("kaboom");
            }),
        )
        .unwrap();
    router.set_panic_handler(|w, _, payload| {
        let message = pathmux::routing::panic_message(payload.as_ref());
        w.text(StatusCode::INTERNAL_SERVER_ERROR, &message);
    });

    let w = serve(&router, Method::GET, "/boom");
    assert_eq!(w.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body(&w), "kaboom");
}

#[test]
fn test_concurrent_dispatch() {
    let mut router = Router::new();
    router
        .get("/items/:id", handler_fn(|w, _, ctx| w.write_str(ctx.param("id").unwrap_or(""))))
        .unwrap();
    router
        .get("/static/*path", handler_fn(|w, _, ctx| w.write_str(ctx.param("path").unwrap_or(""))))
        .unwrap();
    let served = AtomicUsize::new(0);

    thread::scope(|scope| {
        for t in 0..8 {
            let router = &router;
            let served = &served;
            scope.spawn(move || {
                for i in 0..100 {
                    let id = format!("{t}-{i}");
                    let w = serve(router, Method::GET, &format!("/items/{id}"));
                    assert_eq!(body(&w), id);

                    let w = serve(router, Method::GET, &format!("/static/{t}/{i}.css"));
                    assert_eq!(body(&w), format!("{t}/{i}.css"));
                    served.fetch_add(2, Ordering::Relaxed);
                }
            });
        }
    });

    assert_eq!(served.load(Ordering::Relaxed), 1600);
}

#[test]
fn test_routes_listing() {
    let mut router = Router::new();
    router.get("/", tag("root")).unwrap();
    router.get("/users/:id", tag("user")).unwrap();
    router.post("/users", tag("create")).unwrap();

    let routes: Vec<(String, String)> = router
        .routes()
        .into_iter()
        .map(|(m, p)| (m.to_string(), p))
        .collect();
    assert_eq!(
        routes,
        vec![
            ("GET".to_string(), "/".to_string()),
            ("GET".to_string(), "/users/:id".to_string()),
            ("POST".to_string(), "/users".to_string()),
        ]
    );
}
