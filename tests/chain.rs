//! End-to-end tests: constraint resolution observed through the public
//! surface, plus invocation order through an actually composed chain.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use lamina::{Error, Middleware, Next, Request, Response, Stack};

type Log = Arc<Mutex<Vec<String>>>;

/// A middleware that records `{name}-enter` / `{name}-exit` around the
/// rest of the chain.
fn recording(name: &'static str, log: &Log) -> Middleware {
    let log = Arc::clone(log);
    Middleware::new(name, move |next: Next| {
        let log = Arc::clone(&log);
        move |req: Request| {
            let log = Arc::clone(&log);
            let next = next.clone();
            async move {
                log.lock().unwrap().push(format!("{name}-enter"));
                let res = next.run(req).await;
                log.lock().unwrap().push(format!("{name}-exit"));
                res
            }
        }
    })
}

type BoxFuture = std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>;

/// An inner handler that records one marker and answers 200.
fn recording_handler(log: Log) -> impl Fn(Request) -> BoxFuture + Send + Sync + 'static {
    move |_req: Request| {
        let log = Arc::clone(&log);
        Box::pin(async move {
            log.lock().unwrap().push("inner".to_owned());
            ok()
        })
    }
}

/// A middleware with constraints only, no behavior.
fn passthrough(name: &'static str) -> Middleware {
    Middleware::new(name, |next: Next| next)
}

fn ok() -> Response {
    http::Response::builder()
        .status(200)
        .body(Bytes::from_static(b"ok"))
        .unwrap()
}

fn request() -> Request {
    http::Request::builder().uri("/").body(Bytes::new()).unwrap()
}

// ── Ordering ──────────────────────────────────────────────────────────────────

#[test]
fn before_and_after_are_honored() {
    let mut stack = Stack::new();
    stack.push(passthrough("compress"));
    stack.push(passthrough("trace").before(["compress"]));
    stack.push(passthrough("auth").after(["trace"]).before(["compress"]));

    let chain = stack.compile().unwrap();
    let pos = |name: &str| chain.names().iter().position(|n| n == name).unwrap();

    assert!(pos("trace") < pos("compress"));
    assert!(pos("trace") < pos("auth"));
    assert!(pos("auth") < pos("compress"));
}

#[test]
fn unconstrained_middlewares_keep_registration_order() {
    let mut stack = Stack::new();
    stack.push(passthrough("one"));
    stack.push(passthrough("two"));
    stack.push(passthrough("three"));

    assert_eq!(stack.describe().unwrap(), "one -> two -> three");
}

#[test]
fn requires_affects_validation_but_never_order() {
    let mut stack = Stack::new();
    stack.push(passthrough("session"));
    stack.push(passthrough("auth").requires(["session"]));

    // `auth` requires `session` but declares no ordering against it, so
    // registration order stands.
    assert_eq!(stack.describe().unwrap(), "session -> auth");
}

#[test]
fn unknown_before_after_targets_are_inert() {
    let mut stack = Stack::new();
    stack.push(passthrough("a").before(["never-registered"]));
    stack.push(passthrough("b").after(["also-missing"]));

    assert_eq!(stack.describe().unwrap(), "a -> b");
}

#[test]
fn compiling_twice_yields_the_same_order() {
    let mut stack = Stack::new();
    stack.push(passthrough("gzip"));
    stack.push(passthrough("cors").before(["gzip"]));
    stack.push(passthrough("trace").before(["cors"]));

    let first = stack.describe().unwrap();
    let second = stack.describe().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "trace -> cors -> gzip");
}

// ── Validation failures ───────────────────────────────────────────────────────

#[test]
fn every_missing_requirement_is_reported() {
    let mut stack = Stack::new();
    stack.push(passthrough("a").requires(["b"]));
    stack.push(passthrough("c").requires(["d"]));

    let err = stack.compile().unwrap_err();
    assert_eq!(
        err,
        Error::MissingRequirement {
            violations: vec![
                ("a".to_owned(), "b".to_owned()),
                ("c".to_owned(), "d".to_owned()),
            ],
        }
    );
}

#[test]
fn constraint_cycle_fails_compilation() {
    let mut stack = Stack::new();
    stack.push(passthrough("a").before(["b"]));
    stack.push(passthrough("b").before(["a"]));

    let err = stack.compile().unwrap_err();
    assert_eq!(
        err,
        Error::ConstraintCycle { members: vec!["a".to_owned(), "b".to_owned()] }
    );
}

#[test]
fn duplicate_names_fail_compilation() {
    let mut stack = Stack::new();
    stack.push(passthrough("auth"));
    stack.push(passthrough("auth"));

    let err = stack.compile().unwrap_err();
    assert_eq!(err, Error::DuplicateName { name: "auth".to_owned() });
}

// ── Removal ───────────────────────────────────────────────────────────────────

#[test]
fn removal_excludes_the_middleware_from_recompiles() {
    let mut stack = Stack::new();
    stack.push(passthrough("trace"));
    stack.push(passthrough("auth"));
    stack.push(passthrough("compress"));

    stack.remove("auth");
    assert_eq!(stack.describe().unwrap(), "trace -> compress");
}

#[test]
fn removal_drops_every_match_and_tolerates_unknown_names() {
    let mut stack = Stack::new();
    stack.push(passthrough("dup"));
    stack.push(passthrough("keep"));
    stack.push(passthrough("dup"));

    stack.remove("dup");
    stack.remove("not-there");
    assert_eq!(stack.describe().unwrap(), "keep");
}

#[test]
fn dangling_requires_after_removal_fails_the_next_compile() {
    let mut stack = Stack::new();
    stack.push(passthrough("session"));
    stack.push(passthrough("auth").requires(["session"]));

    assert!(stack.compile().is_ok());
    stack.remove("session");

    let err = stack.compile().unwrap_err();
    assert_eq!(
        err,
        Error::MissingRequirement {
            violations: vec![("auth".to_owned(), "session".to_owned())],
        }
    );
}

#[test]
fn dangling_before_after_after_removal_is_inert() {
    let mut stack = Stack::new();
    stack.push(passthrough("a").before(["b"]));
    stack.push(passthrough("b"));

    stack.remove("b");
    assert_eq!(stack.describe().unwrap(), "a");
}

// ── Composition ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_ordered_middleware_is_outermost() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let mut stack = Stack::new();
    // Registered inner-first; the constraint flips them.
    stack.push(recording("y", &log));
    stack.push(recording("x", &log).before(["y"]));

    assert_eq!(stack.describe().unwrap(), "x -> y");

    let handler = stack.apply(recording_handler(log.clone())).unwrap();
    Next::from(handler).run(request()).await;

    assert_eq!(
        *log.lock().unwrap(),
        ["x-enter", "y-enter", "inner", "y-exit", "x-exit"]
    );
}

#[tokio::test]
async fn compiled_chain_is_reusable() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let mut stack = Stack::new();
    stack.push(recording("only", &log));

    let handler = Next::from(stack.apply(recording_handler(log.clone())).unwrap());
    handler.run(request()).await;
    handler.run(request()).await;

    assert_eq!(
        *log.lock().unwrap(),
        ["only-enter", "inner", "only-exit", "only-enter", "inner", "only-exit"]
    );
}

#[tokio::test]
async fn chain_outlives_later_stack_mutations() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let mut stack = Stack::new();
    stack.push(recording("survivor", &log));
    let handler = Next::from(stack.apply(recording_handler(log.clone())).unwrap());

    stack.remove("survivor");
    assert_eq!(stack.describe().unwrap(), "");

    // The already-composed handler still carries the removed middleware.
    handler.run(request()).await;
    assert_eq!(*log.lock().unwrap(), ["survivor-enter", "inner", "survivor-exit"]);
}

#[tokio::test]
async fn empty_stack_composes_to_the_inner_handler() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let stack = Stack::new();
    assert_eq!(stack.describe().unwrap(), "");

    let handler = stack.apply(recording_handler(log.clone())).unwrap();
    let res = Next::from(handler).run(request()).await;

    assert_eq!(res.status(), 200);
    assert_eq!(*log.lock().unwrap(), ["inner"]);
}

#[tokio::test]
async fn middleware_can_short_circuit() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let mut stack = Stack::new();
    stack.push(Middleware::new("gate", |next: Next| {
        move |req: Request| {
            let next = next.clone();
            async move {
                if req.headers().contains_key("authorization") {
                    next.run(req).await
                } else {
                    http::Response::builder()
                        .status(401)
                        .body(Bytes::new())
                        .unwrap()
                }
            }
        }
    }));

    let handler = Next::from(stack.apply(recording_handler(log.clone())).unwrap());

    let denied = handler.run(request()).await;
    assert_eq!(denied.status(), 401);
    assert!(log.lock().unwrap().is_empty());

    let authed = http::Request::builder()
        .uri("/")
        .header("authorization", "Bearer t")
        .body(Bytes::new())
        .unwrap();
    let allowed = handler.run(authed).await;
    assert_eq!(allowed.status(), 200);
    assert_eq!(*log.lock().unwrap(), ["inner"]);
}
