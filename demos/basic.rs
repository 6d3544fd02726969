//! Minimal lamina example — three middlewares with ordering constraints.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! `request-id` registers last but declares itself before everything else,
//! `auth` requires `request-id` to exist and runs after `trace`. The stack
//! resolves this to: request-id -> trace -> auth.

use bytes::Bytes;
use lamina::{Middleware, Next, Request, Response, Stack};

fn main() {
    tracing_subscriber::fmt::init();

    let mut stack = Stack::new();
    stack.push(trace());
    stack.push(auth());
    stack.push(request_id());

    let order = stack.describe().expect("invalid middleware configuration");
    println!("resolved order: {order}");

    let handler = stack.apply(hello).expect("invalid middleware configuration");

    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let res = runtime.block_on(async move {
        let req = http::Request::builder()
            .uri("/hello")
            .header("authorization", "Bearer demo")
            .body(Bytes::new())
            .unwrap();
        Next::from(handler).run(req).await
    });

    println!("status: {}", res.status());
    println!("request-id: {:?}", res.headers().get("x-request-id"));
}

// Innermost: the actual application handler.
async fn hello(_req: Request) -> Response {
    http::Response::builder()
        .status(200)
        .body(Bytes::from_static(b"hello"))
        .unwrap()
}

// Stamps a request id onto the response. Declares itself ahead of every
// other middleware so the id exists for the whole round trip.
fn request_id() -> Middleware {
    Middleware::new("request-id", |next: Next| {
        move |req: Request| {
            let next = next.clone();
            async move {
                let mut res = next.run(req).await;
                res.headers_mut()
                    .insert("x-request-id", http::HeaderValue::from_static("demo-0001"));
                res
            }
        }
    })
    .before(["trace", "auth"])
}

// Logs each request as it passes through.
fn trace() -> Middleware {
    Middleware::new("trace", |next: Next| {
        move |req: Request| {
            let next = next.clone();
            async move {
                let path = req.uri().path().to_owned();
                let res = next.run(req).await;
                tracing::info!(%path, status = %res.status(), "handled");
                res
            }
        }
    })
}

// Rejects requests without an authorization header.
fn auth() -> Middleware {
    Middleware::new("auth", |next: Next| {
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
    })
    .requires(["request-id"])
    .after(["trace"])
}
