//! # lamina
//!
//! Named, constraint-ordered middleware composition. Nothing more.
//! Nothing less.
//!
//! ## The contract
//!
//! Your framework handles transport, routing, and what each middleware
//! actually does inside. lamina does not — by design. It answers exactly
//! one question: given a set of named middlewares that each declare what
//! they must run before, after, and alongside, in what order do they wrap
//! the handler — and it hands you the composed result.
//!
//! What lamina intentionally ignores:
//!
//! - **Transport** — no server, no listener; handlers are plain `async fn`s
//!   over [`http`] types
//! - **Routing** — one chain wraps one handler; mount it wherever you like
//! - **Middleware semantics** — auth, tracing, CORS internals are yours
//!
//! What's left — the only part that is genuinely error-prone by hand:
//!
//! - Constraint resolution — `requires` existence checks with every
//!   violation reported at once, `before`/`after` ordering via a stable
//!   topological sort, cycles rejected instead of looping
//! - Composition — the resolved order folded into one reusable handler,
//!   first-ordered middleware outermost
//!
//! ## Quick start
//!
//! ```rust
//! use bytes::Bytes;
//! use lamina::{Middleware, Next, Request, Response, Stack};
//!
//! let mut stack = Stack::new();
//!
//! stack.push(Middleware::new("trace", |next: Next| {
//!     move |req: Request| {
//!         let next = next.clone();
//!         async move { next.run(req).await }
//!     }
//! }));
//!
//! stack.push(
//!     Middleware::new("auth", |next: Next| {
//!         move |req: Request| {
//!             let next = next.clone();
//!             async move {
//!                 if req.headers().contains_key("authorization") {
//!                     next.run(req).await
//!                 } else {
//!                     http::Response::builder()
//!                         .status(401)
//!                         .body(Bytes::new())
//!                         .unwrap()
//!                 }
//!             }
//!         }
//!     })
//!     .after(["trace"]),
//! );
//!
//! assert_eq!(stack.describe()?, "trace -> auth");
//!
//! let handler = stack.apply(|_req: Request| async {
//!     http::Response::builder()
//!         .status(200)
//!         .body(Bytes::from_static(b"ok"))
//!         .unwrap()
//! })?;
//! # let _ = handler;
//! # Ok::<(), lamina::Error>(())
//! ```
//!
//! Configuration is single-threaded and happens once, before traffic; the
//! composed handler is immutable and safe to invoke from any number of
//! concurrent tasks.

mod error;
mod graph;
mod handler;
mod middleware;
mod stack;

pub use error::Error;
pub use handler::{BoxedHandler, Handler, Next, Request, Response};
pub use middleware::Middleware;
pub use stack::{Chain, Stack};
