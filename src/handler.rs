//! Handler trait, type erasure, and the [`Next`] continuation.
//!
//! # How handlers are stored
//!
//! A compiled chain holds handlers of *different* concrete types — every
//! middleware's wrap closure returns its own anonymous `async` type. Rust
//! collections can only hold one concrete type, so we use **trait objects**
//! (`dyn ErasedHandler`) to hide each concrete handler behind a common
//! interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ stack.apply(hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(hello(req))                             ← BoxFuture
//! ```
//!
//! The only runtime cost per request is **one Arc clone** (atomic inc) +
//! **one virtual call** per middleware layer — negligible compared to the
//! work the layers themselves do.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;

// ── Request / Response ────────────────────────────────────────────────────────

/// An incoming request. Plain [`http`] types with a [`Bytes`] body —
/// lamina ships no transport, so there is nothing more exotic to carry.
pub type Request = http::Request<Bytes>;

/// An outgoing response.
pub type Response = http::Response<Bytes>;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place — it cannot move it in memory after the first poll.
/// `Send + 'static` let the runtime move the future across threads safely.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
/// External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `#[doc(hidden)] pub` for the same reason as `ErasedHandler`.
/// `Arc` gives us cheap, thread-safe shared ownership (one atomic reference
/// count increment per request) without copying the handler.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure returning a future) with the signature:
///
/// ```text
/// async fn name(req: Request) -> Response
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// impls below can satisfy it. This prevents accidental misuse and keeps
/// the API surface stable across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
}

/// Implement `Handler` for any function with the right signature.
///
/// `Fn(Request) -> Fut` covers:
///   - named `async fn` items
///   - closures returning an `async move` block
///   - any struct that implements `Fn`
impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        Box::pin((self.0)(req))
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of the chain, handed to a middleware's wrap closure.
///
/// Calling [`Next::run`] forwards the request to the next layer (ultimately
/// the inner handler). A middleware is free to call it once, not at all
/// (short-circuit), and to inspect or replace the request before and the
/// response after.
///
/// `Next` also doubles as the public way to invoke any [`BoxedHandler`],
/// including a fully composed chain:
///
/// ```rust,no_run
/// # use lamina::{Next, Request, Stack};
/// # async fn demo(stack: Stack, handler: impl lamina::Handler, req: Request) {
/// let composed = stack.apply(handler).unwrap();
/// let _res = Next::from(composed).run(req).await;
/// # }
/// ```
#[derive(Clone)]
pub struct Next(pub(crate) BoxedHandler);

impl Next {
    /// Forwards `req` to the remainder of the chain.
    pub async fn run(&self, req: Request) -> Response {
        self.0.call(req).await
    }
}

impl From<BoxedHandler> for Next {
    fn from(handler: BoxedHandler) -> Self {
        Self(handler)
    }
}

// `|next| next` is the identity middleware: constraints without behavior.
impl private::Sealed for Next {}

impl Handler for Next {
    fn into_boxed_handler(self) -> BoxedHandler {
        self.0
    }
}
