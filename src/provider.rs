//! Providers: the callable construction step behind a dependent.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::DiResult;
use crate::schema::Schema;
use crate::scope_state::Finalizer;

/// A type-erased constructed value, shared via `Arc` so cached results can
/// be handed to every dependent that shares a cache key.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// Boxed future of a provider's construction result.
pub type BoxFutureResult<'a> = Pin<Box<dyn Future<Output = DiResult<(AnyValue, Option<Finalizer>)>> + Send + 'a>>;

/// The shape of a provider's construction, mirroring the four injectable
/// natures a factory can declare.
///
/// `SyncGenerator` and `AsyncGenerator` providers don't literally suspend —
/// Rust has no stable generators — instead they run to the point a Python
/// generator would `yield`, returning the constructed value together with
/// the [`Finalizer`] that will run at scope teardown. This preserves the
/// two-phase acquire/release contract without needing unstable language
/// features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nature {
    /// A plain synchronous function; nothing to tear down.
    PlainSync,
    /// An async function; nothing to tear down.
    Coroutine,
    /// A synchronous two-phase resource: construct, then a sync finalizer.
    SyncGenerator,
    /// An asynchronous two-phase resource: construct, then an async
    /// finalizer.
    AsyncGenerator,
}

impl Nature {
    /// `true` for the two generator natures, which may register a
    /// finalizer on the owning scope's teardown stack.
    pub fn is_generator(&self) -> bool {
        matches!(self, Nature::SyncGenerator | Nature::AsyncGenerator)
    }

    /// `true` for the two async natures, which require an async-capable
    /// executor to run.
    pub fn is_async(&self) -> bool {
        matches!(self, Nature::Coroutine | Nature::AsyncGenerator)
    }
}

enum Call {
    Sync(Arc<dyn Fn(&[AnyValue]) -> DiResult<(AnyValue, Option<Finalizer>)> + Send + Sync>),
    Async(Arc<dyn for<'a> Fn(&'a [AnyValue]) -> BoxFutureResult<'a> + Send + Sync>),
}

/// A registered factory: its [`Nature`], its parameter [`Schema`], and the
/// boxed callable the solver's built `Task` ultimately invokes.
///
/// Two `ProviderSpec`s registered from the same call to
/// [`ProviderSpec::sync`]/[`ProviderSpec::async_fn`]/etc. are distinct
/// identities even if their closures are behaviorally identical — identity
/// is the `Arc` pointer address, which is what [`crate::key::CacheKey::Shared`]
/// keys off of.
#[derive(Clone)]
pub struct ProviderSpec {
    name: &'static str,
    nature: Nature,
    schema: Arc<Schema>,
    call: Call,
}

impl fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("name", &self.name)
            .field("nature", &self.nature)
            .finish()
    }
}

impl ProviderSpec {
    /// Wrap a plain synchronous factory. `f` receives the resolved
    /// parameter values in schema order and returns the constructed value.
    pub fn sync<F>(name: &'static str, schema: Schema, f: F) -> Self
    where
        F: Fn(&[AnyValue]) -> DiResult<AnyValue> + Send + Sync + 'static,
    {
        let call = Call::Sync(Arc::new(move |args: &[AnyValue]| Ok((f(args)?, None))));
        ProviderSpec {
            name,
            nature: Nature::PlainSync,
            schema: Arc::new(schema),
            call,
        }
    }

    /// Wrap a synchronous two-phase factory that returns both its value and
    /// the finalizer to run at scope exit.
    pub fn sync_generator<F>(name: &'static str, schema: Schema, f: F) -> Self
    where
        F: Fn(&[AnyValue]) -> DiResult<(AnyValue, Finalizer)> + Send + Sync + 'static,
    {
        let call = Call::Sync(Arc::new(move |args: &[AnyValue]| {
            let (value, finalizer) = f(args)?;
            Ok((value, Some(finalizer)))
        }));
        ProviderSpec {
            name,
            nature: Nature::SyncGenerator,
            schema: Arc::new(schema),
            call,
        }
    }

    /// Wrap an async factory with no teardown.
    pub fn async_fn<F, Fut>(name: &'static str, schema: Schema, f: F) -> Self
    where
        F: for<'a> Fn(&'a [AnyValue]) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DiResult<AnyValue>> + Send + 'static,
    {
        let f = Arc::new(f);
        let call = Call::Async(Arc::new(move |args: &[AnyValue]| {
            let f = f.clone();
            let args = args.to_vec();
            Box::pin(async move { Ok((f(&args).await?, None)) }) as BoxFutureResult<'static>
        }));
        ProviderSpec {
            name,
            nature: Nature::Coroutine,
            schema: Arc::new(schema),
            call,
        }
    }

    /// Wrap an async two-phase factory that resolves to both its value and
    /// the async finalizer to run at scope exit.
    pub fn async_generator<F, Fut>(name: &'static str, schema: Schema, f: F) -> Self
    where
        F: for<'a> Fn(&'a [AnyValue]) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DiResult<(AnyValue, Finalizer)>> + Send + 'static,
    {
        let f = Arc::new(f);
        let call = Call::Async(Arc::new(move |args: &[AnyValue]| {
            let f = f.clone();
            let args = args.to_vec();
            Box::pin(async move {
                let (value, finalizer) = f(&args).await?;
                Ok((value, Some(finalizer)))
            }) as BoxFutureResult<'static>
        }));
        ProviderSpec {
            name,
            nature: Nature::AsyncGenerator,
            schema: Arc::new(schema),
            call,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn nature(&self) -> Nature {
        self.nature
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// A stable identity for this provider, used to build
    /// [`crate::key::CacheKey::Shared`]. Two clones of the same
    /// `ProviderSpec` share an identity; two separately-registered
    /// providers never do, even with identical bodies.
    pub fn identity(&self) -> usize {
        match &self.call {
            Call::Sync(f) => Arc::as_ptr(f) as *const () as usize,
            Call::Async(f) => Arc::as_ptr(f) as *const () as usize,
        }
    }

    /// Invoke a synchronous provider. Panics if this provider is async —
    /// the executor is responsible for only calling this on
    /// [`Nature::PlainSync`] / [`Nature::SyncGenerator`] tasks.
    pub fn call_sync(&self, args: &[AnyValue]) -> DiResult<(AnyValue, Option<Finalizer>)> {
        match &self.call {
            Call::Sync(f) => f(args),
            Call::Async(_) => unreachable!("call_sync invoked on an async provider: {}", self.name),
        }
    }

    /// Invoke an async provider. Panics if this provider is sync.
    pub async fn call_async(&self, args: &[AnyValue]) -> DiResult<(AnyValue, Option<Finalizer>)> {
        match &self.call {
            Call::Async(f) => f(args).await,
            Call::Sync(f) => f(args),
        }
    }
}
