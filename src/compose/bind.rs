//! Binding a leading context argument.

use std::sync::Arc;

use crate::callable::{Callable, Deferred};

/// Invokes `callable` with `context` and `argument` right away.
///
/// Whatever the callable's shape, the outcome comes back deferred. Pass a
/// tuple as `argument` to supply several values.
///
/// # Examples
///
/// ```rust
/// use cofn::callable::Callable;
/// use cofn::compose::bind;
///
/// struct Account {
///     balance: i64,
/// }
///
/// # futures::executor::block_on(async {
/// let deposit: Callable<(&'static Account, i64), i64> =
///     Callable::plain(|account: &'static Account, amount: i64| account.balance + amount);
/// static ACCOUNT: Account = Account { balance: 100 };
///
/// assert_eq!(bind(&deposit, &ACCOUNT, 20).await.unwrap(), 120);
/// # });
/// ```
pub fn bind<C, A, T>(callable: &Callable<(C, A), T>, context: C, argument: A) -> Deferred<T>
where
    C: 'static,
    A: 'static,
    T: Send + 'static,
{
    callable.call((context, argument))
}

/// Returns a callable with `context` bound as its first argument.
///
/// Nothing runs until the returned callable is invoked; every invocation
/// receives its own clone of `context`. A suspending callable is still driven
/// step by step once invoked.
///
/// # Examples
///
/// ```rust
/// use cofn::callable::Callable;
/// use cofn::compose::lazy_bind;
///
/// # futures::executor::block_on(async {
/// let greet: Callable<(String, String), String> =
///     Callable::deferred(|greeting: String, name: String| async move { format!("{greeting}, {name}") });
///
/// let hello = lazy_bind(greet, "hello".to_string());
/// assert_eq!(hello.call(("world".to_string(),)).await.unwrap(), "hello, world");
/// # });
/// ```
pub fn lazy_bind<C, A, T>(callable: Callable<(C, A), T>, context: C) -> Callable<(A,), T>
where
    C: Clone + Send + Sync + 'static,
    A: 'static,
    T: Send + 'static,
{
    Callable::from_ordinary(Arc::new(move |(argument,): (A,)| {
        callable.invoke((context.clone(), argument))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Step;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Scope {
        prop: i32,
    }

    fn describe_suspending() -> Callable<(Scope, (String, String)), String> {
        Callable::suspending(|scope: Scope, (first, second): (String, String)| {
            Step::suspend(async move { scope.prop }, move |prop| {
                Step::done(format!("{first}{second}{prop}"))
            })
        })
    }

    #[tokio::test]
    async fn test_bind_passes_context_and_arguments() {
        let result = bind(
            &describe_suspending(),
            Scope { prop: 1234 },
            ("A".to_string(), "B".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(result, "AB1234");
    }

    #[tokio::test]
    async fn test_bind_plain_callable_is_deferred() {
        let read: Callable<(Scope, ()), i32> = Callable::plain(|scope: Scope, (): ()| scope.prop);
        assert_eq!(bind(&read, Scope { prop: 7 }, ()).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_lazy_bind_waits_for_invocation() {
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = Arc::clone(&calls);
        let read: Callable<(Scope, i32), i32> = Callable::plain(move |scope: Scope, offset: i32| {
            *calls_clone.lock().unwrap() += 1;
            scope.prop + offset
        });

        let bound = lazy_bind(read, Scope { prop: 10 });
        assert_eq!(*calls.lock().unwrap(), 0);

        assert_eq!(bound.call((1,)).await.unwrap(), 11);
        assert_eq!(bound.call((2,)).await.unwrap(), 12);
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_lazy_bind_keeps_suspending_shape() {
        let bound = lazy_bind(describe_suspending(), Scope { prop: 1 });
        let result = bound
            .call((("x".to_string(), "y".to_string()),))
            .await
            .unwrap();
        assert_eq!(result, "xy1");
    }
}
