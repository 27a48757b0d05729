//! Integration tests for the iteration engine.
//!
//! Every combinator is exercised with each callable shape (plain, deferred,
//! suspending) in both dispatch modes.

use cofn::callable::{Callable, Step};
use cofn::collection::{Collection, Key, Mapping};
use cofn::engine::{Filter, ForEach, Map, Mode, Reduce};
use cofn::{Error, filter, filter_serial, for_each, for_each_serial, map, map_serial, reduce};
use rstest::rstest;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn delayed(value: i32) -> Duration {
    Duration::from_millis(u64::try_from(10 - value).unwrap_or_default() * 5)
}

// =============================================================================
// Callable fixtures
// =============================================================================

fn is_even_plain() -> Callable<(i32, Key), bool> {
    Callable::plain(|value: i32, _key: Key| value % 2 == 0)
}

fn is_even_deferred() -> Callable<(i32, Key), bool> {
    Callable::deferred(|value: i32, _key: Key| async move {
        tokio::time::sleep(delayed(value)).await;
        value % 2 == 0
    })
}

fn is_even_suspending() -> Callable<(i32, Key), bool> {
    Callable::suspending(|value: i32, _key: Key| {
        Step::suspend(tokio::time::sleep(delayed(value)), move |()| {
            Step::done(value % 2 == 0)
        })
    })
}

fn add_plain() -> Callable<(i32, i32, usize), i32> {
    Callable::plain(|total: i32, value: i32, _index: usize| total + value)
}

fn add_deferred() -> Callable<(i32, i32, usize), i32> {
    Callable::deferred(|total: i32, value: i32, _index: usize| async move {
        tokio::time::sleep(Duration::from_millis(1)).await;
        total + value
    })
}

fn add_suspending() -> Callable<(i32, i32, usize), i32> {
    Callable::suspending(|total: i32, value: i32, _index: usize| {
        Step::suspend(async move { value }, move |value| {
            Step::suspend(async move { total }, move |total| Step::done(total + value))
        })
    })
}

fn describe_suspending() -> Callable<(i32, Key), String> {
    Callable::suspending(|value: i32, key: Key| {
        Step::suspend(async move { value }, move |value| Step::done(format!("{value}{key}")))
    })
}

fn letters() -> Mapping<i32> {
    [("a", 1), ("b", 2), ("c", 3), ("d", 4)].into_iter().collect()
}

// =============================================================================
// map
// =============================================================================

#[rstest]
#[case::parallel(Mode::Parallel)]
#[case::serial(Mode::Serial)]
#[tokio::test]
async fn test_map_mapping_example(#[case] mode: Mode) {
    init_tracing();
    let describe = match mode {
        Mode::Parallel => Map::new(describe_suspending()),
        Mode::Serial => Map::serial(describe_suspending()),
    };

    let result = describe.apply(&letters()).await.unwrap();

    let expected: Mapping<String> = [("a", "1a"), ("b", "2b"), ("c", "3c"), ("d", "4d")]
        .into_iter()
        .map(|(key, value)| (key, value.to_string()))
        .collect();
    assert_eq!(result, Collection::Mapping(expected));
}

#[tokio::test]
async fn test_map_accepts_std_collections() {
    let double: Callable<(i32, Key), i32> = Callable::plain(|value: i32, _key: Key| value * 2);

    let deque: VecDeque<i32> = [1, 2, 3].into_iter().collect();
    assert_eq!(
        map(double.clone(), &deque).await.unwrap(),
        Collection::Sequence(vec![2, 4, 6])
    );

    let tree: BTreeMap<String, i32> = [("b".to_string(), 2), ("a".to_string(), 1)]
        .into_iter()
        .collect();
    let mapped = map_serial(double, &tree).await.unwrap().into_mapping().unwrap();
    assert_eq!(mapped.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(mapped["b"], 4);
}

#[tokio::test(start_paused = true)]
async fn test_map_parallel_overlaps_and_keeps_order() {
    let started = Arc::new(Mutex::new(Vec::new()));
    let started_clone = Arc::clone(&started);
    let slow: Callable<(i32, Key), i32> = Callable::deferred(move |value: i32, _key: Key| {
        started_clone.lock().unwrap().push(value);
        async move {
            tokio::time::sleep(delayed(value)).await;
            value * 10
        }
    });

    let before = tokio::time::Instant::now();
    let result = map(slow, &vec![1, 2, 3]).await.unwrap();

    assert_eq!(result, Collection::Sequence(vec![10, 20, 30]));
    assert_eq!(*started.lock().unwrap(), vec![1, 2, 3]);
    // the longest delay alone, not the sum of all three
    assert!(before.elapsed() < Duration::from_millis(60));
}

#[tokio::test(start_paused = true)]
async fn test_map_serial_waits_for_each_call() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = Arc::clone(&log);
    let slow: Callable<(i32, Key), i32> = Callable::deferred(move |value: i32, _key: Key| {
        log_clone.lock().unwrap().push(format!("start {value}"));
        let log = Arc::clone(&log_clone);
        async move {
            tokio::time::sleep(delayed(value)).await;
            log.lock().unwrap().push(format!("end {value}"));
            value
        }
    });

    map_serial(slow, &vec![1, 2]).await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["start 1", "end 1", "start 2", "end 2"]
    );
}

#[tokio::test]
async fn test_map_does_not_touch_input() {
    let input = vec![String::from("a"), String::from("b")];
    let shout: Callable<(String, Key), String> =
        Callable::plain(|mut value: String, _key: Key| {
            value.push('!');
            value
        });

    let result = map(shout, &input).await.unwrap();

    assert_eq!(input, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(
        result,
        Collection::Sequence(vec!["a!".to_string(), "b!".to_string()])
    );
}

// =============================================================================
// filter
// =============================================================================

#[rstest]
#[case::plain_parallel(is_even_plain(), Mode::Parallel)]
#[case::plain_serial(is_even_plain(), Mode::Serial)]
#[case::deferred_parallel(is_even_deferred(), Mode::Parallel)]
#[case::deferred_serial(is_even_deferred(), Mode::Serial)]
#[case::suspending_parallel(is_even_suspending(), Mode::Parallel)]
#[case::suspending_serial(is_even_suspending(), Mode::Serial)]
#[tokio::test(start_paused = true)]
async fn test_filter_even(#[case] predicate: Callable<(i32, Key), bool>, #[case] mode: Mode) {
    init_tracing();
    let numbers = vec![1, 2, 3, 4, 5, 6, 7, 8];
    let kept = match mode {
        Mode::Parallel => filter(predicate, &numbers).await,
        Mode::Serial => filter_serial(predicate, &numbers).await,
    };
    assert_eq!(kept.unwrap(), vec![2, 4, 6, 8]);
}

#[rstest]
#[case::parallel(Filter::new(is_even_plain()))]
#[case::serial(Filter::serial(is_even_plain()))]
#[tokio::test]
async fn test_filter_rejects_mapping(#[case] even: Filter<i32>) {
    let error = even.apply(&letters()).await.unwrap_err();
    assert!(matches!(error, Error::TypeMismatch(_)));
    assert!(error.to_string().contains("you can only filter sequences, given: mapping"));
}

// =============================================================================
// for_each
// =============================================================================

#[rstest]
#[case::parallel(Mode::Parallel)]
#[case::serial(Mode::Serial)]
#[tokio::test]
async fn test_for_each_visits_everything(#[case] mode: Mode) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    let record: Callable<(i32, Key), ()> = Callable::deferred(move |value: i32, key: Key| {
        let seen = Arc::clone(&seen_clone);
        async move { seen.lock().unwrap().push(format!("{key}:{value}")) }
    });

    let visit = match mode {
        Mode::Parallel => ForEach::new(record),
        Mode::Serial => ForEach::serial(record),
    };
    visit.apply(&letters()).await.unwrap();

    let mut seen = seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec!["a:1", "b:2", "c:3", "d:4"]);
}

#[tokio::test(start_paused = true)]
async fn test_for_each_serial_order_log() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = Arc::clone(&log);
    let record: Callable<(i32, Key), ()> = Callable::suspending(move |value: i32, key: Key| {
        let log = Arc::clone(&log_clone);
        Step::suspend(tokio::time::sleep(delayed(value)), move |()| {
            log.lock().unwrap().push(key.as_index().unwrap_or_default());
            Step::done(())
        })
    });

    for_each_serial(record, &vec![1, 2, 3, 4, 5]).await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

// =============================================================================
// reduce
// =============================================================================

#[rstest]
#[case::plain(add_plain())]
#[case::deferred(add_deferred())]
#[case::suspending(add_suspending())]
#[tokio::test(start_paused = true)]
async fn test_reduce_sum(#[case] add: Callable<(i32, i32, usize), i32>) {
    let numbers = [1, 2, 3, 4, 5, 6];
    assert_eq!(reduce(add.clone(), 10, &numbers).await.unwrap(), 31);
    assert_eq!(Reduce::new(add).starting_with(10).apply(&numbers).await.unwrap(), 31);
}

#[tokio::test]
async fn test_reduce_empty_returns_initial() {
    assert_eq!(reduce(add_plain(), 10, &Vec::new()).await.unwrap(), 10);
}

#[tokio::test]
async fn test_reduce_rejects_mapping() {
    let error = reduce(add_plain(), 0, &letters()).await.unwrap_err();
    assert!(matches!(error, Error::TypeMismatch(_)));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_parallel_failure_is_atomic() {
    let checked: Callable<(i32, Key), i32> =
        Callable::try_deferred(|value: i32, _key: Key| async move {
            tokio::time::sleep(delayed(value)).await;
            if value == 3 {
                Err(format!("rejected {value}"))
            } else {
                Ok(value)
            }
        });

    let error = map(checked, &vec![1, 2, 3, 4]).await.unwrap_err();

    let failure = error.as_callable().unwrap();
    assert_eq!(failure.to_string(), "rejected 3");
}

#[tokio::test]
async fn test_ready_failure_stops_dispatch() {
    let issued = Arc::new(Mutex::new(Vec::new()));
    let issued_clone = Arc::clone(&issued);
    let checked: Callable<(i32, Key), ()> = Callable::try_plain(move |value: i32, _key: Key| {
        issued_clone.lock().unwrap().push(value);
        if value == 2 { Err("two is not allowed") } else { Ok(()) }
    });

    let error = for_each(checked, &vec![1, 2, 3]).await.unwrap_err();

    assert_eq!(error.to_string(), "callable failed: two is not allowed");
    assert_eq!(*issued.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn test_suspending_failure_surfaces() {
    let failing: Callable<(i32, Key), i32> = Callable::suspending(|value: i32, _key: Key| {
        Step::try_suspend(async move { Err::<i32, _>(format!("lookup {value} failed")) }, Step::done)
    });

    let error = map_serial(failing, &vec![7]).await.unwrap_err();

    assert_eq!(error.as_callable().unwrap().to_string(), "lookup 7 failed");
}

#[tokio::test]
async fn test_futures_are_lazy() {
    let called = Arc::new(Mutex::new(false));
    let called_clone = Arc::clone(&called);
    let touch: Callable<(i32, Key), ()> = Callable::plain(move |_value: i32, _key: Key| {
        *called_clone.lock().unwrap() = true;
    });

    let pending = for_each(touch, &vec![1]);
    assert!(!*called.lock().unwrap());

    pending.await.unwrap();
    assert!(*called.lock().unwrap());
}
