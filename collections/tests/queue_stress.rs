//! Multi-threaded stress tests for the blocking queue.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use giztoy_collections::{PopTimeoutError, Queue};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_single_producer_fifo_with_growth() {
    init_tracing();
    let queue = Queue::new(2);
    let producer_queue = queue.clone();

    let producer = thread::spawn(move || {
        for i in 0..10_000 {
            producer_queue.put(i).unwrap();
        }
        producer_queue.close();
    });

    let collected: Vec<i32> = queue.iter().collect();
    producer.join().unwrap();

    assert_eq!(collected, (0..10_000).collect::<Vec<_>>());
    assert!(queue.capacity() >= 2);
    assert_eq!(queue.len(), 0);
}

#[test]
fn test_many_producers_many_consumers_no_loss_no_duplication() {
    init_tracing();
    const PRODUCERS: usize = 8;
    const CONSUMERS: usize = 6;
    const PER_PRODUCER: usize = 5_000;

    let queue = Queue::new(4);

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let q = queue.clone();
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    q.put((p, i)).unwrap();
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let q = queue.clone();
            thread::spawn(move || {
                let mut got = Vec::new();
                while let Some(item) = q.pop() {
                    got.push(item);
                }
                got
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    assert!(queue.close());

    let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
    for consumer in consumers {
        let got = consumer.join().unwrap();

        // Each consumer sees every producer's items in put order.
        let mut last = vec![None; PRODUCERS];
        for &(p, i) in &got {
            if let Some(prev) = last[p] {
                assert!(i > prev, "producer {} reordered: {} after {}", p, i, prev);
            }
            last[p] = Some(i);
        }

        for item in got {
            *counts.entry(item).or_default() += 1;
        }
    }

    assert_eq!(counts.len(), PRODUCERS * PER_PRODUCER);
    assert!(counts.values().all(|&n| n == 1));
    assert_eq!(queue.pop(), None);
}

#[test]
fn test_close_races_with_put() {
    init_tracing();
    for _ in 0..50 {
        let queue = Queue::new(2);
        let accepted = Arc::new(AtomicUsize::new(0));

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let q = queue.clone();
                let accepted = Arc::clone(&accepted);
                thread::spawn(move || {
                    for i in 0..500 {
                        match q.put(p * 1_000 + i) {
                            Ok(()) => {
                                accepted.fetch_add(1, Ordering::SeqCst);
                            }
                            Err(err) => {
                                assert!(err.is_closed());
                                // Closing is final.
                                assert!(q.put(0).is_err());
                                return;
                            }
                        }
                    }
                })
            })
            .collect();

        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let q = queue.clone();
                thread::spawn(move || q.iter().count())
            })
            .collect();

        thread::yield_now();
        assert!(queue.close());
        assert!(!queue.close());

        for producer in producers {
            producer.join().unwrap();
        }
        let popped: usize = consumers.into_iter().map(|c| c.join().unwrap()).sum();

        assert_eq!(popped, accepted.load(Ordering::SeqCst));
        assert_eq!(queue.len(), 0);
    }
}

#[test]
fn test_close_wakes_every_blocked_consumer() {
    init_tracing();
    let queue = Queue::<u64>::new(8);
    let consumers: Vec<_> = (0..16)
        .map(|_| {
            let q = queue.clone();
            thread::spawn(move || q.pop())
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    assert!(queue.close());

    for consumer in consumers {
        assert_eq!(consumer.join().unwrap(), None);
    }
}

#[test]
fn test_each_put_wakes_a_blocked_consumer() {
    init_tracing();
    const CONSUMERS: usize = 8;

    let queue = Queue::new(2);
    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let q = queue.clone();
            thread::spawn(move || q.pop())
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    for i in 0..CONSUMERS {
        queue.put(i).unwrap();
    }

    let mut got: Vec<_> = consumers
        .into_iter()
        .map(|c| c.join().unwrap().unwrap())
        .collect();
    got.sort();
    assert_eq!(got, (0..CONSUMERS).collect::<Vec<_>>());
    assert!(queue.is_empty());
    assert!(!queue.is_closed());
}

#[test]
fn test_drain_then_exhaust_after_close() {
    init_tracing();
    let queue = Queue::new(3);
    queue.put_all(["a", "b", "c", "d"]).unwrap();
    assert!(queue.close());

    assert_eq!(queue.len(), 4);
    assert_eq!(queue.pop(), Some("a"));
    assert_eq!(queue.len(), 3);
    assert_eq!(queue.pop(), Some("b"));
    assert_eq!(queue.pop(), Some("c"));
    assert_eq!(queue.pop(), Some("d"));
    for _ in 0..3 {
        assert_eq!(queue.pop(), None);
        assert_eq!(
            queue.pop_timeout(Duration::from_secs(1)),
            Err(PopTimeoutError::Closed)
        );
    }
    assert_eq!(queue.len(), 0);
}

#[test]
fn test_pop_timeout_under_contention() {
    init_tracing();
    let queue = Queue::new(2);
    let received = Arc::new(AtomicUsize::new(0));

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let q = queue.clone();
            let received = Arc::clone(&received);
            thread::spawn(move || loop {
                match q.pop_timeout(Duration::from_millis(1)) {
                    Ok(_) => {
                        received.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(PopTimeoutError::Timeout) => continue,
                    Err(PopTimeoutError::Closed) => return,
                }
            })
        })
        .collect();

    for i in 0..2_000 {
        queue.put(i).unwrap();
        if i % 100 == 0 {
            thread::sleep(Duration::from_millis(2));
        }
    }
    queue.close();

    for consumer in consumers {
        consumer.join().unwrap();
    }
    assert_eq!(received.load(Ordering::SeqCst), 2_000);
}
