mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use common::{delayed_failure, delayed_push, record_states};
use makub_core::fetch::{
    AggregateCoordinator, CoordinatorError, CoordinatorOptions, ErrorPolicy, FetchTask,
};
use makub_core::service::{ErrorKind, ServiceError, TASK_PANICKED_CODE, TIMED_OUT_CODE};
use makub_core::state::{LifecycleState, StateController};
use rand::Rng;

fn coordinator_with(options: CoordinatorOptions) -> (AggregateCoordinator, Arc<StateController>) {
    let controller = Arc::new(StateController::new());
    (
        AggregateCoordinator::new(Arc::clone(&controller), options),
        controller,
    )
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

async fn explode() -> Result<u32, ServiceError> {
    panic!("service exploded")
}

#[tokio::test(start_paused = true)]
async fn test_all_tasks_succeed() {
    let (coordinator, controller) = coordinator_with(CoordinatorOptions::default());
    let states = record_states(&controller);

    let report = coordinator
        .run(
            Vec::new(),
            vec![
                delayed_push("slow", ms(30), 1),
                delayed_push("fast", ms(10), 2),
                delayed_push("medium", ms(20), 3),
            ],
        )
        .await
        .unwrap();

    assert!(report.is_ready());
    assert!(report.failures.is_empty());
    assert_eq!(report.error_kind(), None);
    assert!(!report.timed_out);
    assert_eq!(report.snapshot, vec![2, 3, 1]);
    assert_eq!(
        *states.lock(),
        vec![LifecycleState::Loading, LifecycleState::Ready]
    );
}

#[tokio::test(start_paused = true)]
async fn test_single_failure_keeps_other_merges() {
    let (coordinator, controller) = coordinator_with(CoordinatorOptions::default());
    let states = record_states(&controller);

    let report = coordinator
        .run(
            Vec::new(),
            vec![
                delayed_push("user_info", ms(10), 1),
                delayed_failure("news", ms(5), -1009),
                delayed_push("extra", ms(20), 2),
            ],
        )
        .await
        .unwrap();

    assert_eq!(report.state, LifecycleState::Error { code: -1009 });
    assert_eq!(report.snapshot, vec![1, 2]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].task, "news");
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.error_kind(), Some(ErrorKind::Transport));
    assert_eq!(
        *states.lock(),
        vec![LifecycleState::Loading, LifecycleState::Error { code: -1009 }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_last_observed_failure_wins() {
    let (coordinator, controller) = coordinator_with(CoordinatorOptions::default());
    let states = record_states(&controller);

    let report = coordinator
        .run(
            Vec::new(),
            vec![
                delayed_failure("first", ms(10), 500),
                delayed_failure("second", ms(30), 404),
            ],
        )
        .await
        .unwrap();

    assert_eq!(report.state, LifecycleState::Error { code: 404 });
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.error_kind(), Some(ErrorKind::Aggregate));
    // One Loading and one terminal state, never one per failure.
    assert_eq!(states.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_error_policies_pick_different_failures() {
    let tasks = || {
        vec![
            delayed_failure("declared_first", ms(30), 500),
            delayed_failure("declared_second", ms(10), 404),
        ]
    };

    let expectations = [
        (ErrorPolicy::LastObserved, 500),
        (ErrorPolicy::FirstObserved, 404),
        (ErrorPolicy::DeclarationOrder, 500),
    ];

    for (policy, expected) in expectations {
        let (coordinator, _) = coordinator_with(CoordinatorOptions {
            error_policy: policy,
            cycle_timeout: None,
        });
        let report = coordinator.run(Vec::new(), tasks()).await.unwrap();
        assert_eq!(
            report.state,
            LifecycleState::Error { code: expected },
            "policy {:?}",
            policy
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_zero_task_cycle_is_ready() {
    let (coordinator, controller) = coordinator_with(CoordinatorOptions::default());
    let states = record_states(&controller);

    let report = coordinator.run(vec![9u32], Vec::new()).await.unwrap();

    assert_eq!(report.snapshot, vec![9]);
    assert_eq!(
        *states.lock(),
        vec![LifecycleState::Loading, LifecycleState::Ready]
    );
}

#[tokio::test(start_paused = true)]
async fn test_timeout_marks_outstanding_tasks() {
    let (coordinator, controller) = coordinator_with(CoordinatorOptions {
        error_policy: ErrorPolicy::LastObserved,
        cycle_timeout: Some(ms(50)),
    });
    let states = record_states(&controller);

    let report = coordinator
        .run(
            Vec::new(),
            vec![
                delayed_push("quick", ms(10), 1),
                delayed_push("stuck", ms(500), 2),
            ],
        )
        .await
        .unwrap();

    assert!(report.timed_out);
    assert_eq!(report.state, LifecycleState::Error { code: TIMED_OUT_CODE });
    assert_eq!(report.snapshot, vec![1]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].task, "stuck");

    // The late completion must not produce another state.
    tokio::time::sleep(ms(600)).await;
    assert_eq!(states.lock().len(), 2);
    assert!(!coordinator.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_panicking_task_is_contained() {
    let (coordinator, controller) = coordinator_with(CoordinatorOptions::default());
    let states = record_states(&controller);

    let tasks = vec![
        delayed_push("fine", ms(10), 1),
        FetchTask::new("boom", explode(), |snapshot: &mut Vec<u32>, value| {
            snapshot.push(value)
        }),
    ];
    let report = coordinator.run(Vec::new(), tasks).await.unwrap();

    assert_eq!(
        report.state,
        LifecycleState::Error {
            code: TASK_PANICKED_CODE
        }
    );
    assert_eq!(report.snapshot, vec![1]);
    assert_eq!(report.failures[0].task, "boom");
    assert_eq!(states.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_panicking_merge_still_completes_cycle() {
    let (coordinator, controller) = coordinator_with(CoordinatorOptions::default());
    let states = record_states(&controller);

    let tasks = vec![
        delayed_push("fine", ms(10), 1),
        FetchTask::new(
            "bad_merge",
            async { Ok(2u32) },
            |_: &mut Vec<u32>, value: u32| panic!("cannot map {}", value),
        ),
    ];
    let report = tokio::time::timeout(ms(2_000), coordinator.run(Vec::new(), tasks))
        .await
        .expect("cycle finished")
        .unwrap();

    assert_eq!(
        report.state,
        LifecycleState::Error {
            code: TASK_PANICKED_CODE
        }
    );
    assert_eq!(report.snapshot, vec![1]);
    assert_eq!(report.failures[0].task, "bad_merge");
    assert_eq!(
        *states.lock(),
        vec![
            LifecycleState::Loading,
            LifecycleState::Error {
                code: TASK_PANICKED_CODE
            }
        ]
    );
    assert!(!coordinator.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_cycle_is_rejected() {
    let controller = Arc::new(StateController::new());
    let coordinator = Arc::new(AggregateCoordinator::new(
        Arc::clone(&controller),
        CoordinatorOptions::default(),
    ));
    let states = record_states(&controller);

    let running = Arc::clone(&coordinator);
    let first = tokio::spawn(async move {
        running
            .run(Vec::new(), vec![delayed_push("slow", ms(100), 1)])
            .await
    });

    tokio::time::sleep(ms(1)).await;
    assert!(coordinator.is_running());

    let rejected = coordinator.run(Vec::<u32>::new(), Vec::new()).await;
    assert_eq!(rejected.err(), Some(CoordinatorError::CycleInProgress));
    assert_eq!(*states.lock(), vec![LifecycleState::Loading]);

    let report = first.await.unwrap().unwrap();
    assert!(report.is_ready());
    assert!(!coordinator.is_running());

    // The coordinator accepts a new cycle once the first has finished.
    assert!(coordinator.run(Vec::<u32>::new(), Vec::new()).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_silent_cycle_delivers_only_terminal_state() {
    let (coordinator, controller) = coordinator_with(CoordinatorOptions::default());
    let states = record_states(&controller);

    coordinator
        .run_silent(Vec::new(), vec![delayed_push("page", ms(5), 1)])
        .await
        .unwrap();

    assert_eq!(*states.lock(), vec![LifecycleState::Ready]);
}

#[tokio::test(start_paused = true)]
async fn test_latest_observer_receives_cycle() {
    let (coordinator, controller) = coordinator_with(CoordinatorOptions::default());
    let replaced = record_states(&controller);
    let current = record_states(&controller);

    coordinator.run((), Vec::new()).await.unwrap();

    assert!(replaced.lock().is_empty());
    assert_eq!(current.lock().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_random_completion_order() {
    for round in 0..25 {
        let plan: Vec<(u64, Option<i32>)> = {
            let mut rng = rand::thread_rng();
            let count = rng.gen_range(1..=8);
            (0..count)
                .map(|_| {
                    let delay = rng.gen_range(0..5);
                    let failure = rng.gen_bool(0.3).then(|| rng.gen_range(400..600));
                    (delay, failure)
                })
                .collect()
        };

        let (coordinator, controller) = coordinator_with(CoordinatorOptions::default());
        let states = record_states(&controller);

        let tasks: Vec<_> = plan
            .iter()
            .enumerate()
            .map(|(index, (delay, failure))| match failure {
                Some(code) => delayed_failure("failing", ms(*delay), *code),
                None => delayed_push("succeeding", ms(*delay), index as u32),
            })
            .collect();

        let report = coordinator.run(Vec::new(), tasks).await.unwrap();

        let expected_successes: BTreeSet<u32> = plan
            .iter()
            .enumerate()
            .filter(|(_, (_, failure))| failure.is_none())
            .map(|(index, _)| index as u32)
            .collect();
        let merged: BTreeSet<u32> = report.snapshot.iter().copied().collect();
        assert_eq!(merged, expected_successes, "round {}", round);
        assert_eq!(report.snapshot.len(), expected_successes.len());

        let expected_failures = plan.iter().filter(|(_, f)| f.is_some()).count();
        assert_eq!(report.failures.len(), expected_failures, "round {}", round);

        let terminal = match report.failures.iter().max_by_key(|f| f.sequence) {
            Some(last) => LifecycleState::Error { code: last.code },
            None => LifecycleState::Ready,
        };
        assert_eq!(report.state, terminal, "round {}", round);
        assert_eq!(*states.lock(), vec![LifecycleState::Loading, terminal]);
    }
}
