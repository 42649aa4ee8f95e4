// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

use super::*;
use cidx_core::{JobStatus, OperationKind, QueueKey};
use tempfile::TempDir;
use tokio::time::{sleep, Duration};

fn executor() -> (TempDir, Arc<Layout>, Scheduler, JobExecutor) {
    let dir = TempDir::new().unwrap();
    let layout = Arc::new(Layout::new(dir.path()));
    layout.ensure_dirs().unwrap();
    let scheduler = Scheduler::open(&layout.store_dir()).unwrap();
    let sentinel = SentinelMonitor::new(layout.clone());
    let executor = JobExecutor::new(layout.clone(), scheduler.clone(), sentinel);
    (dir, layout, scheduler, executor)
}

async fn wait_for_terminal(scheduler: &Scheduler, job_id: JobId) -> Job {
    for _ in 0..200 {
        if let Some(job) = scheduler.get_job(job_id) {
            if job.is_terminal() {
                return job;
            }
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("job never reached a terminal state");
}

#[tokio::test]
async fn a_successful_command_completes_the_job_and_writes_output() {
    let (_dir, layout, scheduler, executor) = executor();
    let key = QueueKey::single("alpha");
    let submission = scheduler
        .submit("alice", key, OperationKind::Index, vec!["sh".into(), "-c".into(), "echo hello-from-adaptor".into()], vec![])
        .unwrap();
    let job = scheduler.dispatch("alpha", 1).unwrap().expect("job should start");
    assert_eq!(job.id, submission.job.id);

    executor.run(job.clone()).await;

    let finished = scheduler.get_job(job.id).unwrap();
    assert_eq!(finished.status, JobStatus::Completed);
    assert!(!scheduler.is_locked("alpha"));

    let output = std::fs::read_to_string(layout.output_path(job.id, job.id.as_str())).unwrap();
    assert!(output.contains("hello-from-adaptor"));
    assert!(!layout.sentinel_path(job.id).exists());
}

#[tokio::test]
async fn a_failing_command_marks_the_job_failed_with_an_error() {
    let (_dir, _layout, scheduler, executor) = executor();
    let key = QueueKey::single("alpha");
    scheduler.submit("alice", key, OperationKind::Index, vec!["sh".into(), "-c".into(), "exit 7".into()], vec![]).unwrap();
    let job = scheduler.dispatch("alpha", 1).unwrap().unwrap();

    executor.run(job.clone()).await;

    let finished = scheduler.get_job(job.id).unwrap();
    assert_eq!(finished.status, JobStatus::Failed);
    assert!(finished.error.as_deref().unwrap_or_default().contains('7'));
}

#[tokio::test]
async fn completing_a_job_redispatches_the_next_waiter() {
    let (_dir, _layout, scheduler, executor) = executor();
    let key = QueueKey::single("alpha");
    scheduler.submit("alice", key.clone(), OperationKind::Index, vec!["sh".into(), "-c".into(), "true".into()], vec![]).unwrap();
    let second = scheduler.submit("bob", key, OperationKind::Query, vec!["sh".into(), "-c".into(), "true".into()], vec![]).unwrap();

    let first = scheduler.dispatch("alpha", 1).unwrap().unwrap();
    executor.run(first).await;

    let second_job = wait_for_terminal(&scheduler, second.job.id).await;
    assert_eq!(second_job.status, JobStatus::Completed);
}

#[tokio::test]
async fn a_job_with_no_command_fails_without_spawning_anything() {
    let (_dir, _layout, scheduler, executor) = executor();
    let key = QueueKey::single("alpha");
    scheduler.submit("alice", key, OperationKind::Index, vec![], vec![]).unwrap();
    let job = scheduler.dispatch("alpha", 1).unwrap().unwrap();

    executor.run(job.clone()).await;

    let finished = scheduler.get_job(job.id).unwrap();
    assert_eq!(finished.status, JobStatus::Failed);
}
