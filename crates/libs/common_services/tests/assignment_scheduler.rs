use app_state::AssignmentSettings;
use async_trait::async_trait;
use chrono::Utc;
use color_eyre::eyre::eyre;
use common_services::assignment::memory::{MemoryCrewDirectory, MemoryJobStore};
use common_services::assignment::{
    AssignmentDispatcher, AssignmentError, AssignmentOutcome, AssignmentRequest,
    AssignmentScheduler, CrewDirectory, JobAssignmentStore, StorageError,
};
use common_services::database::crew::{Crew, CrewCandidate, CrewStatus};
use common_services::database::job::JobStatus;
use common_services::geo::GeoPoint;
use common_services::notify::{AssignmentNotice, Notifier, NotifyError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const BACKOFF: Duration = Duration::from_secs(30);

//================================================================================
// Fixtures
//================================================================================

fn crew(name: &str, latitude: f64, longitude: f64, status: CrewStatus) -> Crew {
    Crew {
        id: Uuid::new_v4(),
        full_name: name.to_owned(),
        email: format!("{}@crew.test", name.to_lowercase()),
        phone_number: Some("+44 20 7946 0000".to_owned()),
        status,
        is_approved: true,
        latitude: Some(latitude),
        longitude: Some(longitude),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn request_at(latitude: f64, longitude: f64) -> AssignmentRequest {
    AssignmentRequest {
        job_id: Uuid::new_v4(),
        location: GeoPoint {
            latitude,
            longitude,
        },
        property_address: "1 Whitehall, London".to_owned(),
        scheduled_date: "2025-06-01".to_owned(),
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<AssignmentNotice>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_assignment(&self, notice: &AssignmentNotice) -> Result<(), NotifyError> {
        self.notices.lock().await.push(notice.clone());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify_assignment(&self, _notice: &AssignmentNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected("mail server down".to_owned()))
    }
}

/// Serves candidates from a snapshot that may be outdated by the time claims run.
struct StaleDirectory {
    inner: Arc<MemoryCrewDirectory>,
    stale: Vec<CrewCandidate>,
}

#[async_trait]
impl CrewDirectory for StaleDirectory {
    async fn list_candidates(&self) -> Result<Vec<CrewCandidate>, StorageError> {
        let mut candidates = self.stale.clone();
        candidates.extend(self.inner.list_candidates().await?);
        Ok(candidates)
    }

    async fn try_claim(&self, crew_id: Uuid) -> Result<bool, StorageError> {
        self.inner.try_claim(crew_id).await
    }

    async fn release(&self, crew_id: Uuid) -> Result<bool, StorageError> {
        self.inner.release(crew_id).await
    }
}

struct Harness {
    directory: Arc<MemoryCrewDirectory>,
    jobs: Arc<MemoryJobStore>,
    notifier: Arc<RecordingNotifier>,
    scheduler: Arc<AssignmentScheduler>,
}

impl Harness {
    fn new(crew: Vec<Crew>, settings: AssignmentSettings) -> Self {
        let directory = Arc::new(MemoryCrewDirectory::new(crew));
        let jobs = Arc::new(MemoryJobStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(AssignmentScheduler::new(
            directory.clone(),
            jobs.clone(),
            notifier.clone(),
            settings,
        ));
        Self {
            directory,
            jobs,
            notifier,
            scheduler,
        }
    }

    async fn job_at(&self, latitude: f64, longitude: f64) -> AssignmentRequest {
        let request = request_at(latitude, longitude);
        self.jobs.insert_job(request.job_id).await;
        request
    }
}

fn settings(max_attempts: u32) -> AssignmentSettings {
    AssignmentSettings::new(max_attempts, BACKOFF)
}

//================================================================================
// Selection
//================================================================================

#[tokio::test(start_paused = true)]
async fn london_scenario_assigns_nearest_available_crew() -> color_eyre::Result<()> {
    let a = crew("A", 51.6, -0.1, CrewStatus::Available);
    let b = crew("B", 51.5, -0.2, CrewStatus::Available);
    let c = crew("C", 51.5, -0.1, CrewStatus::Assigned);
    let (a_id, b_id, c_id) = (a.id, b.id, c.id);

    let harness = Harness::new(vec![a, b, c], AssignmentSettings::default());
    let request = harness.job_at(51.5, -0.1).await;

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    let AssignmentOutcome::Assigned {
        crew_id,
        distance_km,
        rounds,
    } = outcome
    else {
        return Err(eyre!("expected an assignment, got {outcome:?}"));
    };
    assert_eq!(crew_id, b_id);
    assert_eq!(rounds, 1);
    assert!((6.9..7.0).contains(&distance_km), "{distance_km}");

    let job = harness.jobs.get(request.job_id).await.ok_or_else(|| eyre!("job missing"))?;
    assert_eq!(job.status, JobStatus::CrewDispatched);
    assert_eq!(job.assigned_crew_id, Some(b_id));

    assert_eq!(harness.directory.status(a_id).await, Some(CrewStatus::Available));
    assert_eq!(harness.directory.status(b_id).await, Some(CrewStatus::Assigned));
    assert_eq!(harness.directory.status(c_id).await, Some(CrewStatus::Assigned));

    let notices = harness.notifier.notices.lock().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].crew_id, b_id);
    assert_eq!(notices[0].job_id, request.job_id);
    assert_eq!(notices[0].crew_email, "b@crew.test");
    assert_eq!(notices[0].property_address, "1 Whitehall, London");
    assert_eq!(notices[0].scheduled_date, "2025-06-01");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn nearest_crew_is_claimed_first() -> color_eyre::Result<()> {
    // Roughly 5, 2 and 10 km north of the job.
    let five = crew("Five", 51.545, -0.1, CrewStatus::Available);
    let two = crew("Two", 51.518, -0.1, CrewStatus::Available);
    let ten = crew("Ten", 51.59, -0.1, CrewStatus::Available);
    let (five_id, two_id, ten_id) = (five.id, two.id, ten.id);

    let harness = Harness::new(vec![five, two, ten], settings(5));
    let request = harness.job_at(51.5, -0.1).await;

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    let AssignmentOutcome::Assigned {
        crew_id,
        distance_km,
        ..
    } = outcome
    else {
        return Err(eyre!("expected an assignment, got {outcome:?}"));
    };
    assert_eq!(crew_id, two_id);
    assert!((1.9..2.1).contains(&distance_km), "{distance_km}");
    assert_eq!(harness.directory.status(five_id).await, Some(CrewStatus::Available));
    assert_eq!(harness.directory.status(ten_id).await, Some(CrewStatus::Available));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn lost_claim_falls_through_to_next_candidate() -> color_eyre::Result<()> {
    let taken = crew("Taken", 51.5, -0.1, CrewStatus::Assigned);
    let free = crew("Free", 51.6, -0.1, CrewStatus::Available);
    let stale_snapshot = Crew {
        status: CrewStatus::Available,
        ..taken.clone()
    };
    let free_id = free.id;

    let inner = Arc::new(MemoryCrewDirectory::new(vec![taken, free]));
    let directory = Arc::new(StaleDirectory {
        inner: inner.clone(),
        stale: stale_snapshot.as_candidate().into_iter().collect(),
    });
    let jobs = Arc::new(MemoryJobStore::default());
    let scheduler = AssignmentScheduler::new(
        directory,
        jobs.clone(),
        Arc::new(RecordingNotifier::default()),
        settings(1),
    );
    let request = request_at(51.5, -0.1);
    jobs.insert_job(request.job_id).await;

    let outcome = scheduler.assign(&request, &CancellationToken::new()).await?;

    assert!(matches!(
        outcome,
        AssignmentOutcome::Assigned { crew_id, rounds: 1, .. } if crew_id == free_id
    ));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn distance_cutoff_excludes_far_crew() -> color_eyre::Result<()> {
    let far = crew("Far", 51.59, -0.1, CrewStatus::Available);
    let far_id = far.id;
    let harness = Harness::new(vec![far], settings(2).with_max_distance_km(Some(5.0)));
    let request = harness.job_at(51.5, -0.1).await;

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    assert_eq!(outcome, AssignmentOutcome::Exhausted { rounds: 2 });
    assert_eq!(harness.directory.status(far_id).await, Some(CrewStatus::Available));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unapproved_and_unlocated_crew_are_skipped() -> color_eyre::Result<()> {
    let mut unapproved = crew("Unapproved", 51.5, -0.1, CrewStatus::Available);
    unapproved.is_approved = false;
    let mut unlocated = crew("Unlocated", 51.5, -0.1, CrewStatus::Available);
    unlocated.latitude = None;
    let offline = crew("Offline", 51.5, -0.1, CrewStatus::Offline);

    let harness = Harness::new(vec![unapproved, unlocated, offline], settings(1));
    let request = harness.job_at(51.5, -0.1).await;

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    assert!(!outcome.is_assigned());
    assert_eq!(outcome, AssignmentOutcome::Exhausted { rounds: 1 });
    Ok(())
}

//================================================================================
// Concurrency
//================================================================================

#[tokio::test(start_paused = true)]
async fn concurrent_attempts_for_one_crew_have_one_winner() -> color_eyre::Result<()> {
    let only = crew("Only", 51.5, -0.1, CrewStatus::Available);
    let only_id = only.id;
    let harness = Harness::new(vec![only], settings(2));

    let mut attempts = JoinSet::new();
    for _ in 0..8 {
        let request = harness.job_at(51.51, -0.1).await;
        let scheduler = harness.scheduler.clone();
        attempts.spawn(async move { scheduler.assign(&request, &CancellationToken::new()).await });
    }

    let mut winners = 0;
    while let Some(result) = attempts.join_next().await {
        match result?? {
            AssignmentOutcome::Assigned { crew_id, .. } => {
                assert_eq!(crew_id, only_id);
                winners += 1;
            }
            outcome => assert_eq!(outcome, AssignmentOutcome::Exhausted { rounds: 2 }),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(harness.notifier.notices.lock().await.len(), 1);
    assert_eq!(harness.directory.status(only_id).await, Some(CrewStatus::Assigned));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn second_attempt_for_same_job_is_rejected() -> color_eyre::Result<()> {
    let harness = Harness::new(Vec::new(), settings(5));
    let request = harness.job_at(51.5, -0.1).await;
    let token = CancellationToken::new();

    let first = {
        let scheduler = harness.scheduler.clone();
        let request = request.clone();
        let token = token.clone();
        tokio::spawn(async move { scheduler.assign(&request, &token).await })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(harness.scheduler.is_in_flight(request.job_id));

    let second = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await;
    assert!(matches!(
        second,
        Err(AssignmentError::AlreadyInProgress(job_id)) if job_id == request.job_id
    ));

    token.cancel();
    assert_eq!(first.await??, AssignmentOutcome::Cancelled { rounds: 1 });
    assert!(!harness.scheduler.is_in_flight(request.job_id));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn stale_attempt_cannot_overwrite_assignment() -> color_eyre::Result<()> {
    let spare = crew("Spare", 51.5, -0.1, CrewStatus::Available);
    let spare_id = spare.id;
    let harness = Harness::new(vec![spare], settings(3));
    let request = harness.job_at(51.5, -0.1).await;

    let earlier_crew = Uuid::new_v4();
    assert!(harness.jobs.mark_dispatched(request.job_id, earlier_crew).await?);

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    assert_eq!(outcome, AssignmentOutcome::JobClosed { rounds: 1 });
    let job = harness.jobs.get(request.job_id).await.ok_or_else(|| eyre!("job missing"))?;
    assert_eq!(job.assigned_crew_id, Some(earlier_crew));
    assert_eq!(harness.directory.status(spare_id).await, Some(CrewStatus::Available));
    assert!(harness.notifier.notices.lock().await.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancelled_job_releases_claim() -> color_eyre::Result<()> {
    let spare = crew("Spare", 51.5, -0.1, CrewStatus::Available);
    let spare_id = spare.id;
    let harness = Harness::new(vec![spare], settings(3));
    let request = harness.job_at(51.5, -0.1).await;
    harness.jobs.set_status(request.job_id, JobStatus::Cancelled).await;

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    assert_eq!(outcome, AssignmentOutcome::JobClosed { rounds: 1 });
    assert_eq!(harness.directory.status(spare_id).await, Some(CrewStatus::Available));
    Ok(())
}

//================================================================================
// Retry budget
//================================================================================

#[tokio::test(start_paused = true)]
async fn empty_directory_exhausts_after_max_attempts() -> color_eyre::Result<()> {
    let harness = Harness::new(Vec::new(), settings(5));
    let request = harness.job_at(51.5, -0.1).await;
    let started = Instant::now();

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    assert_eq!(outcome, AssignmentOutcome::Exhausted { rounds: 5 });
    assert!(!outcome.is_assigned());
    assert_eq!(harness.directory.polls().await, 5);
    // Backoff only between rounds, not after the last one.
    let elapsed = started.elapsed();
    assert!(elapsed >= BACKOFF * 4, "{elapsed:?}");
    assert!(elapsed < BACKOFF * 4 + Duration::from_secs(1), "{elapsed:?}");

    let job = harness.jobs.get(request.job_id).await.ok_or_else(|| eyre!("job missing"))?;
    assert_eq!(job.status, JobStatus::JobCreated);
    assert_eq!(job.assigned_crew_id, None);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn crew_becoming_available_is_picked_up_on_retry() -> color_eyre::Result<()> {
    let harness = Harness::new(Vec::new(), settings(5));
    let request = harness.job_at(51.5, -0.1).await;

    let attempt = {
        let scheduler = harness.scheduler.clone();
        let request = request.clone();
        tokio::spawn(async move { scheduler.assign(&request, &CancellationToken::new()).await })
    };

    tokio::time::sleep(Duration::from_secs(45)).await;
    let late = crew("Late", 51.52, -0.1, CrewStatus::Available);
    let late_id = late.id;
    harness.directory.insert(late).await;

    let outcome = attempt.await??;
    assert!(matches!(
        outcome,
        AssignmentOutcome::Assigned { crew_id, rounds: 3, .. } if crew_id == late_id
    ));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn zero_budget_still_polls_once() -> color_eyre::Result<()> {
    let harness = Harness::new(Vec::new(), settings(0));
    let request = harness.job_at(51.5, -0.1).await;

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    assert_eq!(outcome, AssignmentOutcome::Exhausted { rounds: 1 });
    assert_eq!(harness.directory.polls().await, 1);
    Ok(())
}

//================================================================================
// Storage failures
//================================================================================

#[tokio::test(start_paused = true)]
async fn storage_failure_is_retried() -> color_eyre::Result<()> {
    let harness = Harness::new(vec![crew("A", 51.5, -0.1, CrewStatus::Available)], settings(5));
    harness.directory.fail_next_polls(2).await;
    let request = harness.job_at(51.5, -0.1).await;

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    assert!(matches!(outcome, AssignmentOutcome::Assigned { rounds: 3, .. }));
    assert_eq!(harness.directory.polls().await, 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn storage_failure_surfaces_after_exhaustion() -> color_eyre::Result<()> {
    let harness = Harness::new(vec![crew("A", 51.5, -0.1, CrewStatus::Available)], settings(3));
    harness.directory.fail_next_polls(10).await;
    let request = harness.job_at(51.5, -0.1).await;

    let result = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(AssignmentError::Storage { job_id, rounds: 3, source: StorageError::Unavailable(_) })
            if job_id == request.job_id
    ));
    assert_eq!(harness.directory.polls().await, 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn recovered_storage_then_empty_rounds_is_exhaustion() -> color_eyre::Result<()> {
    let harness = Harness::new(Vec::new(), settings(2));
    harness.directory.fail_next_polls(1).await;
    let request = harness.job_at(51.5, -0.1).await;

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    assert_eq!(outcome, AssignmentOutcome::Exhausted { rounds: 2 });
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_job_update_releases_claim_and_retries() -> color_eyre::Result<()> {
    let only = crew("Only", 51.5, -0.1, CrewStatus::Available);
    let only_id = only.id;
    let harness = Harness::new(vec![only], settings(3));
    harness.jobs.fail_next_updates(1).await;
    let request = harness.job_at(51.5, -0.1).await;

    let outcome = harness
        .scheduler
        .assign(&request, &CancellationToken::new())
        .await?;

    assert!(matches!(
        outcome,
        AssignmentOutcome::Assigned { crew_id, rounds: 2, .. } if crew_id == only_id
    ));
    assert_eq!(harness.directory.status(only_id).await, Some(CrewStatus::Assigned));
    assert_eq!(harness.notifier.notices.lock().await.len(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn notifier_failure_keeps_assignment() -> color_eyre::Result<()> {
    let only = crew("Only", 51.5, -0.1, CrewStatus::Available);
    let only_id = only.id;
    let directory = Arc::new(MemoryCrewDirectory::new(vec![only]));
    let jobs = Arc::new(MemoryJobStore::default());
    let scheduler = AssignmentScheduler::new(
        directory.clone(),
        jobs.clone(),
        Arc::new(FailingNotifier),
        settings(1),
    );
    let request = request_at(51.5, -0.1);
    jobs.insert_job(request.job_id).await;

    let outcome = scheduler.assign(&request, &CancellationToken::new()).await?;

    assert!(outcome.is_assigned());
    let job = jobs.get(request.job_id).await.ok_or_else(|| eyre!("job missing"))?;
    assert_eq!(job.status, JobStatus::CrewDispatched);
    assert_eq!(directory.status(only_id).await, Some(CrewStatus::Assigned));
    Ok(())
}

//================================================================================
// Cancellation
//================================================================================

#[tokio::test(start_paused = true)]
async fn cancellation_stops_during_backoff() -> color_eyre::Result<()> {
    let harness = Harness::new(Vec::new(), settings(5));
    let request = harness.job_at(51.5, -0.1).await;
    let token = CancellationToken::new();

    let attempt = {
        let scheduler = harness.scheduler.clone();
        let request = request.clone();
        let token = token.clone();
        tokio::spawn(async move { scheduler.assign(&request, &token).await })
    };

    tokio::time::sleep(Duration::from_secs(45)).await;
    token.cancel();

    assert_eq!(attempt.await??, AssignmentOutcome::Cancelled { rounds: 2 });
    assert_eq!(harness.directory.polls().await, 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancelled_token_skips_polling() -> color_eyre::Result<()> {
    let harness = Harness::new(vec![crew("A", 51.5, -0.1, CrewStatus::Available)], settings(5));
    let request = harness.job_at(51.5, -0.1).await;
    let token = CancellationToken::new();
    token.cancel();

    let outcome = harness.scheduler.assign(&request, &token).await?;

    assert_eq!(outcome, AssignmentOutcome::Cancelled { rounds: 0 });
    assert_eq!(harness.directory.polls().await, 0);
    Ok(())
}

//================================================================================
// Dispatcher
//================================================================================

#[tokio::test(start_paused = true)]
async fn dispatcher_runs_assignment_in_background() -> color_eyre::Result<()> {
    let only = crew("Only", 51.5, -0.1, CrewStatus::Available);
    let only_id = only.id;
    let harness = Harness::new(vec![only], settings(5));
    let dispatcher = AssignmentDispatcher::new(harness.scheduler.clone(), CancellationToken::new());
    let request = harness.job_at(51.5, -0.1).await;

    dispatcher
        .dispatch(request.clone())
        .ok_or_else(|| eyre!("attempt not started"))?
        .await?;

    let job = harness.jobs.get(request.job_id).await.ok_or_else(|| eyre!("job missing"))?;
    assert_eq!(job.assigned_crew_id, Some(only_id));
    assert!(!dispatcher.is_running(request.job_id));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dispatcher_cancels_single_job() -> color_eyre::Result<()> {
    let harness = Harness::new(Vec::new(), settings(5));
    let dispatcher = AssignmentDispatcher::new(harness.scheduler.clone(), CancellationToken::new());
    let request = harness.job_at(51.5, -0.1).await;

    let handle = dispatcher
        .dispatch(request.clone())
        .ok_or_else(|| eyre!("attempt not started"))?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(dispatcher.is_running(request.job_id));

    assert!(dispatcher.cancel(request.job_id));
    handle.await?;

    assert_eq!(harness.directory.polls().await, 1);
    assert!(!dispatcher.is_running(request.job_id));
    assert!(!dispatcher.cancel(request.job_id));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn repeated_dispatch_keeps_running_attempt_cancellable() -> color_eyre::Result<()> {
    let harness = Harness::new(Vec::new(), settings(5));
    let dispatcher = AssignmentDispatcher::new(harness.scheduler.clone(), CancellationToken::new());
    let request = harness.job_at(51.5, -0.1).await;

    let running = dispatcher
        .dispatch(request.clone())
        .ok_or_else(|| eyre!("attempt not started"))?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(dispatcher.dispatch(request.clone()).is_none());
    assert!(dispatcher.is_running(request.job_id));

    assert!(dispatcher.cancel(request.job_id));
    running.await?;

    assert_eq!(harness.directory.polls().await, 1);
    assert!(!harness.scheduler.is_in_flight(request.job_id));
    assert!(!dispatcher.is_running(request.job_id));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn job_can_be_dispatched_again_after_cancel() -> color_eyre::Result<()> {
    let harness = Harness::new(Vec::new(), settings(5));
    let dispatcher = AssignmentDispatcher::new(harness.scheduler.clone(), CancellationToken::new());
    let request = harness.job_at(51.5, -0.1).await;

    let first = dispatcher
        .dispatch(request.clone())
        .ok_or_else(|| eyre!("first attempt not started"))?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(dispatcher.cancel(request.job_id));
    first.await?;

    let found = crew("Late", 51.5, -0.1, CrewStatus::Available);
    let found_id = found.id;
    harness.directory.insert(found).await;
    dispatcher
        .dispatch(request.clone())
        .ok_or_else(|| eyre!("second attempt not started"))?
        .await?;

    let job = harness.jobs.get(request.job_id).await.ok_or_else(|| eyre!("job missing"))?;
    assert_eq!(job.assigned_crew_id, Some(found_id));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dispatcher_shutdown_cancels_all_attempts() -> color_eyre::Result<()> {
    let harness = Harness::new(Vec::new(), settings(5));
    let shutdown = CancellationToken::new();
    let dispatcher = AssignmentDispatcher::new(harness.scheduler.clone(), shutdown.clone());

    let first = dispatcher
        .dispatch(harness.job_at(51.5, -0.1).await)
        .ok_or_else(|| eyre!("first attempt not started"))?;
    let second = dispatcher
        .dispatch(harness.job_at(51.6, -0.1).await)
        .ok_or_else(|| eyre!("second attempt not started"))?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    dispatcher.shutdown();
    first.await?;
    second.await?;

    assert!(shutdown.is_cancelled());
    assert_eq!(harness.directory.polls().await, 2);
    Ok(())
}
