//! End-to-end handling of simulator jobs.

use std::time::Duration;

use ftdemo_adapter_sim::{SimulatorBackend, SimulatorConfig};
use ftdemo_catalog::{CircuitBatch, Mapping, QubitPair, standard_batch};
use ftdemo_hal::{Backend, WaitPolicy};
use ftdemo_ir::Circuit;
use ftdemo_sched::{
    COMPLETED_LIST, DataLayout, HandlerOutcome, ResultHandler, TIMED_OUT_LIST, read_dump, read_ids,
    refetch_pending,
};

fn small_batch() -> CircuitBatch {
    standard_batch(vec![QubitPair::new(1, 0).unwrap()], Mapping::default())
        .unwrap()
        .1
}

fn circuits(batch: &CircuitBatch) -> Vec<Circuit> {
    batch.entries().iter().map(|e| e.circuit.clone()).collect()
}

#[tokio::test]
async fn test_completed_job_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DataLayout::new(dir.path());
    let batch = small_batch();
    let mut handler = ResultHandler::new(layout.clone(), &batch);

    let backend = SimulatorBackend::new(SimulatorConfig::ideal(7));
    let job = backend.submit(&circuits(&batch), 20).await.unwrap();
    let outcome = backend.wait(&job, WaitPolicy::default()).await;
    let handled = handler.handle(&job, outcome).await.unwrap();

    assert_eq!(handled, HandlerOutcome::Completed { circuits: batch.len() });
    assert_eq!(read_ids(&layout.id_list(COMPLETED_LIST)).await.unwrap(), vec![job.clone()]);

    let raw_files = std::fs::read_dir(layout.raw_counts_dir()).unwrap().count();
    assert_eq!(raw_files, batch.len());

    let dump = read_dump(&layout, &job).await.unwrap();
    assert_eq!(dump.circuits.len(), batch.len());
    assert_eq!(dump.circuit("bMX1|00>[1, 0]").unwrap().counts.get("01000"), 20);

    let log = std::fs::read_to_string(layout.callback_log()).unwrap();
    assert!(log.contains(&format!(":COMPLETED - id: {job}")));
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_job_is_refetched() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DataLayout::new(dir.path());
    let batch = small_batch();
    let mut handler = ResultHandler::new(layout.clone(), &batch);

    let backend = SimulatorBackend::new(SimulatorConfig::ideal(7)).with_queue_polls(5);
    let job = backend.submit(&circuits(&batch), 10).await.unwrap();
    let policy = WaitPolicy {
        poll_interval: Duration::from_millis(100),
        timeout: Duration::from_millis(250),
    };
    // three polls fit in the timeout, two remain queued
    let outcome = backend.wait(&job, policy).await;
    assert_eq!(handler.handle(&job, outcome).await.unwrap(), HandlerOutcome::TimedOut);
    assert!(!layout.raw_counts_dir().exists());
    assert!(read_dump(&layout, &job).await.is_err());

    assert_eq!(refetch_pending(&backend, &layout, TIMED_OUT_LIST).await.unwrap(), 0);
    assert_eq!(refetch_pending(&backend, &layout, TIMED_OUT_LIST).await.unwrap(), 0);
    assert_eq!(read_ids(&layout.id_list(TIMED_OUT_LIST)).await.unwrap(), vec![job.clone()]);

    assert_eq!(refetch_pending(&backend, &layout, TIMED_OUT_LIST).await.unwrap(), 1);
    assert!(read_ids(&layout.id_list(TIMED_OUT_LIST)).await.unwrap().is_empty());
    assert_eq!(
        read_ids(&layout.refetched_list(TIMED_OUT_LIST)).await.unwrap(),
        vec![job.clone()]
    );
    assert_eq!(read_dump(&layout, &job).await.unwrap().circuits.len(), batch.len());
}

#[tokio::test(start_paused = true)]
async fn test_handler_creates_fresh_data_root() {
    let dir = tempfile::tempdir().unwrap();
    let batch = small_batch();
    let policy = WaitPolicy {
        poll_interval: Duration::from_millis(100),
        timeout: Duration::from_millis(250),
    };

    let queued = DataLayout::new(dir.path().join("queued").join("data"));
    let mut handler = ResultHandler::new(queued.clone(), &batch);
    let backend = SimulatorBackend::new(SimulatorConfig::ideal(3)).with_queue_polls(5);
    let job = backend.submit(&circuits(&batch), 10).await.unwrap();
    let outcome = backend.wait(&job, policy).await;
    assert_eq!(handler.handle(&job, outcome).await.unwrap(), HandlerOutcome::TimedOut);
    assert_eq!(read_ids(&queued.id_list(TIMED_OUT_LIST)).await.unwrap(), vec![job]);
    assert!(queued.callback_log().exists());

    let fresh = DataLayout::new(dir.path().join("fresh").join("data"));
    let mut handler = ResultHandler::new(fresh.clone(), &batch);
    let backend = SimulatorBackend::new(SimulatorConfig::ideal(3));
    let job = backend.submit(&circuits(&batch), 10).await.unwrap();
    let outcome = backend.wait(&job, policy).await;
    assert_eq!(
        handler.handle(&job, outcome).await.unwrap(),
        HandlerOutcome::Completed { circuits: batch.len() }
    );
    assert!(fresh.callback_log().exists());
}
