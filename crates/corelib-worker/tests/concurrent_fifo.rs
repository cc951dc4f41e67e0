//! Spec §8 property 8: under concurrent submission from N threads (no cancellations),
//! completion order within each submitting thread matches submission order.

use corelib_worker::executor::TokioExecutor;
use corelib_worker::SequentialWorker;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn per_thread_submission_order_is_preserved() {
    let worker = SequentialWorker::new(Arc::new(TokioExecutor::current()));
    let threads = 8;
    let per_thread = 25;

    let mut join_handles = Vec::new();
    for t in 0..threads {
        let worker = worker.clone();
        join_handles.push(tokio::spawn(async move {
            let mut handles = Vec::with_capacity(per_thread);
            for i in 0..per_thread {
                handles.push(worker.submit_task(move || (t, i)));
            }
            let mut completed = Vec::with_capacity(per_thread);
            for handle in handles {
                completed.push(handle.await.unwrap());
            }
            completed
        }));
    }

    for join_handle in join_handles {
        let completed = join_handle.await.unwrap();
        let t = completed[0].0;
        let expected: Vec<_> = (0..per_thread).map(|i| (t, i)).collect();
        assert_eq!(completed, expected);
    }
}
