//! # Concurrency
//!
//! Appends from many tasks share one ledger and one store handle. Heights
//! must stay unique and contiguous, and validation running alongside appends
//! must never report a violation for a clean chain.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::join_all;
    use ledger_core::test_utils::{make_test_ledger, make_test_ledger_on, ReversedStreamStore};
    use ledger_core::LedgerApi;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_appends_produce_contiguous_chain() {
        let ledger = Arc::new(make_test_ledger().await);
        ledger.initialize().await.unwrap();

        let handles = (0..64).map(|i| {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move { ledger.append(format!("record-{}", i)).await })
        });

        let mut heights: Vec<u64> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap().height)
            .collect();
        heights.sort_unstable();

        assert_eq!(heights, (1..=64).collect::<Vec<u64>>());
        assert_eq!(ledger.height().await.unwrap(), 65);
        assert!(ledger.validate_chain().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_validation_during_appends_sees_clean_prefix() {
        let ledger = Arc::new(make_test_ledger().await);
        ledger.initialize().await.unwrap();

        let writer = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                for i in 0..50 {
                    ledger.append(format!("w-{}", i)).await.unwrap();
                }
            })
        };

        for _ in 0..10 {
            assert!(ledger.validate_chain().await.unwrap().is_empty());
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();
        assert_eq!(ledger.height().await.unwrap(), 51);
    }

    #[tokio::test]
    async fn test_reverse_ordered_stream_validates() {
        let ledger = make_test_ledger_on(Arc::new(ReversedStreamStore::new())).await;
        ledger.initialize().await.unwrap();
        for i in 0..20 {
            ledger.append(format!("r-{}", i)).await.unwrap();
        }

        assert!(ledger.validate_chain().await.unwrap().is_empty());
    }
}
