//! # File Store Integration
//!
//! A chain written through `FileBackedKVStore` must survive a restart
//! unchanged, keep verifying, and keep growing from where it stopped.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledger_core::test_utils::{FixedTimeSource, TamperHarness};
    use ledger_core::{
        FileBackedKVStore, IntegrityCheck, IntegrityViolation, KVStoreError, Ledger, LedgerApi,
        LedgerConfig, LedgerDependencies,
    };
    use tempfile::tempdir;

    async fn open_ledger(
        path: &std::path::Path,
    ) -> Ledger<FileBackedKVStore, FixedTimeSource> {
        let store = FileBackedKVStore::open(path).await.unwrap();
        let deps = LedgerDependencies {
            store: Arc::new(store),
            time_source: FixedTimeSource::default(),
        };
        Ledger::open(deps, LedgerConfig::for_testing()).await.unwrap()
    }

    #[tokio::test]
    async fn test_chain_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chain.db");

        let written = {
            let ledger = open_ledger(&path).await;
            ledger.initialize().await.unwrap();
            let mut blocks = vec![ledger.get_block(0).await.unwrap()];
            for body in ["alpha", "beta", "gamma"] {
                blocks.push(ledger.append(body.to_string()).await.unwrap());
            }
            blocks
        };

        let ledger = open_ledger(&path).await;
        ledger.initialize().await.unwrap();

        assert_eq!(ledger.height().await.unwrap(), 4);
        for block in &written {
            assert_eq!(&ledger.get_block(block.height).await.unwrap(), block);
        }
        assert!(ledger.validate_chain().await.unwrap().is_empty());

        let next = ledger.append("delta".to_string()).await.unwrap();
        assert_eq!(next.height, 4);
        assert_eq!(next.previous_block_hash, written[3].hash);
    }

    #[tokio::test]
    async fn test_tamper_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chain.db");

        {
            let ledger = open_ledger(&path).await;
            ledger.initialize().await.unwrap();
            ledger.append("kept".to_string()).await.unwrap();
            TamperHarness::new(ledger.store())
                .rewrite_body(1, "changed")
                .await
                .unwrap();
        }

        let ledger = open_ledger(&path).await;
        assert_eq!(ledger.height().await.unwrap(), 2);
        assert_eq!(
            ledger.validate_chain().await.unwrap(),
            vec![IntegrityViolation::new(1, IntegrityCheck::ContentHash)]
        );
    }

    #[tokio::test]
    async fn test_second_writer_is_locked_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chain.db");

        let _owner = open_ledger(&path).await;
        let second = FileBackedKVStore::open(&path).await;
        assert!(matches!(second, Err(KVStoreError::Locked { .. })));
    }
}
