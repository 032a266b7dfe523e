//! # Chain Properties
//!
//! Properties that must hold for every sequence of appends:
//!
//! - Genesis is at height 0 with the fixed body and an empty previous hash
//! - Appends produce heights 1, 2, ... and the chain length follows
//! - Every stored block reproduces its own hash
//! - A block read back equals the block returned by `append`
//! - Validating a clean chain finds nothing, every time
//! - Rewriting a body is caught by block and chain validation
//! - Rewriting and rehashing a body breaks the successor's link
//! - Storing another height's block under a key is caught
//! - Heights at or past the chain length are `NotFound`

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledger_core::test_utils::{
        make_test_ledger, make_test_ledger_on, FixedTimeSource, TamperHarness, FIXED_TIME,
    };
    use ledger_core::{
        compute_content_hash, Block, InMemoryKVStore, IntegrityCheck, IntegrityViolation, Ledger,
        LedgerApi, LedgerError, GENESIS_BODY,
    };
    use proptest::prelude::*;
    use sha2::{Digest, Sha256};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type TestLedger = Ledger<InMemoryKVStore, FixedTimeSource>;

    fn bodies() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(".{1,40}", 0..12)
    }

    async fn chain_of(bodies: &[String]) -> (TestLedger, Vec<Block>) {
        let ledger = make_test_ledger().await;
        ledger.initialize().await.unwrap();

        let mut appended = vec![ledger.get_block(0).await.unwrap()];
        for body in bodies {
            appended.push(ledger.append(body.clone()).await.unwrap());
        }
        (ledger, appended)
    }

    // =============================================================================
    // CONCRETE SCENARIOS
    // =============================================================================

    #[tokio::test]
    async fn test_append_hello_matches_explicit_preimage() {
        let ledger = make_test_ledger().await;
        ledger.initialize().await.unwrap();
        let genesis = ledger.get_block(0).await.unwrap();

        let block = ledger.append("hello".to_string()).await.unwrap();

        let preimage = format!(
            r#"{{"hash":"","height":1,"body":"hello","time":{},"previousBlockHash":"{}"}}"#,
            FIXED_TIME, genesis.hash
        );
        let expected = hex::encode(Sha256::digest(preimage.as_bytes()));

        assert_eq!(block.height, 1);
        assert_eq!(block.previous_block_hash, genesis.hash);
        assert_eq!(block.time, FIXED_TIME);
        assert_eq!(block.hash, expected);
    }

    #[tokio::test]
    async fn test_genesis_hash_matches_explicit_preimage() {
        let ledger = make_test_ledger().await;
        ledger.initialize().await.unwrap();

        let preimage = format!(
            r#"{{"hash":"","height":0,"body":"{}","time":{},"previousBlockHash":""}}"#,
            GENESIS_BODY, FIXED_TIME
        );
        let expected = hex::encode(Sha256::digest(preimage.as_bytes()));
        assert_eq!(ledger.get_block(0).await.unwrap().hash, expected);
    }

    #[tokio::test]
    async fn test_reopened_engine_continues_chain() {
        let store = Arc::new(InMemoryKVStore::new());
        let first = make_test_ledger_on(Arc::clone(&store)).await;
        first.initialize().await.unwrap();
        let tip = first.append("one".to_string()).await.unwrap();
        drop(first);

        let second = make_test_ledger_on(store).await;
        second.initialize().await.unwrap();
        let next = second.append("two".to_string()).await.unwrap();

        assert_eq!(next.height, 2);
        assert_eq!(next.previous_block_hash, tip.hash);
        assert!(second.validate_chain().await.unwrap().is_empty());
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_genesis_and_monotonic_heights(bodies in bodies()) {
            tokio_test::block_on(async {
                let (ledger, appended) = chain_of(&bodies).await;

                let genesis = &appended[0];
                assert_eq!(genesis.height, 0);
                assert_eq!(genesis.body, GENESIS_BODY);
                assert_eq!(genesis.previous_block_hash, "");

                for (expected, block) in appended.iter().enumerate() {
                    assert_eq!(block.height, expected as u64);
                }
                assert_eq!(ledger.height().await.unwrap(), bodies.len() as u64 + 1);
            });
        }

        #[test]
        fn prop_blocks_round_trip_and_self_hash(bodies in bodies()) {
            tokio_test::block_on(async {
                let (ledger, appended) = chain_of(&bodies).await;

                for block in &appended {
                    let stored = ledger.get_block(block.height).await.unwrap();
                    assert_eq!(&stored, block);
                    assert_eq!(compute_content_hash(&stored).unwrap(), stored.hash);
                    assert!(ledger.validate_block(block.height).await.unwrap());
                }
                for pair in appended.windows(2) {
                    assert_eq!(pair[1].previous_block_hash, pair[0].hash);
                }
            });
        }

        #[test]
        fn prop_clean_chain_validation_is_idempotent(bodies in bodies()) {
            tokio_test::block_on(async {
                let (ledger, _) = chain_of(&bodies).await;
                assert!(ledger.validate_chain().await.unwrap().is_empty());
                assert!(ledger.validate_chain().await.unwrap().is_empty());
            });
        }

        #[test]
        fn prop_content_tamper_detected(
            bodies in prop::collection::vec(".{1,40}", 1..12),
            pick in any::<prop::sample::Index>(),
        ) {
            tokio_test::block_on(async {
                let (ledger, appended) = chain_of(&bodies).await;
                let target = pick.index(appended.len()) as u64;
                let forged = format!("{}-forged", appended[target as usize].body);

                TamperHarness::new(ledger.store())
                    .rewrite_body(target, &forged)
                    .await
                    .unwrap();

                assert!(!ledger.validate_block(target).await.unwrap());
                let violations = ledger.validate_chain().await.unwrap();
                assert!(violations.contains(&IntegrityViolation::new(target, IntegrityCheck::ContentHash)));
            });
        }

        #[test]
        fn prop_rehashed_tamper_breaks_successor(
            bodies in prop::collection::vec(".{1,40}", 1..12),
            pick in any::<prop::sample::Index>(),
        ) {
            tokio_test::block_on(async {
                let (ledger, appended) = chain_of(&bodies).await;
                // Any block that has a successor.
                let target = pick.index(appended.len() - 1) as u64;
                let forged = format!("{}-forged", appended[target as usize].body);

                TamperHarness::new(ledger.store())
                    .rewrite_body_and_rehash(target, &forged)
                    .await
                    .unwrap();

                assert!(ledger.validate_block(target).await.unwrap());
                assert_eq!(
                    ledger.validate_chain().await.unwrap(),
                    vec![IntegrityViolation::new(target + 1, IntegrityCheck::Linkage)]
                );
            });
        }

        #[test]
        fn prop_substituted_block_detected(
            bodies in prop::collection::vec(".{1,40}", 1..12),
            pick in any::<prop::sample::Index>(),
            source in any::<prop::sample::Index>(),
        ) {
            tokio_test::block_on(async {
                let (ledger, appended) = chain_of(&bodies).await;
                let target = 1 + pick.index(appended.len() - 1) as u64;
                let copied = &appended[source.index(target as usize)];

                TamperHarness::new(ledger.store())
                    .substitute(target, copied)
                    .await
                    .unwrap();

                assert!(!ledger.validate_block(target).await.unwrap());
                let violations = ledger.validate_chain().await.unwrap();
                assert!(violations.contains(&IntegrityViolation::new(target, IntegrityCheck::HeightMismatch)));
            });
        }

        #[test]
        fn prop_heights_past_tip_not_found(bodies in bodies(), beyond in 0u64..1_000) {
            tokio_test::block_on(async {
                let (ledger, _) = chain_of(&bodies).await;
                let height = ledger.height().await.unwrap() + beyond;

                assert_eq!(
                    ledger.get_block(height).await.unwrap_err(),
                    LedgerError::NotFound { height }
                );
                assert!(ledger.validate_block(height).await.unwrap_err().is_not_found());
            });
        }
    }
}
