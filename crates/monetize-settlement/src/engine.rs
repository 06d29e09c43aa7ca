//! Settlement Engine
//!
//! Converts the accumulated session total into a signed transaction
//! addressed to the advertised target. Signing happens before the drain is
//! committed: a collaborator failure leaves the total and the advertisement
//! intact, so settlement failures are retryable.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use monetize_core::{Accumulator, AdvertisementManager};

use crate::error::{Result, SettlementError};
use crate::signer::SettlementSigner;
use crate::transaction::{FundingSource, SettlementRequest, SignedSettlement, SigningKey};

/// Drives session teardown against the transaction collaborator
pub struct SettlementEngine {
    signer: Arc<dyn SettlementSigner>,
    in_progress: AtomicBool,
}

impl SettlementEngine {
    pub fn new(signer: Arc<dyn SettlementSigner>) -> Self {
        Self {
            signer,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Settle the session: sign first, then commit the drain
    ///
    /// Fails with [`SettlementError::NoActiveAdvertisement`] when nothing is
    /// advertised. Reentrant invocation (e.g. from within a stop listener
    /// fired by the transition being settled) fails with
    /// [`SettlementError::SettlementInProgress`] instead of draining twice.
    pub fn settle(
        &self,
        advertisement: &AdvertisementManager,
        accumulator: &Accumulator,
        funding: &FundingSource,
        key: &SigningKey,
    ) -> Result<SignedSettlement> {
        if self.in_progress.swap(true, Ordering::SeqCst) {
            return Err(SettlementError::SettlementInProgress);
        }
        let result = self.settle_inner(advertisement, accumulator, funding, key);
        self.in_progress.store(false, Ordering::SeqCst);
        result
    }

    fn settle_inner(
        &self,
        advertisement: &AdvertisementManager,
        accumulator: &Accumulator,
        funding: &FundingSource,
        key: &SigningKey,
    ) -> Result<SignedSettlement> {
        let destination = advertisement
            .advertised()
            .ok_or(SettlementError::NoActiveAdvertisement)?;

        let snapshot = accumulator.read();
        let request = SettlementRequest {
            funding: funding.clone(),
            destination,
            amount: snapshot.total,
            asset_scale: snapshot.asset_scale,
            asset_code: snapshot.asset_code,
        };

        tracing::info!(
            destination = %request.destination,
            amount = %request.amount,
            signer = self.signer.name(),
            "constructing settlement"
        );

        let settlement = self
            .signer
            .build_and_sign(&request, key)
            .map_err(|e| SettlementError::ConstructionFailed(e.to_string()))?;

        // commit only once the artifact exists
        accumulator.drain_and_reset();
        advertisement.clear();

        tracing::info!(
            settlement_id = %settlement.id,
            hash = %settlement.hash,
            "settlement complete"
        );

        Ok(settlement)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use monetize_core::{MemoryAdvertisementSink, ProgressEvent};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::signer::EcdsaSettlementSigner;

    fn fixtures() -> (Arc<AdvertisementManager>, Arc<Accumulator>, FundingSource, SigningKey) {
        let advertisement = Arc::new(AdvertisementManager::new(Arc::new(
            MemoryAdvertisementSink::new(),
        )));
        let accumulator = Arc::new(Accumulator::new());
        let funding = FundingSource::new("c0".repeat(16), 1, dec!(500_000), "76a914");
        let key = SigningKey::from_bytes([1; 32]);
        (advertisement, accumulator, funding, key)
    }

    fn engine() -> SettlementEngine {
        SettlementEngine::new(Arc::new(EcdsaSettlementSigner::new()))
    }

    #[test]
    fn test_settle_drains_total_and_removes_advertisement() {
        let (ads, acc, funding, key) = fixtures();
        ads.publish("$wallet.example/alice").unwrap();
        acc.record(&ProgressEvent::new("60", 9, "USD")).unwrap();

        let settlement = engine().settle(&ads, &acc, &funding, &key).unwrap();

        assert_eq!(settlement.amount, dec!(60));
        assert_eq!(settlement.destination, "$wallet.example/alice");
        assert_eq!(settlement.hash.as_str().len(), 64);
        assert_eq!(acc.read().total, Decimal::ZERO);
        assert!(!ads.is_active());
    }

    #[test]
    fn test_settle_without_advertisement_fails_and_keeps_total() {
        let (ads, acc, funding, key) = fixtures();
        acc.record(&ProgressEvent::new("10", 9, "USD")).unwrap();

        let result = engine().settle(&ads, &acc, &funding, &key);

        assert!(matches!(result, Err(SettlementError::NoActiveAdvertisement)));
        assert_eq!(acc.read().total, dec!(10));
    }

    struct FailingSigner;

    impl SettlementSigner for FailingSigner {
        fn build_and_sign(
            &self,
            _request: &SettlementRequest,
            _key: &SigningKey,
        ) -> anyhow::Result<SignedSettlement> {
            anyhow::bail!("backend unavailable")
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_construction_failure_leaves_accounting_intact() {
        let (ads, acc, funding, key) = fixtures();
        ads.publish("$wallet.example/alice").unwrap();
        acc.record(&ProgressEvent::new("25", 9, "USD")).unwrap();

        let engine = SettlementEngine::new(Arc::new(FailingSigner));
        let result = engine.settle(&ads, &acc, &funding, &key);

        match result {
            Err(error @ SettlementError::ConstructionFailed(_)) => {
                assert!(error.is_retryable());
            }
            other => panic!("expected construction failure, got {other:?}"),
        }
        assert_eq!(acc.read().total, dec!(25));
        assert!(ads.is_active());
    }

    #[test]
    fn test_engine_is_reusable_across_settlements() {
        let (ads, acc, funding, key) = fixtures();
        let engine = engine();

        ads.publish("$wallet.example/alice").unwrap();
        acc.record(&ProgressEvent::new("5", 9, "USD")).unwrap();
        engine.settle(&ads, &acc, &funding, &key).unwrap();

        ads.publish("$wallet.example/bob").unwrap();
        acc.record(&ProgressEvent::new("9", 9, "USD")).unwrap();
        let second = engine.settle(&ads, &acc, &funding, &key).unwrap();

        assert_eq!(second.destination, "$wallet.example/bob");
        assert_eq!(second.amount, dec!(9));
    }

    struct NestedSigner {
        engine: Mutex<Option<Arc<SettlementEngine>>>,
        advertisement: Arc<AdvertisementManager>,
        accumulator: Arc<Accumulator>,
        inner_error: Mutex<Option<SettlementError>>,
        delegate: EcdsaSettlementSigner,
    }

    impl SettlementSigner for NestedSigner {
        fn build_and_sign(
            &self,
            request: &SettlementRequest,
            key: &SigningKey,
        ) -> anyhow::Result<SignedSettlement> {
            let engine = self.engine.lock().unwrap().clone().unwrap();
            let nested = engine.settle(&self.advertisement, &self.accumulator, &request.funding, key);
            *self.inner_error.lock().unwrap() = nested.err();
            self.delegate.build_and_sign(request, key)
        }

        fn name(&self) -> &str {
            "nested-probe"
        }
    }

    #[test]
    fn test_reentrant_settle_is_rejected() {
        let (ads, acc, funding, key) = fixtures();
        ads.publish("$wallet.example/alice").unwrap();
        acc.record(&ProgressEvent::new("30", 9, "USD")).unwrap();

        let signer = Arc::new(NestedSigner {
            engine: Mutex::new(None),
            advertisement: ads.clone(),
            accumulator: acc.clone(),
            inner_error: Mutex::new(None),
            delegate: EcdsaSettlementSigner::new(),
        });
        let engine = Arc::new(SettlementEngine::new(signer.clone()));
        *signer.engine.lock().unwrap() = Some(engine.clone());

        let outer = engine.settle(&ads, &acc, &funding, &key);

        assert!(outer.is_ok());
        assert!(matches!(
            *signer.inner_error.lock().unwrap(),
            Some(SettlementError::SettlementInProgress)
        ));
        assert_eq!(acc.read().total, Decimal::ZERO);
    }
}
