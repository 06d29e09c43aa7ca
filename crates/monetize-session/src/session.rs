//! Monetization Session Facade
//!
//! One `MonetizationSession` per page: it publishes the payment target,
//! relays channel transitions to the accumulator, the visibility hook, and
//! host listeners, and settles the accumulated total on teardown.

use std::sync::Arc;

use rust_decimal::Decimal;

use monetize_core::{
    Accumulator, AdvertisementManager, AdvertisementSink, ListenerId, ListenerRegistry,
    MonetizationSource, ProgressEvent, SessionState, SourceEvent, TransitionKind,
};
use monetize_settlement::{
    EcdsaSettlementSigner, FundingSource, SettlementEngine, SettlementSigner, SigningKey, TxHash,
};

use crate::content::{MonetizedContent, VisibilityHook};
use crate::error::Result;
use crate::frame::FrameSink;

/// The page's monetization session
///
/// Collaborators (payment channel, advertisement slot, settlement signer,
/// frame policy) are injected, so the whole session runs against in-memory
/// fakes in tests.
pub struct MonetizationSession {
    source: Arc<dyn MonetizationSource>,
    advertisement: Arc<AdvertisementManager>,
    accumulator: Arc<Accumulator>,
    listeners: Arc<ListenerRegistry>,
    engine: SettlementEngine,
    visibility: Arc<VisibilityHook>,
    frames: Option<Arc<dyn FrameSink>>,
}

impl MonetizationSession {
    /// Session with the reference ECDSA settlement signer
    pub fn new(
        source: Arc<dyn MonetizationSource>,
        advertisement_sink: Arc<dyn AdvertisementSink>,
    ) -> Self {
        Self::with_signer(
            source,
            advertisement_sink,
            Arc::new(EcdsaSettlementSigner::new()),
        )
    }

    /// Session with a caller-chosen settlement signer
    pub fn with_signer(
        source: Arc<dyn MonetizationSource>,
        advertisement_sink: Arc<dyn AdvertisementSink>,
        signer: Arc<dyn SettlementSigner>,
    ) -> Self {
        let advertisement = Arc::new(AdvertisementManager::new(advertisement_sink));
        let accumulator = Arc::new(Accumulator::new());
        let listeners = Arc::new(ListenerRegistry::new(source.is_supported()));
        let visibility = Arc::new(VisibilityHook::new());

        wire_source(&source, &accumulator, &listeners, &visibility);

        Self {
            source,
            advertisement,
            accumulator,
            listeners,
            engine: SettlementEngine::new(signer),
            visibility,
            frames: None,
        }
    }

    /// Attach a frame policy surface
    #[must_use]
    pub fn with_frame_sink(mut self, frames: Arc<dyn FrameSink>) -> Self {
        self.frames = Some(frames);
        self
    }

    // ------------------------------------------------------------------
    // Capability and state
    // ------------------------------------------------------------------

    /// Whether the environment exposes the payment-notification capability
    pub fn is_supported(&self) -> bool {
        self.source.is_supported()
    }

    pub fn current_state(&self) -> SessionState {
        SessionState::of(self.source.as_ref())
    }

    /// Human-readable state string for host pages
    pub fn state_label(&self) -> &'static str {
        self.current_state().label()
    }

    pub fn is_pending(&self) -> bool {
        self.current_state() == SessionState::Pending
    }

    pub fn is_started(&self) -> bool {
        self.current_state() == SessionState::Started
    }

    pub fn is_stopped(&self) -> bool {
        self.current_state() == SessionState::Stopped
    }

    pub fn is_unsupported(&self) -> bool {
        self.current_state() == SessionState::Unsupported
    }

    // ------------------------------------------------------------------
    // Advertisement lifecycle
    // ------------------------------------------------------------------

    /// Advertise the payment target and begin the session
    ///
    /// Idempotent: when an advertisement already exists the call is a no-op
    /// and the original target stays active. The declaration is published
    /// even on unsupported environments, matching how a host document holds
    /// the declaration whether or not the channel exists.
    pub fn start(&self, target: &str) -> Result<()> {
        self.advertisement.publish(target)?;
        Ok(())
    }

    /// Change the advertised target in place
    ///
    /// With no advertisement present, creates one only when
    /// `create_if_absent` is set.
    pub fn change_target(&self, target: &str, create_if_absent: bool) -> Result<()> {
        self.advertisement.replace(target, create_if_absent)?;
        Ok(())
    }

    /// Target last recorded by a successful start/change
    pub fn target(&self) -> Option<String> {
        self.advertisement.target()
    }

    // ------------------------------------------------------------------
    // Accumulated totals
    // ------------------------------------------------------------------

    /// Total paid by the current visitor since the last settlement
    pub fn total(&self) -> Decimal {
        self.accumulator.read().total
    }

    /// Asset scale latched from the first notification of the epoch
    pub fn asset_scale(&self) -> u8 {
        self.accumulator.read().asset_scale
    }

    /// Asset code latched from the first notification of the epoch
    pub fn asset_code(&self) -> Option<String> {
        self.accumulator.read().asset_code
    }

    // ------------------------------------------------------------------
    // Listeners and content
    // ------------------------------------------------------------------

    /// Register page content whose visibility follows the payment stream
    pub fn register_monetized_content(&self, content: Arc<dyn MonetizedContent>) {
        self.visibility.register(content);
    }

    pub fn on_start(&self, callback: impl FnMut() + Send + 'static) -> Option<ListenerId> {
        self.listeners.on(TransitionKind::Start, Box::new(callback))
    }

    pub fn on_stop(&self, callback: impl FnMut() + Send + 'static) -> Option<ListenerId> {
        self.listeners.on(TransitionKind::Stop, Box::new(callback))
    }

    pub fn on_pending(&self, callback: impl FnMut() + Send + 'static) -> Option<ListenerId> {
        self.listeners.on(TransitionKind::Pending, Box::new(callback))
    }

    /// Fires immediately when the environment has no payment channel
    pub fn on_unsupported(&self, callback: impl FnMut() + Send + 'static) -> Option<ListenerId> {
        self.listeners.on(TransitionKind::Unsupported, Box::new(callback))
    }

    pub fn on_progress(
        &self,
        callback: impl FnMut(&ProgressEvent) + Send + 'static,
    ) -> Option<ListenerId> {
        self.listeners.on_progress(Box::new(callback))
    }

    /// Drop a listener registration
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // ------------------------------------------------------------------
    // Settlement and frames
    // ------------------------------------------------------------------

    /// Settle the session: sign the accumulated total over to the advertised
    /// target, drain the accumulator, and remove the advertisement
    ///
    /// Returns the signed transaction's hash. On a construction failure the
    /// total and the advertisement are left intact and the call may be
    /// retried.
    pub fn settle(&self, funding: &FundingSource, key: &SigningKey) -> Result<TxHash> {
        let settlement =
            self.engine
                .settle(&self.advertisement, &self.accumulator, funding, key)?;
        Ok(settlement.hash)
    }

    /// Grant the monetization allowance on an embedded frame
    pub fn enable_on_frame(&self, frame_id: &str) {
        self.set_frame_allowed(frame_id, true);
    }

    /// Revoke the monetization allowance on an embedded frame
    pub fn disable_on_frame(&self, frame_id: &str) {
        self.set_frame_allowed(frame_id, false);
    }

    fn set_frame_allowed(&self, frame_id: &str, allowed: bool) {
        let Some(frames) = &self.frames else {
            tracing::debug!(frame_id, "no frame sink attached");
            return;
        };
        if !frames.set_allowed(frame_id, allowed) {
            tracing::debug!(frame_id, "frame not found");
        }
    }
}

/// Install the session's relays on the payment channel
///
/// The accumulator fold and the visibility toggle run before host listeners
/// for the same transition, so a callback observing `total()` sees the
/// notification it was invoked for already applied.
fn wire_source(
    source: &Arc<dyn MonetizationSource>,
    accumulator: &Arc<Accumulator>,
    listeners: &Arc<ListenerRegistry>,
    visibility: &Arc<VisibilityHook>,
) {
    if !source.is_supported() {
        return;
    }

    {
        let listeners = Arc::clone(listeners);
        let visibility = Arc::clone(visibility);
        source.add_listener(
            TransitionKind::Start,
            Box::new(move |_| {
                visibility.show_all();
                listeners.emit(TransitionKind::Start);
            }),
        );
    }

    {
        let listeners = Arc::clone(listeners);
        let visibility = Arc::clone(visibility);
        source.add_listener(
            TransitionKind::Stop,
            Box::new(move |_| {
                visibility.hide_all();
                listeners.emit(TransitionKind::Stop);
            }),
        );
    }

    {
        let listeners = Arc::clone(listeners);
        source.add_listener(
            TransitionKind::Pending,
            Box::new(move |_| {
                listeners.emit(TransitionKind::Pending);
            }),
        );
    }

    {
        let accumulator = Arc::clone(accumulator);
        let listeners = Arc::clone(listeners);
        source.add_listener(
            TransitionKind::Progress,
            Box::new(move |event| {
                if let SourceEvent::Progress(progress) = event {
                    if let Err(error) = accumulator.record(progress) {
                        tracing::warn!(error = %error, "progress notification not folded");
                    }
                    listeners.emit_progress(progress);
                }
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use monetize_core::{MemoryAdvertisementSink, MockMonetizationSource, MonetizeError};
    use monetize_settlement::{SettlementError, SettlementRequest, SignedSettlement};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::SessionError;
    use crate::frame::MemoryFrameSink;

    fn funding() -> FundingSource {
        FundingSource::new("d4".repeat(16), 0, dec!(1_000_000), "76a914")
    }

    fn key() -> SigningKey {
        SigningKey::from_bytes([1; 32])
    }

    fn progress(amount: &str) -> SourceEvent {
        SourceEvent::Progress(ProgressEvent::new(amount, 9, "USD"))
    }

    fn supported_session() -> (Arc<MockMonetizationSource>, MonetizationSession) {
        let source = Arc::new(MockMonetizationSource::supported());
        let session =
            MonetizationSession::new(source.clone(), Arc::new(MemoryAdvertisementSink::new()));
        (source, session)
    }

    #[test]
    fn test_unsupported_environment_degrades_gracefully() {
        let session = MonetizationSession::new(
            Arc::new(MockMonetizationSource::unsupported()),
            Arc::new(MemoryAdvertisementSink::new()),
        );

        assert!(!session.is_supported());
        assert_eq!(session.current_state(), SessionState::Unsupported);
        assert_eq!(session.state_label(), "Not enabled in this browser");
        assert!(!session.is_pending());
        assert!(!session.is_started());
        assert!(!session.is_stopped());
        assert!(session.is_unsupported());

        // registrations no-op, except unsupported which fires eagerly
        let fired = Arc::new(AtomicU32::new(0));
        let counter = fired.clone();
        assert!(session.on_start(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }).is_none());

        let counter = fired.clone();
        session.on_unsupported(move || {
            counter.fetch_add(10, Ordering::SeqCst);
        });
        assert_eq!(fired.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_full_session_lifecycle() {
        let (source, session) = supported_session();

        session.start("$wallet.example/alice").unwrap();
        assert_eq!(session.target().as_deref(), Some("$wallet.example/alice"));

        source.emit(&SourceEvent::Start);
        assert!(session.is_started());

        for amount in ["10", "20", "30"] {
            source.emit(&progress(amount));
        }
        assert_eq!(session.total(), dec!(60));
        assert_eq!(session.asset_scale(), 9);
        assert_eq!(session.asset_code().as_deref(), Some("USD"));

        let hash = session.settle(&funding(), &key()).unwrap();
        assert_eq!(hash.as_str().len(), 64);
        assert_eq!(session.total(), Decimal::ZERO);

        // advertisement is gone: settling again has nothing to pay to
        assert!(matches!(
            session.settle(&funding(), &key()),
            Err(SessionError::Settlement(SettlementError::NoActiveAdvertisement))
        ));
    }

    #[test]
    fn test_session_reopens_after_settlement() {
        let (source, session) = supported_session();

        session.start("$wallet.example/alice").unwrap();
        source.emit(&progress("40"));
        session.settle(&funding(), &key()).unwrap();

        session.change_target("$wallet.example/bob", true).unwrap();
        source.emit(&SourceEvent::Progress(ProgressEvent::new("7", 2, "XRP")));

        assert_eq!(session.total(), dec!(7));
        assert_eq!(session.asset_scale(), 2);
        assert_eq!(session.asset_code().as_deref(), Some("XRP"));

        let hash = session.settle(&funding(), &key()).unwrap();
        assert_eq!(hash.as_str().len(), 64);
        assert_eq!(session.target().as_deref(), Some("$wallet.example/bob"));
    }

    #[test]
    fn test_settle_without_start_fails_and_keeps_total() {
        let (source, session) = supported_session();
        source.emit(&progress("15"));

        let result = session.settle(&funding(), &key());

        assert!(matches!(
            result,
            Err(SessionError::Settlement(SettlementError::NoActiveAdvertisement))
        ));
        assert_eq!(session.total(), dec!(15));
    }

    #[test]
    fn test_empty_target_is_rejected() {
        let (_, session) = supported_session();
        session.start("$wallet.example/alice").unwrap();

        assert!(matches!(
            session.change_target("", false),
            Err(SessionError::Monetize(MonetizeError::InvalidTarget))
        ));
        assert_eq!(session.target().as_deref(), Some("$wallet.example/alice"));
    }

    #[test]
    fn test_start_is_idempotent() {
        let (_, session) = supported_session();
        session.start("$wallet.example/alice").unwrap();
        session.start("$wallet.example/mallory").unwrap();

        assert_eq!(session.target().as_deref(), Some("$wallet.example/alice"));
    }

    struct FlagContent {
        visible: AtomicBool,
    }

    impl MonetizedContent for FlagContent {
        fn show(&self) {
            self.visible.store(true, Ordering::SeqCst);
        }

        fn hide(&self) {
            self.visible.store(false, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_content_visibility_follows_stream() {
        let (source, session) = supported_session();
        let content = Arc::new(FlagContent {
            visible: AtomicBool::new(false),
        });
        session.register_monetized_content(content.clone());

        source.emit(&SourceEvent::Start);
        assert!(content.visible.load(Ordering::SeqCst));

        source.emit(&SourceEvent::Stop);
        assert!(!content.visible.load(Ordering::SeqCst));
    }

    #[test]
    fn test_progress_listener_observes_updated_total() {
        let source = Arc::new(MockMonetizationSource::supported());
        let session = Arc::new(MonetizationSession::new(
            source.clone(),
            Arc::new(MemoryAdvertisementSink::new()),
        ));

        let observed = Arc::new(Mutex::new(Vec::new()));
        {
            let reader = session.clone();
            let observed = observed.clone();
            session.on_progress(move |event| {
                observed
                    .lock()
                    .unwrap()
                    .push((event.amount.clone(), reader.total()));
            });
        }

        source.emit(&progress("10"));
        source.emit(&progress("20"));

        let observed = observed.lock().unwrap();
        assert_eq!(*observed, vec![("10".into(), dec!(10)), ("20".into(), dec!(30))]);
    }

    #[test]
    fn test_removed_progress_listener_goes_quiet() {
        let (source, session) = supported_session();
        let fired = Arc::new(AtomicU32::new(0));

        let counter = fired.clone();
        let id = session
            .on_progress(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        source.emit(&progress("1"));
        assert!(session.remove_listener(id));
        source.emit(&progress("1"));

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_frame_allowance_round_trips() {
        let frames = Arc::new(MemoryFrameSink::new());
        frames.add_frame("player");

        let (_, session) = supported_session();
        let session = session.with_frame_sink(frames.clone());

        session.enable_on_frame("player");
        assert!(frames.is_allowed("player"));

        session.disable_on_frame("player");
        assert!(!frames.is_allowed("player"));

        // unknown frames are ignored
        session.enable_on_frame("ghost");
        assert!(!frames.is_allowed("ghost"));
    }

    struct FailingSigner;

    impl SettlementSigner for FailingSigner {
        fn build_and_sign(
            &self,
            _request: &SettlementRequest,
            _key: &SigningKey,
        ) -> anyhow::Result<SignedSettlement> {
            anyhow::bail!("hardware wallet unplugged")
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_failed_settlement_is_retryable() {
        let source = Arc::new(MockMonetizationSource::supported());
        let session = MonetizationSession::with_signer(
            source.clone(),
            Arc::new(MemoryAdvertisementSink::new()),
            Arc::new(FailingSigner),
        );

        session.start("$wallet.example/alice").unwrap();
        source.emit(&progress("50"));

        let result = session.settle(&funding(), &key());
        match result {
            Err(SessionError::Settlement(error)) => assert!(error.is_retryable()),
            other => panic!("expected settlement error, got {other:?}"),
        }

        // accounting intact: the same funds settle on retry
        assert_eq!(session.total(), dec!(50));
        assert_eq!(session.target().as_deref(), Some("$wallet.example/alice"));
    }
}
