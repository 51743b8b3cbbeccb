//! Conversion coordinator: keeps the base and target amounts in step with the
//! latest exchange rate.
//!
//! Every rate fetch is tagged with a ticket. Only the result for the most
//! recently issued ticket is applied; anything older is discarded when it
//! resolves. Amounts, the rate record and fetch bookkeeping share one mutex,
//! so readers never observe an amount that was written without its derived
//! counterpart.

use std::sync::Arc;
use std::time::Duration;

use fxcalc_common::{now, Currency, CurrencyPair, Timestamp};
use fxcalc_fx::{FixtureRateProvider, FxError, FxResult, RateRecord, SharedRateProvider};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, info, instrument, warn};

use crate::config::ConverterConfig;
use crate::metrics::{ConverterMetrics, MetricsSnapshot};
use crate::state::{ConversionSnapshot, ConversionState, Panel};

/// Which amount drives the recompute once a fetch resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recompute {
    /// Currency selection: base always drives.
    TargetFromBase,
    /// Swap or refresh: the active panel drives.
    FromActive,
}

/// State guarded by the coordinator mutex.
#[derive(Debug)]
struct Shared {
    conversion: ConversionState,
    rate: Option<RateRecord>,
    last_updated: Option<Timestamp>,
    latest_ticket: u64,
    pending_ticket: Option<u64>,
    stale: bool,
    last_error: Option<FxError>,
}

impl Shared {
    fn begin_fetch(&mut self) -> (u64, CurrencyPair) {
        self.latest_ticket += 1;
        self.pending_ticket = Some(self.latest_ticket);
        (self.latest_ticket, self.conversion.pair())
    }
}

/// Owns the conversion state and orchestrates rate-driven recomputation.
///
/// Methods that trigger a fetch spawn it on the current Tokio runtime and
/// return immediately.
pub struct ConversionCoordinator {
    config: ConverterConfig,
    provider: SharedRateProvider,
    shared: Arc<Mutex<Shared>>,
    settle_notify: Arc<Notify>,
    metrics: Arc<ConverterMetrics>,
}

impl ConversionCoordinator {
    /// Create a coordinator seeded from `config`. No fetch is issued until
    /// [`refresh_rate`](Self::refresh_rate) or a currency change.
    pub fn new(config: ConverterConfig, provider: SharedRateProvider) -> Self {
        let conversion = ConversionState::new(
            config.base_currency.clone(),
            config.target_currency.clone(),
            config.base_amount,
            config.target_amount,
        );

        Self {
            config,
            provider,
            shared: Arc::new(Mutex::new(Shared {
                conversion,
                rate: None,
                last_updated: None,
                latest_ticket: 0,
                pending_ticket: None,
                stale: false,
                last_error: None,
            })),
            settle_notify: Arc::new(Notify::new()),
            metrics: Arc::new(ConverterMetrics::new()),
        }
    }

    /// Create a coordinator backed by the fixture rate provider.
    pub fn with_fixture(config: ConverterConfig) -> Self {
        let provider = Arc::new(FixtureRateProvider::with_config(config.fixture.clone()));
        Self::new(config, provider)
    }

    /// Select which amount future calculator results write to.
    pub fn set_active_panel(&self, panel: Panel) {
        self.shared.lock().conversion.active_panel = panel;
        debug!(panel = %panel, "Active panel changed");
    }

    /// Write a calculator result into the active amount and derive the other
    /// amount from the latest rate record. Without a record the other amount
    /// is left as is.
    pub fn apply_calculator_result(&self, amount: f64) {
        let mut shared = self.shared.lock();
        let Shared {
            conversion, rate, ..
        } = &mut *shared;

        conversion.set_active_amount(amount);
        if let Some(rate) = rate.as_ref() {
            conversion.recompute_from_active(rate);
        }
        self.metrics.amount_applied();

        debug!(
            panel = %conversion.active_panel,
            base_amount = conversion.base_amount,
            target_amount = conversion.target_amount,
            "Applied calculator result"
        );
    }

    /// Swap currencies and amounts by value, then refetch for the new pair.
    pub fn swap_currencies(&self) {
        let (ticket, pair) = {
            let mut shared = self.shared.lock();
            shared.conversion.swap();
            shared.begin_fetch()
        };
        self.metrics.swapped();
        info!(pair = %pair, ticket, "Swapped currencies");

        self.spawn_fetch(ticket, pair, Recompute::FromActive);
    }

    /// Set the currency of `panel` and refetch. When the new rate arrives the
    /// target amount is recomputed from the base amount.
    pub fn select_currency(&self, panel: Panel, currency: impl Into<Currency>) {
        let currency = currency.into();
        let (ticket, pair) = {
            let mut shared = self.shared.lock();
            shared.conversion.set_currency(panel, currency);
            shared.begin_fetch()
        };
        info!(panel = %panel, pair = %pair, ticket, "Currency selected");

        self.spawn_fetch(ticket, pair, Recompute::TargetFromBase);
    }

    /// Refetch the rate for the current pair without changing any state.
    pub fn refresh_rate(&self) {
        let (ticket, pair) = self.shared.lock().begin_fetch();
        debug!(pair = %pair, ticket, "Refreshing rate");

        self.spawn_fetch(ticket, pair, Recompute::FromActive);
    }

    /// Wait until no fetch for the latest ticket is outstanding.
    pub async fn settled(&self) {
        loop {
            let notified = self.settle_notify.notified();
            if self.shared.lock().pending_ticket.is_none() {
                return;
            }
            notified.await;
        }
    }

    /// Snapshot of everything a renderer needs.
    pub fn snapshot(&self) -> ConversionSnapshot {
        let shared = self.shared.lock();
        ConversionSnapshot {
            conversion: shared.conversion.clone(),
            rate: shared.rate.clone(),
            is_fetching: shared.pending_ticket.is_some(),
            is_stale: shared.stale,
            last_updated: shared.last_updated,
            last_error: shared.last_error.as_ref().map(|e| e.to_string()),
        }
    }

    /// Current conversion state.
    pub fn conversion(&self) -> ConversionState {
        self.shared.lock().conversion.clone()
    }

    /// Most recently resolved rate record.
    pub fn rate(&self) -> Option<RateRecord> {
        self.shared.lock().rate.clone()
    }

    pub fn base_amount(&self) -> f64 {
        self.shared.lock().conversion.base_amount
    }

    pub fn target_amount(&self) -> f64 {
        self.shared.lock().conversion.target_amount
    }

    pub fn base_currency(&self) -> Currency {
        self.shared.lock().conversion.base_currency.clone()
    }

    pub fn target_currency(&self) -> Currency {
        self.shared.lock().conversion.target_currency.clone()
    }

    pub fn active_panel(&self) -> Panel {
        self.shared.lock().conversion.active_panel
    }

    pub fn active_currency(&self) -> Currency {
        self.shared.lock().conversion.active_currency().clone()
    }

    pub fn active_amount(&self) -> f64 {
        self.shared.lock().conversion.active_amount()
    }

    /// Whether a fetch for the current pair is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.shared.lock().pending_ticket.is_some()
    }

    /// Whether the latest fetch failed and the record in use is older.
    pub fn is_stale(&self) -> bool {
        self.shared.lock().stale
    }

    /// Error from the latest failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<FxError> {
        self.shared.lock().last_error.clone()
    }

    /// When a rate was last installed.
    pub fn last_updated(&self) -> Option<Timestamp> {
        self.shared.lock().last_updated
    }

    /// Get a snapshot of converter metrics.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Name of the rate provider in use.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn spawn_fetch(&self, ticket: u64, pair: CurrencyPair, recompute: Recompute) {
        self.metrics.fetch_issued();

        let provider = self.provider.clone();
        let shared = self.shared.clone();
        let notify = self.settle_notify.clone();
        let metrics = self.metrics.clone();
        let timeout = self.config.fetch_timeout;

        tokio::spawn(async move {
            let outcome = fetch_with_timeout(&provider, &pair, timeout).await;
            settle_fetch(&shared, &metrics, ticket, &pair, recompute, outcome);
            notify.notify_waiters();
        });
    }
}

#[instrument(skip(provider), fields(provider = provider.name()))]
async fn fetch_with_timeout(
    provider: &SharedRateProvider,
    pair: &CurrencyPair,
    timeout: Duration,
) -> FxResult<RateRecord> {
    match tokio::time::timeout(timeout, provider.fetch_rate(pair)).await {
        Ok(result) => result,
        Err(_) => Err(FxError::Timeout {
            pair: pair.clone(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

fn settle_fetch(
    shared: &Mutex<Shared>,
    metrics: &ConverterMetrics,
    ticket: u64,
    pair: &CurrencyPair,
    recompute: Recompute,
    outcome: FxResult<RateRecord>,
) {
    let mut shared = shared.lock();

    if ticket != shared.latest_ticket {
        metrics.fetch_discarded();
        debug!(
            pair = %pair,
            ticket,
            latest_ticket = shared.latest_ticket,
            "Discarding superseded rate fetch"
        );
        return;
    }
    shared.pending_ticket = None;

    match outcome {
        Ok(record) => {
            match recompute {
                Recompute::TargetFromBase => {
                    shared.conversion.recompute_target_from_base(&record)
                }
                Recompute::FromActive => shared.conversion.recompute_from_active(&record),
            }
            info!(
                pair = %pair,
                rate = record.rate,
                source = %record.source,
                base_amount = shared.conversion.base_amount,
                target_amount = shared.conversion.target_amount,
                "Rate updated"
            );
            shared.rate = Some(record);
            shared.last_updated = Some(now());
            shared.stale = false;
            shared.last_error = None;
            metrics.fetch_applied();
        }
        Err(e) => {
            warn!(
                pair = %pair,
                error = %e,
                retryable = e.is_retryable(),
                "Rate fetch failed, keeping previous rate"
            );
            shared.stale = true;
            shared.last_error = Some(e);
            metrics.fetch_failed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxcalc_fx::MockRateProvider;

    fn usd_eur() -> CurrencyPair {
        CurrencyPair::new(Currency::usd(), Currency::eur())
    }

    fn mock() -> Arc<MockRateProvider> {
        let provider = Arc::new(MockRateProvider::new("mock"));
        provider.set_rate(usd_eur(), 0.85);
        provider.set_rate(usd_eur().inverse(), 1.25);
        provider.set_rate(CurrencyPair::new(Currency::usd(), Currency::gbp()), 0.75);
        provider.set_rate(CurrencyPair::new(Currency::usd(), Currency::jpy()), 110.0);
        provider
    }

    fn coordinator(provider: Arc<MockRateProvider>) -> ConversionCoordinator {
        ConversionCoordinator::new(ConverterConfig::default(), provider)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[tokio::test]
    async fn test_seeded_defaults() {
        let coord = coordinator(mock());

        assert_eq!(coord.base_currency(), Currency::usd());
        assert_eq!(coord.target_currency(), Currency::eur());
        assert_eq!(coord.base_amount(), 1.0);
        assert_eq!(coord.target_amount(), 0.0);
        assert_eq!(coord.active_panel(), Panel::Base);
        assert!(coord.rate().is_none());
        assert!(!coord.is_fetching());
    }

    #[tokio::test]
    async fn test_apply_without_rate_leaves_derived_amount() {
        let coord = coordinator(mock());
        coord.apply_calculator_result(42.0);

        assert_eq!(coord.base_amount(), 42.0);
        assert_eq!(coord.target_amount(), 0.0);
    }

    #[tokio::test]
    async fn test_refresh_then_apply_on_base() {
        let coord = coordinator(mock());
        coord.refresh_rate();
        coord.settled().await;

        assert!(close(coord.target_amount(), 0.85));

        coord.apply_calculator_result(200.0);
        assert!(close(coord.target_amount(), 170.0));
        assert!(coord.snapshot().is_consistent(1e-12));
    }

    #[tokio::test]
    async fn test_apply_on_target_derives_base() {
        let coord = coordinator(mock());
        coord.refresh_rate();
        coord.settled().await;

        coord.set_active_panel(Panel::Target);
        coord.apply_calculator_result(17.0);

        assert_eq!(coord.target_amount(), 17.0);
        assert!(close(coord.base_amount(), 20.0));
        assert_eq!(coord.active_amount(), 17.0);
        assert_eq!(coord.active_currency(), Currency::eur());
    }

    #[tokio::test]
    async fn test_select_currency_recomputes_target_from_base() {
        let coord = coordinator(mock());
        coord.refresh_rate();
        coord.settled().await;

        coord.set_active_panel(Panel::Target);
        coord.apply_calculator_result(85.0);
        assert!(close(coord.base_amount(), 100.0));

        coord.select_currency(Panel::Target, Currency::gbp());
        assert!(coord.is_fetching());
        coord.settled().await;

        assert_eq!(coord.target_currency(), Currency::gbp());
        assert!(close(coord.base_amount(), 100.0));
        assert!(close(coord.target_amount(), 75.0));
        assert_eq!(coord.rate().unwrap().target, Currency::gbp());
    }

    #[tokio::test]
    async fn test_same_currency_selection_uses_unit_rate() {
        let coord = coordinator(mock());
        coord.apply_calculator_result(12.5);
        coord.select_currency(Panel::Target, Currency::usd());
        coord.settled().await;

        assert_eq!(coord.rate().unwrap().rate, 1.0);
        assert_eq!(coord.base_amount(), coord.target_amount());
    }

    #[tokio::test]
    async fn test_swap_exchanges_then_recomputes() {
        let coord = coordinator(mock());
        coord.refresh_rate();
        coord.settled().await;
        coord.apply_calculator_result(100.0);

        coord.swap_currencies();
        assert_eq!(coord.base_currency(), Currency::eur());
        assert_eq!(coord.target_currency(), Currency::usd());
        assert!(close(coord.base_amount(), 85.0));
        assert!(close(coord.target_amount(), 100.0));

        coord.settled().await;
        // EUR/USD is quoted at 1.25 by the mock.
        assert!(close(coord.target_amount(), 106.25));
        assert_eq!(coord.metrics().swaps, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_after_swap_uses_inverse_of_held_rate() {
        let provider = Arc::new(MockRateProvider::new("mock"));
        provider.set_rate(usd_eur(), 0.5);
        provider.set_rate(usd_eur().inverse(), 2.0);
        provider.set_delay(usd_eur().inverse(), Duration::from_millis(300));
        let coord = coordinator(provider);
        coord.refresh_rate();
        coord.settled().await;

        coord.swap_currencies();
        coord.apply_calculator_result(10.0);
        assert!(coord.is_fetching());
        assert_eq!(coord.base_currency(), Currency::eur());
        assert!(close(coord.base_amount(), 10.0));
        assert!(close(coord.target_amount(), 20.0));

        coord.settled().await;
        assert!(close(coord.target_amount(), 20.0));
        assert!(coord.snapshot().is_consistent(1e-12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_swap_restores_tuple() {
        let provider = mock();
        provider.set_delay(usd_eur(), Duration::from_millis(100));
        provider.set_delay(usd_eur().inverse(), Duration::from_millis(100));
        let coord = coordinator(provider);
        coord.apply_calculator_result(3.0);

        let before = coord.conversion();
        coord.swap_currencies();
        coord.swap_currencies();
        let after = coord.conversion();

        assert_eq!(before.base_currency, after.base_currency);
        assert_eq!(before.target_currency, after.target_currency);
        assert_eq!(before.base_amount, after.base_amount);
        assert_eq!(before.target_amount, after.target_amount);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_fetch_is_discarded() {
        let provider = mock();
        let gbp = CurrencyPair::new(Currency::usd(), Currency::gbp());
        let jpy = CurrencyPair::new(Currency::usd(), Currency::jpy());
        provider.set_delay(gbp, Duration::from_millis(500));
        provider.set_delay(jpy, Duration::from_millis(50));

        let coord = coordinator(provider);
        coord.apply_calculator_result(2.0);
        coord.select_currency(Panel::Target, Currency::gbp());
        coord.select_currency(Panel::Target, Currency::jpy());

        coord.settled().await;
        assert_eq!(coord.rate().unwrap().target, Currency::jpy());
        assert!(close(coord.target_amount(), 220.0));

        // Let the slow GBP fetch resolve; it must not overwrite JPY.
        tokio::time::sleep(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;

        assert_eq!(coord.rate().unwrap().target, Currency::jpy());
        assert!(close(coord.target_amount(), 220.0));
        let metrics = coord.metrics();
        assert_eq!(metrics.fetches_issued, 2);
        assert_eq!(metrics.fetches_applied, 1);
        assert_eq!(metrics.fetches_discarded, 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_rate() {
        let provider = mock();
        let coord = coordinator(provider.clone());
        coord.refresh_rate();
        coord.settled().await;
        coord.apply_calculator_result(10.0);

        provider.fail_pair(usd_eur(), "feed down");
        coord.refresh_rate();
        coord.settled().await;

        assert!(coord.is_stale());
        assert!(matches!(coord.last_error(), Some(FxError::ProviderError(_))));
        assert_eq!(coord.rate().unwrap().rate, 0.85);
        assert_eq!(coord.base_amount(), 10.0);
        assert!(close(coord.target_amount(), 8.5));

        provider.heal_pair(&usd_eur());
        coord.refresh_rate();
        coord.settled().await;
        assert!(!coord.is_stale());
        assert!(coord.last_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout_marks_stale() {
        let provider = mock();
        provider.set_delay(usd_eur(), Duration::from_secs(30));
        let config = ConverterConfig {
            fetch_timeout: Duration::from_millis(250),
            ..Default::default()
        };
        let coord = ConversionCoordinator::new(config, provider);

        coord.refresh_rate();
        coord.settled().await;

        assert!(coord.is_stale());
        assert!(matches!(
            coord.last_error(),
            Some(FxError::Timeout { timeout_ms: 250, .. })
        ));
        assert!(coord.rate().is_none());
        assert_eq!(coord.metrics().fetches_failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_amounts_use_prior_rate_while_fetching() {
        let provider = mock();
        let gbp = CurrencyPair::new(Currency::usd(), Currency::gbp());
        provider.set_delay(gbp, Duration::from_millis(300));
        let coord = coordinator(provider);
        coord.refresh_rate();
        coord.settled().await;

        coord.select_currency(Panel::Target, Currency::gbp());
        coord.apply_calculator_result(10.0);
        assert!(coord.is_fetching());
        assert!(close(coord.target_amount(), 8.5));

        coord.settled().await;
        assert!(close(coord.target_amount(), 7.5));
    }

    #[tokio::test]
    async fn test_amount_changes_never_touch_currencies() {
        let coord = coordinator(mock());
        coord.refresh_rate();
        coord.settled().await;

        for amount in [0.0, 1.5, -3.0, 1e6] {
            coord.apply_calculator_result(amount);
            assert_eq!(coord.base_currency(), Currency::usd());
            assert_eq!(coord.target_currency(), Currency::eur());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_currency_change_does_not_set_amounts_directly() {
        let provider = mock();
        let gbp = CurrencyPair::new(Currency::usd(), Currency::gbp());
        provider.set_delay(gbp, Duration::from_millis(100));
        let coord = coordinator(provider);
        coord.apply_calculator_result(4.0);

        coord.select_currency(Panel::Target, Currency::gbp());
        assert_eq!(coord.base_amount(), 4.0);
        assert_eq!(coord.target_amount(), 0.0);
    }
}
