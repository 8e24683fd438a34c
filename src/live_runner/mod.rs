//! Stateful per-area live/paper/replay runner (§4.K).
//!
//! The strategy adapter, feature provider, and matching engine are
//! external collaborators (§1, §9) — this module defines the seam traits
//! they plug into and owns only the tick cycle and the on-disk state
//! file. Sensible no-op implementations stand in for the real adapters so
//! the cycle runs end-to-end without them.

use crate::models::{MarketCandle, OrderFlowTick};
use crate::persistence::{candles, ticks};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::path::PathBuf;

const CANDLE_LOOKBACK: i64 = 100;
const TICK_LOOKBACK: Duration = Duration::hours(1);

/// Mode is a tag only; the spec defines matching semantics for REPLAY and
/// PAPER only, LIVE routes orders externally and does no internal
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerMode {
    Replay,
    Paper,
    Live,
}

/// Accumulated execution-quality stats, carried alongside the state file
/// for forensics consumers outside this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerStats {
    pub slippage: Decimal,
    pub fees: Decimal,
}

/// On-disk runner state (§6): `cash`/`position` as decimal-as-string
/// (via `rust_decimal`'s serde feature), `orders` the active order id
/// list, `stats` the slippage/fee accumulator, `_updated_at` ISO-8601.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveRunnerState {
    pub area: String,
    pub mode: RunnerMode,
    pub cash: Decimal,
    pub position: Decimal,
    pub orders: Vec<String>,
    pub stats: RunnerStats,
    #[serde(rename = "_updated_at")]
    pub updated_at: DateTime<Utc>,
}

impl LiveRunnerState {
    fn cold_start(area: &str) -> Self {
        Self {
            area: area.to_string(),
            mode: RunnerMode::Paper,
            cash: Decimal::ZERO,
            position: Decimal::ZERO,
            orders: Vec::new(),
            stats: RunnerStats::default(),
            updated_at: Utc::now(),
        }
    }
}

/// Derived feature set handed to the strategy adapter alongside the
/// latest candle. A real feature provider would compute these from the
/// candle series; the built-in one returns zeros.
#[derive(Debug, Clone, Default)]
pub struct CandleFeatures {
    pub rsi_14: Option<f64>,
}

/// Intents the strategy adapter produces for a candle step. Carried, not
/// executed, by this crate — actual routing/matching lives with the
/// external engine matcher.
#[derive(Debug, Clone)]
pub struct StrategyIntent {
    pub side: crate::core_types::Side,
    pub quantity: Decimal,
}

#[async_trait]
pub trait FeatureProvider: Send + Sync {
    async fn features_for(&self, candles: &[MarketCandle]) -> CandleFeatures;
}

#[async_trait]
pub trait StrategyAdapter: Send + Sync {
    async fn on_candle(&mut self, latest: &MarketCandle, features: &CandleFeatures) -> Vec<StrategyIntent>;
}

#[async_trait]
pub trait EngineMatcher: Send + Sync {
    async fn apply_ticks(&mut self, state: &mut LiveRunnerState, ticks: &[OrderFlowTick]);
}

/// Feature provider that returns no features — a placeholder for an
/// external provider that was never wired in.
pub struct NoopFeatureProvider;

#[async_trait]
impl FeatureProvider for NoopFeatureProvider {
    async fn features_for(&self, _candles: &[MarketCandle]) -> CandleFeatures {
        CandleFeatures::default()
    }
}

/// Strategy adapter that never trades — a placeholder for an external
/// strategy.
pub struct NoopStrategyAdapter;

#[async_trait]
impl StrategyAdapter for NoopStrategyAdapter {
    async fn on_candle(&mut self, _latest: &MarketCandle, _features: &CandleFeatures) -> Vec<StrategyIntent> {
        Vec::new()
    }
}

/// Matcher that records tick throughput but never fills an order — a
/// placeholder for REPLAY/PAPER matching against live ticks.
pub struct NoopEngineMatcher;

#[async_trait]
impl EngineMatcher for NoopEngineMatcher {
    async fn apply_ticks(&mut self, _state: &mut LiveRunnerState, _ticks: &[OrderFlowTick]) {}
}

pub struct LiveRunner {
    area: String,
    state_dir: String,
    state: Option<LiveRunnerState>,
    feature_provider: Box<dyn FeatureProvider>,
    strategy: Box<dyn StrategyAdapter>,
    matcher: Box<dyn EngineMatcher>,
}

impl LiveRunner {
    pub fn new(area: String, state_dir: String) -> Self {
        Self {
            area,
            state_dir,
            state: None,
            feature_provider: Box::new(NoopFeatureProvider),
            strategy: Box::new(NoopStrategyAdapter),
            matcher: Box::new(NoopEngineMatcher),
        }
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    fn state_path(&self) -> PathBuf {
        std::path::Path::new(&self.state_dir).join(format!("{}.json", self.area))
    }

    fn load_or_init_state(&self) -> LiveRunnerState {
        let path = self.state_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(area = %self.area, error = %e, "corrupt live-runner state file, resetting");
                LiveRunnerState::cold_start(&self.area)
            }),
            Err(_) => LiveRunnerState::cold_start(&self.area),
        }
    }

    fn persist_state(&self, state: &LiveRunnerState) -> anyhow::Result<()> {
        let path = self.state_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(state)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// One runner cycle: load state, strategy step against the latest
    /// candles, execution step against recent ticks, persist state.
    pub async fn tick(&mut self, pool: &PgPool) -> anyhow::Result<()> {
        let mut state = self.state.take().unwrap_or_else(|| self.load_or_init_state());

        let recent_candles = candles::latest_candles_for_area(pool, &self.area, CANDLE_LOOKBACK)
            .await
            .unwrap_or_default();

        if let Some(latest) = recent_candles.first() {
            let features = self.feature_provider.features_for(&recent_candles).await;
            let intents = self.strategy.on_candle(latest, &features).await;
            tracing::debug!(area = %self.area, intents = intents.len(), "strategy step produced intents");
        }

        let now = Utc::now();
        let recent_ticks = self
            .recent_ticks(pool, now - TICK_LOOKBACK, now)
            .await
            .unwrap_or_default();
        self.matcher.apply_ticks(&mut state, &recent_ticks).await;

        state.updated_at = now;
        self.persist_state(&state)?;
        self.state = Some(state);
        Ok(())
    }

    async fn recent_ticks(
        &self,
        pool: &PgPool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<OrderFlowTick>, sqlx::Error> {
        ticks::read_ticks_in_window_for_area(pool, &self.area, from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_start_state_has_zeroed_book() {
        let state = LiveRunnerState::cold_start("SE3");
        assert_eq!(state.cash, Decimal::ZERO);
        assert_eq!(state.position, Decimal::ZERO);
        assert!(state.orders.is_empty());
    }

    #[test]
    fn state_round_trips_through_json_with_underscore_updated_at() {
        let state = LiveRunnerState::cold_start("SE3");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"_updated_at\""));
        let parsed: LiveRunnerState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.area, "SE3");
    }

    #[test]
    fn persist_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let runner = LiveRunner::new("SE3".to_string(), dir.path().to_string_lossy().to_string());
        let mut state = LiveRunnerState::cold_start("SE3");
        state.cash = Decimal::from(100);
        runner.persist_state(&state).unwrap();

        let loaded = runner.load_or_init_state();
        assert_eq!(loaded.cash, Decimal::from(100));
    }
}
