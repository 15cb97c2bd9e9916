use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::PriceBar;

/// Market scenario types for synthetic bar generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketScenario {
    /// Independent returns (no memory)
    RandomWalk,
    /// Persistent returns (strong positive autocorrelation)
    Trending,
    /// Anti-persistent returns (strong negative autocorrelation)
    MeanReverting,
    /// Oscillation around a fixed level with small noise
    Sideways,
    /// Alternating calm and burst stretches with large swings
    Volatile,
    /// Sideways series with missing bars
    WithGaps,
}

impl std::str::FromStr for MarketScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random-walk" | "randomwalk" => Ok(Self::RandomWalk),
            "trending" => Ok(Self::Trending),
            "mean-reverting" | "meanreverting" => Ok(Self::MeanReverting),
            "sideways" => Ok(Self::Sideways),
            "volatile" => Ok(Self::Volatile),
            "with-gaps" | "gaps" => Ok(Self::WithGaps),
            other => Err(format!("unknown scenario: {}", other)),
        }
    }
}

/// Generates seeded synthetic price bars for tests and the demo binary
///
/// Timestamps are anchored to a fixed epoch so identical seeds reproduce
/// identical windows.
pub struct SyntheticDataGenerator {
    rng: StdRng,
    base_price: f64,
    base_volume: f64,
}

impl SyntheticDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 150.0,
            base_volume: 1_000_000.0,
        }
    }

    /// Generate `num_bars` bars spaced `interval_minutes` apart
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_bars: usize,
        interval_minutes: i64,
    ) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        match scenario {
            MarketScenario::RandomWalk => self.generate_ar1(start, num_bars, interval_minutes, 0.0, 0.01),
            MarketScenario::Trending => {
                self.generate_ar1(start, num_bars, interval_minutes, 0.95, 0.004)
            }
            MarketScenario::MeanReverting => {
                self.generate_ar1(start, num_bars, interval_minutes, -0.7, 0.01)
            }
            MarketScenario::Sideways => self.generate_sideways(start, num_bars, interval_minutes),
            MarketScenario::Volatile => self.generate_volatile(start, num_bars, interval_minutes),
            MarketScenario::WithGaps => self.generate_with_gaps(start, num_bars, interval_minutes),
        }
    }

    /// AR(1) return process: r_t = phi * r_(t-1) + noise
    ///
    /// phi = 0 is a plain random walk, positive phi persistent (trending),
    /// negative phi anti-persistent (mean reverting).
    fn generate_ar1(
        &mut self,
        start: DateTime<Utc>,
        num_bars: usize,
        interval_minutes: i64,
        phi: f64,
        noise: f64,
    ) -> Vec<PriceBar> {
        let mut bars = Vec::with_capacity(num_bars);
        let mut price = self.base_price;
        let mut ret = 0.0;

        for i in 0..num_bars {
            ret = phi * ret + self.rng.gen_range(-noise..noise);
            let prev = price;
            price *= (1.0 + ret).max(0.01);

            bars.push(self.bar(start + Duration::minutes(i as i64 * interval_minutes), prev, price));
        }

        bars
    }

    fn generate_sideways(
        &mut self,
        start: DateTime<Utc>,
        num_bars: usize,
        interval_minutes: i64,
    ) -> Vec<PriceBar> {
        let mut bars = Vec::with_capacity(num_bars);
        let mut prev = self.base_price;

        for i in 0..num_bars {
            let price = self.base_price * (1.0 + self.rng.gen_range(-0.01..0.01));
            bars.push(self.bar(start + Duration::minutes(i as i64 * interval_minutes), prev, price));
            prev = price;
        }

        bars
    }

    fn generate_volatile(
        &mut self,
        start: DateTime<Utc>,
        num_bars: usize,
        interval_minutes: i64,
    ) -> Vec<PriceBar> {
        let mut bars = Vec::with_capacity(num_bars);
        let mut price = self.base_price;

        for i in 0..num_bars {
            // Calm stretches punctuated by bursts every 20 bars
            let amplitude = if (i / 20) % 2 == 0 { 0.005 } else { 0.05 };
            let prev = price;
            price *= 1.0 + self.rng.gen_range(-amplitude..amplitude);

            bars.push(self.bar(start + Duration::minutes(i as i64 * interval_minutes), prev, price));
        }

        bars
    }

    fn generate_with_gaps(
        &mut self,
        start: DateTime<Utc>,
        num_bars: usize,
        interval_minutes: i64,
    ) -> Vec<PriceBar> {
        let mut bars = Vec::with_capacity(num_bars);
        let mut prev = self.base_price;
        let mut slot = 0i64;

        for _ in 0..num_bars {
            // Drop roughly one bar in ten by skipping its time slot
            if self.rng.gen_range(0..10) == 0 {
                slot += 1;
            }

            let price = self.base_price * (1.0 + self.rng.gen_range(-0.01..0.01));
            bars.push(self.bar(start + Duration::minutes(slot * interval_minutes), prev, price));
            prev = price;
            slot += 1;
        }

        bars
    }

    fn bar(&mut self, timestamp: DateTime<Utc>, open: f64, close: f64) -> PriceBar {
        let wick = self.rng.gen_range(0.0..0.005);
        let high = open.max(close) * (1.0 + wick);
        let low = open.min(close) * (1.0 - wick);
        let volume = self.base_volume * self.rng.gen_range(0.5..1.5);

        PriceBar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}
