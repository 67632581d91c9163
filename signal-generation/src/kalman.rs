//! Kalman filter for a dynamic intercept / hedge ratio pair.
//!
//! Tracks `y[t] = alpha[t] + beta[t] * x[t] + v` where both coefficients follow a
//! random walk:
//!
//! ```text
//! state:        [alpha, beta][t] = [alpha, beta][t-1] + w,   w ~ N(0, Q)
//! observation:  y[t] = H[t] · [alpha, beta][t] + v,           v ~ N(0, R),  H[t] = [1, x[t]]
//! ```
//!
//! The state is a plain `Copy` value threaded through [`FilterState::update`]:
//! the previous state goes in, the next state and the estimate come out. Two
//! independent runs can never share a state by accident, and a run can be
//! replayed from any intermediate snapshot.
//!
//! ```rust
//! use common::FilterConfig;
//! use signal_generation::FilterState;
//!
//! let state = FilterState::initialize(&FilterConfig::default());
//! let (state, estimate) = state.update(171.2, 58.4);
//! assert!(estimate.beta.is_finite());
//! assert_eq!(state.steps(), 1);
//! ```

use common::{FilterConfig, PricePair};
use serde::{Deserialize, Serialize};

type Matrix2 = [[f64; 2]; 2];

/// Intercept and slope after one filter step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeEstimate {
    pub alpha: f64,
    pub beta: f64,
}

impl HedgeEstimate {
    /// Fair value of the target implied by the reference price
    pub fn fair_value(&self, reference_price: f64) -> f64 {
        self.alpha + self.beta * reference_price
    }
}

/// Latent state `x = [alpha, beta]`, its covariance `P` and the fixed noise terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    x: [f64; 2],
    p: Matrix2,
    /// Q = process_noise · I
    process_noise: f64,
    /// R
    observation_noise: f64,
    steps: u64,
    last_innovation: f64,
    last_innovation_variance: f64,
}

impl FilterState {
    /// Uninformative prior: `x = [0, 0]`, `P = initial_covariance · I`
    pub fn initialize(config: &FilterConfig) -> Self {
        Self {
            x: [0.0, 0.0],
            p: [
                [config.initial_covariance, 0.0],
                [0.0, config.initial_covariance],
            ],
            process_noise: config.process_noise,
            observation_noise: config.observation_noise,
            steps: 0,
            last_innovation: 0.0,
            last_innovation_variance: 0.0,
        }
    }

    /// Consume one observation pair and return the next state with its estimate.
    ///
    /// Must be called in chronological order. Prices are assumed finite;
    /// `PricePair` guarantees this for batch runs.
    #[must_use]
    pub fn update(self, price_y: f64, price_x: f64) -> (Self, HedgeEstimate) {
        debug_assert!(price_y.is_finite() && price_x.is_finite());

        // Predict: random walk leaves x alone, P grows by Q
        let mut p = self.p;
        p[0][0] += self.process_noise;
        p[1][1] += self.process_noise;

        let h = [1.0, price_x];

        let innovation = price_y - (h[0] * self.x[0] + h[1] * self.x[1]);

        // P·Hᵗ
        let ph = [
            p[0][0] * h[0] + p[0][1] * h[1],
            p[1][0] * h[0] + p[1][1] * h[1],
        ];

        // S = H·P·Hᵗ + R, strictly positive because R > 0
        let s = h[0] * ph[0] + h[1] * ph[1] + self.observation_noise;

        let k = [ph[0] / s, ph[1] / s];

        let x = [self.x[0] + k[0] * innovation, self.x[1] + k[1] * innovation];

        // P ← (I − K·H)·P, left unsymmetrized
        let hp = [
            h[0] * p[0][0] + h[1] * p[1][0],
            h[0] * p[0][1] + h[1] * p[1][1],
        ];
        let p = [
            [p[0][0] - k[0] * hp[0], p[0][1] - k[0] * hp[1]],
            [p[1][0] - k[1] * hp[0], p[1][1] - k[1] * hp[1]],
        ];

        let next = Self {
            x,
            p,
            process_noise: self.process_noise,
            observation_noise: self.observation_noise,
            steps: self.steps + 1,
            last_innovation: innovation,
            last_innovation_variance: s,
        };

        (next, next.estimate())
    }

    /// Current `(alpha, beta)`
    pub fn estimate(&self) -> HedgeEstimate {
        HedgeEstimate {
            alpha: self.x[0],
            beta: self.x[1],
        }
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.x[0]
    }

    #[inline]
    pub fn beta(&self) -> f64 {
        self.x[1]
    }

    /// State covariance `P`
    #[inline]
    pub fn covariance(&self) -> Matrix2 {
        self.p
    }

    /// `|P01 − P10|`; the update does not force symmetry
    pub fn covariance_asymmetry(&self) -> f64 {
        (self.p[0][1] - self.p[1][0]).abs()
    }

    /// Innovation (pre-update residual) of the most recent step
    #[inline]
    pub fn last_innovation(&self) -> f64 {
        self.last_innovation
    }

    /// Innovation variance `S` of the most recent step
    #[inline]
    pub fn last_innovation_variance(&self) -> f64 {
        self.last_innovation_variance
    }

    /// Number of observations consumed
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// Run the filter over a whole pair, one estimate per trading day
pub fn estimate_hedge_ratios(pair: &PricePair, config: &FilterConfig) -> Vec<HedgeEstimate> {
    let mut state = FilterState::initialize(config);
    pair.observations()
        .map(|(_, y, x)| {
            let (next, estimate) = state.update(y, x);
            state = next;
            estimate
        })
        .collect()
}
