// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Single-slot weighted reservoir.
///
/// After any sequence of `update` calls, candidate `i` is the chosen sample with
/// probability `w_i / weight_sum`. The reservoir is valid iff `sample` is set,
/// which happens as soon as one candidate with positive weight arrives.
#[derive(Debug, Clone)]
pub struct Reservoir<T> {
    sample: Option<T>,
    phat: Float,
    weight_sum: Float,
    m: u32,
}

impl<T> Default for Reservoir<T> {
    fn default() -> Self {
        Self { sample: None, phat: 0.0, weight_sum: 0.0, m: 0 }
    }
}

impl<T> Reservoir<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Streams one candidate with resampling weight `weight` and target density
    /// `phat`. `u` is a uniform number in `[0, 1)`. Candidates whose weight or
    /// target is not positive and finite are rejected and leave the reservoir
    /// untouched. Returns whether the candidate was selected.
    pub fn update(&mut self, sample: T, weight: Float, phat: Float, u: Float) -> bool {
        if !(weight > 0.0) || !weight.is_finite() || !(phat > 0.0) || !phat.is_finite() {
            return false;
        }
        let new_sum = self.weight_sum + weight;
        if !new_sum.is_finite() {
            return false;
        }
        self.weight_sum = new_sum;
        self.m += 1;
        // u * sum <= w is r <= w / sum without the division.
        if u * self.weight_sum <= weight {
            self.sample = Some(sample);
            self.phat = phat;
            true
        } else {
            false
        }
    }

    pub fn is_valid(&self) -> bool {
        self.sample.is_some()
    }

    pub fn sample(&self) -> Option<&T> {
        self.sample.as_ref()
    }

    pub fn into_sample(self) -> Option<T> {
        self.sample
    }

    pub fn phat(&self) -> Float {
        self.phat
    }

    pub fn weight_sum(&self) -> Float {
        self.weight_sum
    }

    /// Number of accepted candidates.
    pub fn candidate_count(&self) -> u32 {
        self.m
    }

    /// Unbiased contribution weight `weight_sum / phat(chosen)`, or zero when
    /// nothing was chosen.
    pub fn contribution_weight(&self) -> Float {
        if self.sample.is_none() || !(self.phat > 0.0) {
            return 0.0;
        }
        let w = self.weight_sum / self.phat;
        if w.is_finite() { w } else { 0.0 }
    }
}
