use derive_more::{Constructor, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Value Object - price of a bar
#[derive(Debug, Clone, Copy, PartialEq, From, Into, Deref, Constructor, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, From, Into, Deref, Constructor, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f64);

impl Volume {
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Value Object - epoch seconds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Deref, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub fn secs(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Seconds elapsed since 00:00 UTC of the same day.
    pub fn utc_seconds_of_day(&self) -> i64 {
        self.0.rem_euclid(86_400)
    }

    pub fn abs_diff(&self, other: Timestamp) -> i64 {
        (self.0 - other.0).abs()
    }
}

/// Value Object - spacing between consecutive bars, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{}s", _0)]
#[serde(transparent)]
pub struct Resolution(u32);

impl Resolution {
    pub const ONE_SECOND: Resolution = Resolution(1);

    pub fn new(seconds: i64) -> Option<Self> {
        u32::try_from(seconds).ok().filter(|s| *s > 0).map(Self)
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0)
    }

    /// Durations are labelled in seconds below one minute, in minutes otherwise.
    pub fn is_sub_minute(&self) -> bool {
        self.0 < 60
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::ONE_SECOND
    }
}
