//! Numeric ranges with an arbitrary non-zero step.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::contract::{Producer, Resumable};
use crate::error::{Error, Result};

/// Half-open arithmetic progression `start, start+step, ..` bounded by `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeSpec {
    start: i64,
    stop: i64,
    step: i64,
}

impl RangeSpec {
    pub fn new(start: i64, stop: i64, step: i64) -> Result<Self> {
        if step == 0 {
            return Err(Error::InvalidArgument("range step must not be zero".into()));
        }
        Ok(Self { start, stop, step })
    }

    /// `0..stop` with step 1.
    pub fn up_to(stop: i64) -> Self {
        Self {
            start: 0,
            stop,
            step: 1,
        }
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn stop(&self) -> i64 {
        self.stop
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    fn admits(&self, value: i64) -> bool {
        if self.step > 0 {
            value < self.stop
        } else {
            value > self.stop
        }
    }
}

impl From<Range<i64>> for RangeSpec {
    fn from(r: Range<i64>) -> Self {
        Self {
            start: r.start,
            stop: r.end,
            step: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RangeProducer {
    spec: RangeSpec,
    /// `None` once the progression stepped past `i64` bounds.
    current: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeState {
    pub spec: RangeSpec,
    pub current: Option<i64>,
}

impl RangeProducer {
    pub fn new(spec: RangeSpec) -> Self {
        Self {
            spec,
            current: Some(spec.start),
        }
    }

    pub fn spec(&self) -> RangeSpec {
        self.spec
    }

    /// Whether every value still to come lies in `bounds`.
    pub fn remaining_within(&self, bounds: Range<i64>) -> bool {
        match self.current {
            Some(v) if self.spec.admits(v) => {
                if self.spec.step > 0 {
                    v >= bounds.start && self.spec.stop <= bounds.end
                } else {
                    v < bounds.end && self.spec.stop >= bounds.start.saturating_sub(1)
                }
            }
            _ => true,
        }
    }
}

impl Producer for RangeProducer {
    type Item = i64;

    fn next(&mut self) -> Result<Option<i64>> {
        match self.current {
            Some(v) if self.spec.admits(v) => {
                self.current = v.checked_add(self.spec.step);
                Ok(Some(v))
            }
            _ => Ok(None),
        }
    }
}

impl Resumable for RangeProducer {
    type State = RangeState;

    fn capture(&self) -> Result<RangeState> {
        Ok(RangeState {
            spec: self.spec,
            current: self.current,
        })
    }

    fn restore(state: RangeState) -> Result<Self> {
        if state.spec.step == 0 {
            return Err(Error::Restore("range step must not be zero".into()));
        }
        Ok(Self {
            spec: state.spec,
            current: state.current,
        })
    }
}
