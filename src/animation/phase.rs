use std::{borrow::Cow, ops::Range};

use crate::{
    animation::ease::Ease,
    foundation::error::{RaffleError, RaffleResult},
};

/// Largest phase table accepted by [`PhaseTable::new`].
pub const MAX_PHASES: usize = 8;

/// One named sub-interval of overall progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phase {
    /// Stable phase name (e.g. `"acceleration"`).
    pub name: &'static str,
    /// Cumulative progress threshold at which this phase ends, in `(0,1]`.
    pub end: f64,
    /// Easing applied to the phase-local progress.
    pub ease: Ease,
}

impl Phase {
    /// Convenience constructor usable in `const` tables.
    pub const fn new(name: &'static str, end: f64, ease: Ease) -> Self {
        Self { name, end, ease }
    }
}

/// Result of locating a progress value inside a [`PhaseTable`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSample {
    /// Index of the active phase.
    pub index: usize,
    /// Name of the active phase.
    pub name: &'static str,
    /// Phase start threshold.
    pub start: f64,
    /// Phase end threshold.
    pub end: f64,
    /// Progress renormalized into the phase span, `[0,1]`.
    pub local: f64,
    /// `local` passed through the phase easing.
    pub local_eased: f64,
    /// Completed spans plus the eased contribution of the active phase.
    pub global_eased: f64,
}

/// Ordered mapping from cumulative progress thresholds to named phases.
///
/// Thresholds are strictly increasing in `(0,1]` and the last one is exactly `1`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseTable {
    phases: Cow<'static, [Phase]>,
}

impl PhaseTable {
    /// Build a validated table.
    pub fn new(phases: Vec<Phase>) -> RaffleResult<Self> {
        Self::validate(&phases)?;
        Ok(Self {
            phases: Cow::Owned(phases),
        })
    }

    /// Wrap a static table. Validity is checked when an engine initializes with it.
    pub const fn from_static(phases: &'static [Phase]) -> Self {
        Self {
            phases: Cow::Borrowed(phases),
        }
    }

    /// Check the threshold invariants of `phases`.
    pub fn validate(phases: &[Phase]) -> RaffleResult<()> {
        if phases.is_empty() {
            return Err(RaffleError::config("phase table must not be empty"));
        }
        if phases.len() > MAX_PHASES {
            return Err(RaffleError::config(format!(
                "phase table has {} phases, at most {MAX_PHASES} are allowed",
                phases.len()
            )));
        }
        let mut prev = 0.0;
        for p in phases {
            if !(p.end > prev && p.end <= 1.0) {
                return Err(RaffleError::config(format!(
                    "phase '{}' threshold {} must be in ({prev}, 1]",
                    p.name, p.end
                )));
            }
            prev = p.end;
        }
        if prev != 1.0 {
            return Err(RaffleError::config("last phase threshold must be exactly 1"));
        }
        Ok(())
    }

    /// Declared phases.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Number of phases.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether the table has no phases.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Start threshold of the phase named `name`.
    pub fn start_of(&self, name: &str) -> Option<f64> {
        let idx = self.phases.iter().position(|p| p.name == name)?;
        Some(self.start_at(idx))
    }

    fn start_at(&self, index: usize) -> f64 {
        if index == 0 {
            0.0
        } else {
            self.phases[index - 1].end
        }
    }

    /// Index of the first phase whose threshold is `>= progress`.
    pub fn index_for(&self, progress: f64) -> usize {
        let p = progress.clamp(0.0, 1.0);
        self.phases
            .iter()
            .position(|ph| ph.end >= p)
            .unwrap_or(self.phases.len().saturating_sub(1))
    }

    /// Locate `progress` and compute local and global eased progress.
    ///
    /// `global_eased` at a phase boundary equals the boundary threshold, whatever the easing of the
    /// neighbouring phases.
    pub fn sample(&self, progress: f64) -> PhaseSample {
        let p = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        let index = self.index_for(p);
        let Some(phase) = self.phases.get(index) else {
            return PhaseSample {
                index: 0,
                name: "",
                start: 0.0,
                end: 1.0,
                local: p,
                local_eased: p,
                global_eased: p,
            };
        };
        let start = self.start_at(index);
        let span = phase.end - start;
        let local = if span > 0.0 {
            ((p - start) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let local_eased = phase.ease.apply(local);
        let global_eased = start * (1.0 - local_eased) + phase.end * local_eased;
        PhaseSample {
            index,
            name: phase.name,
            start,
            end: phase.end,
            local,
            local_eased,
            global_eased,
        }
    }
}

/// Detects phase transitions between consecutive frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTracker {
    current: Option<usize>,
}

impl PhaseTracker {
    /// Record `index` and return the phases entered since the previous frame.
    ///
    /// A frame that skips over whole phases still reports them, so one-shot effects keyed to a
    /// phase fire even when the host stalls. Moving backwards enters nothing.
    pub fn advance(&mut self, index: usize) -> Range<usize> {
        let from = self.current.map_or(0, |prev| prev + 1);
        self.current = Some(index);
        from..(index + 1).max(from)
    }

    /// Phase index seen on the last frame.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Forget the last phase.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/phase.rs"]
mod tests;
