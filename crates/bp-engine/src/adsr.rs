//! ADSR envelope with a releasable tail.
//!
//! The attack/decay/sustain stages form the main chain. The release stage is
//! a detached run in the same arena, authored starting at time 0. Releasing
//! moves that run to the release time and reads the envelope through a
//! `MergedView`; resetting restores the run from its template, so repeated
//! trigger/reset cycles never accumulate rounding error.

use alloc::vec::Vec;

use bp_ir::{Breakpoint, BreakpointChain, InterpKind, NodeKey};

use crate::cursor::{Cursor, SeekStep};
use crate::envelope::{checked_breakpoint, Bounds, EditError, Envelope};
use crate::sample::sample_view;
use crate::view::{MergedView, Splice};

/// Shortest stage duration, in seconds.
pub const MIN_STAGE_DURATION: f64 = 1e-3;

/// Lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdsrStage {
    /// Not released: attack, decay, then sustain held indefinitely.
    #[default]
    Idle,
    /// The release run has been joined at `release_offset`.
    Released,
}

/// Attack, decay, sustain and release settings after clamping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdsrParams {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl AdsrParams {
    fn clamped(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack: stage_duration("attack", attack),
            decay: stage_duration("decay", decay),
            sustain: sustain_level(sustain),
            release: stage_duration("release", release),
        }
    }
}

fn stage_duration(stage: &str, duration: f64) -> f64 {
    if duration >= MIN_STAGE_DURATION {
        return duration;
    }
    log::warn!("{stage} duration {duration} raised to {MIN_STAGE_DURATION}");
    MIN_STAGE_DURATION
}

fn sustain_level(level: f64) -> f64 {
    if (0.0..=1.0).contains(&level) {
        return level;
    }
    let clamped = if level > 1.0 { 1.0 } else { 0.0 };
    log::warn!("sustain level {level} clamped to {clamped}");
    clamped
}

/// An ADSR envelope.
#[derive(Clone, Debug)]
pub struct AdsrEnvelope {
    env: Envelope,
    params: AdsrParams,
    sustain_key: NodeKey,
    release_head: NodeKey,
    release_keys: Vec<NodeKey>,
    release_template: Vec<Breakpoint>,
    splice: Option<Splice>,
    release_offset: f64,
}

impl AdsrEnvelope {
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        let params = AdsrParams::clamped(attack, decay, sustain, release);
        let AdsrParams { attack: a, decay: d, sustain: s, release: r } = params;

        let mut chain = BreakpointChain::from_breakpoints([
            Breakpoint::with_params(0.0, 0.0, InterpKind::CubicBezier, &[0.3 * a, 0.6, 0.6 * a, 0.95]),
            Breakpoint::new(a, 1.0, InterpKind::Exponential),
            Breakpoint::new(a + d, s, InterpKind::NearestNeighbour),
        ]);
        let sustain_key = chain.last().unwrap_or_default();

        let release_template = alloc::vec![
            Breakpoint::with_params(0.0, s, InterpKind::CubicBezier, &[0.25 * r, 0.3 * s, 0.6 * r, 0.05 * s]),
            Breakpoint::new(r, 0.0, InterpKind::Linear),
        ];
        let release_head = chain.push_detached(release_template.iter().cloned()).unwrap_or_default();
        let release_keys = chain.iter_from(release_head).map(|(key, _)| key).collect();

        let mut env = Envelope::from_chain(chain);
        env.bounds = Bounds { min_time: 0.0, max_time: a + d + r, min_value: 0.0, max_value: 1.0 };

        Self {
            env,
            params,
            sustain_key,
            release_head,
            release_keys,
            release_template,
            splice: None,
            release_offset: 0.0,
        }
    }

    pub fn params(&self) -> AdsrParams {
        self.params
    }

    pub fn stage(&self) -> AdsrStage {
        if self.splice.is_some() { AdsrStage::Released } else { AdsrStage::Idle }
    }

    pub fn is_released(&self) -> bool {
        self.splice.is_some()
    }

    /// Time the release run was joined at (0 while idle).
    pub fn release_offset(&self) -> f64 {
        self.release_offset
    }

    /// The attack/decay/sustain chain.
    pub fn chain(&self) -> &BreakpointChain {
        &self.env.chain
    }

    /// Release breakpoints at their current (possibly shifted) times.
    pub fn release_breakpoints(&self) -> impl Iterator<Item = &Breakpoint> + '_ {
        self.env.chain.iter_from(self.release_head).map(|(_, bp)| bp)
    }

    pub fn bounds(&self) -> &Bounds {
        &self.env.bounds
    }

    /// Join the release stage at `time`.
    pub fn release(&mut self, time: f64) {
        let time = if time >= 0.0 {
            time
        } else {
            log::warn!("release time {time} clamped to 0");
            0.0
        };
        self.place_release(time);
        self.release_offset = time;
        self.splice = Splice::locate(&self.env.chain, self.release_head);
        self.env.cursor = Cursor::at(Some(self.release_head), time);
        log::debug!("adsr released at t={time}");
    }

    /// Return to the idle state with the release run back at time 0.
    pub fn reset(&mut self) {
        self.place_release(0.0);
        self.release_offset = 0.0;
        self.splice = None;
        self.env.cursor = Cursor::at(self.env.chain.first(), 0.0);
    }

    fn place_release(&mut self, offset: f64) {
        for (&key, template) in self.release_keys.iter().zip(&self.release_template) {
            if let Some(bp) = self.env.chain.get_mut(key) {
                *bp = template.clone();
                if offset != 0.0 {
                    bp.shift_time(offset);
                }
            }
        }
    }

    /// Move the cursor to `time`.
    pub fn set_time(&mut self, time: f64) -> SeekStep {
        let env = &mut self.env;
        match self.splice {
            Some(splice) => env.cursor.set_time(&MergedView::new(&env.chain, splice), time),
            None => env.cursor.set_time(&env.chain, time),
        }
    }

    pub fn current_value(&self) -> f64 {
        let env = &self.env;
        match self.splice {
            Some(splice) => env.cursor.value(&MergedView::new(&env.chain, splice)),
            None => env.cursor.value(&env.chain),
        }
    }

    pub fn value_at(&mut self, time: f64) -> f64 {
        self.set_time(time);
        self.current_value()
    }

    pub fn time_now(&self) -> f64 {
        self.env.cursor.time_now()
    }

    /// Insert into the attack/decay/sustain chain.
    pub fn insert_breakpoint(
        &mut self,
        time: f64,
        value: f64,
        kind: InterpKind,
        params: &[f64],
    ) -> Result<NodeKey, EditError> {
        let key = self.env.insert(checked_breakpoint(time, value, kind, params)?);
        if self.splice.is_some() {
            self.splice = Splice::locate(&self.env.chain, self.release_head);
        }
        Ok(key)
    }

    /// Sample for display without touching the live cursor. While idle the
    /// preview is released at the end of the decay stage.
    pub fn sample_curve(&self, width: usize, height: f64) -> Vec<f64> {
        let bounds = self.env.bounds;
        match self.splice {
            Some(splice) => {
                let mut bounds = bounds;
                bounds.max_time = bounds.max_time.max(self.release_end());
                sample_view(&MergedView::new(&self.env.chain, splice), &bounds, width, height)
            }
            None => {
                let mut preview = self.clone();
                let at = self.env.chain.get(self.sustain_key).map_or(0.0, |bp| bp.time);
                preview.release(at);
                preview.sample_curve(width, height)
            }
        }
    }

    fn release_end(&self) -> f64 {
        self.release_breakpoints().last().map_or(0.0, |bp| bp.time)
    }
}
