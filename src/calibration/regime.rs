use serde::{Deserialize, Serialize};

use crate::config::RegimeConfig;

/// Risk posture of the bot. Explore trades cautiously at reduced size while
/// the ensemble proves itself; Exploit trades full size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Explore,
    Exploit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeState {
    pub current: Regime,
    pub recent_win_count: u32,
}

impl Default for RegimeState {
    fn default() -> Self {
        Self {
            current: Regime::Explore,
            recent_win_count: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegimeController {
    cfg: RegimeConfig,
}

impl RegimeController {
    pub fn new(cfg: RegimeConfig) -> Self {
        Self { cfg }
    }

    pub fn window(&self) -> usize {
        self.cfg.window
    }

    /// Advance the hysteresis machine with a fresh recent-win count. The
    /// asymmetric band (exit below `exploit_exit`, enter at `exploit_enter`)
    /// keeps noise near a single threshold from flapping the regime.
    /// Returns `true` when the regime switched.
    pub fn update(&self, state: &mut RegimeState, recent_win_count: u32) -> bool {
        state.recent_win_count = recent_win_count;
        let next = match state.current {
            Regime::Explore if recent_win_count >= self.cfg.exploit_enter => Regime::Exploit,
            Regime::Exploit if recent_win_count < self.cfg.exploit_exit => Regime::Explore,
            current => current,
        };
        if next != state.current {
            tracing::info!(
                from = ?state.current,
                to = ?next,
                recent_win_count,
                "Regime switched"
            );
            state.current = next;
            true
        } else {
            false
        }
    }

    /// Apply the regime's risk factor to an intended position size. Explore
    /// scales down and rounds; Exploit passes the size through unscaled.
    pub fn scaled_position_size(&self, regime: Regime, intended: f64) -> f64 {
        match regime {
            Regime::Explore => (intended * self.cfg.explore_risk_factor).round(),
            Regime::Exploit => intended,
        }
    }
}
