//! # Economy Ledger
//!
//! Gold balance, bounty bonuses and the bounded history of gold movements.
//! Every purchase, refund, reward and penalty in a run flows through here.

use crate::constants::EPSILON;
use crate::game::ResourceState;
use crate::utils::floor_display;
use crate::{BastionError, BastionResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Why gold moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoldReason {
    EnemyDefeated,
    WaveCleared,
    EvacuationReward,
    EvacuationPenalty,
    TurretPlaced,
    TurretUpgraded,
    TurretRefund,
    CastleUpgrade,
    CastleRepair,
}

impl GoldReason {
    /// Bounties are scaled by the castle's gold bonus.
    pub fn is_bounty(self) -> bool {
        matches!(self, GoldReason::EnemyDefeated)
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldEvent {
    /// Signed change in gold
    pub delta: f64,
    /// Balance after the change
    pub gold: f64,
    /// Run time of the change
    pub timestamp: f64,
    pub reason: GoldReason,
}

/// Gold balance plus a bounded event history.
///
/// # Examples
///
/// ```
/// use bastion::{EconomyLedger, GoldReason};
///
/// let mut ledger = EconomyLedger::new(100.0, 10);
/// ledger.spend(40.0, GoldReason::TurretPlaced, 0.0).unwrap();
/// assert_eq!(ledger.gold(), 60.0);
/// assert!(ledger.spend(100.0, GoldReason::TurretPlaced, 0.0).is_err());
/// assert_eq!(ledger.gold(), 60.0);
/// ```
#[derive(Debug, Clone)]
pub struct EconomyLedger {
    gold: f64,
    bonus_percent: f64,
    events: VecDeque<GoldEvent>,
    max_events: usize,
    earned: f64,
}

impl EconomyLedger {
    pub fn new(starting_gold: f64, max_events: usize) -> Self {
        Self {
            gold: starting_gold.max(0.0),
            bonus_percent: 0.0,
            events: VecDeque::with_capacity(max_events),
            max_events,
            earned: 0.0,
        }
    }

    pub fn gold(&self) -> f64 {
        self.gold
    }

    /// Gold as shown to the player.
    pub fn display_gold(&self) -> u64 {
        floor_display(self.gold)
    }

    /// Total gold credited over the run.
    pub fn earned(&self) -> f64 {
        self.earned
    }

    /// Sets the bounty bonus; follows the castle level.
    pub fn set_bonus_percent(&mut self, percent: f64) {
        self.bonus_percent = percent.max(0.0);
    }

    pub fn bonus_percent(&self) -> f64 {
        self.bonus_percent
    }

    pub fn can_afford(&self, cost: f64) -> bool {
        self.gold + EPSILON >= cost
    }

    /// Deducts `cost`. Fails without touching the balance when short.
    pub fn spend(&mut self, cost: f64, reason: GoldReason, time: f64) -> BastionResult<()> {
        if !self.can_afford(cost) {
            return Err(BastionError::InsufficientGold {
                cost,
                gold: self.gold,
            });
        }
        self.gold = (self.gold - cost).max(0.0);
        self.record(-cost, reason, time);
        Ok(())
    }

    /// Adds gold, scaled by the bonus for bounty reasons. Returns the amount credited.
    pub fn credit(&mut self, amount: f64, reason: GoldReason, time: f64) -> f64 {
        let amount = amount.max(0.0);
        let credited = if reason.is_bounty() {
            amount * (1.0 + self.bonus_percent / 100.0)
        } else {
            amount
        };
        self.gold += credited;
        self.earned += credited;
        self.record(credited, reason, time);
        credited
    }

    /// Removes gold, never dropping below zero. Returns the amount actually removed.
    pub fn penalize(&mut self, amount: f64, reason: GoldReason, time: f64) -> f64 {
        let removed = amount.max(0.0).min(self.gold);
        self.gold -= removed;
        self.record(-removed, reason, time);
        removed
    }

    pub fn events(&self) -> impl Iterator<Item = &GoldEvent> {
        self.events.iter()
    }

    fn record(&mut self, delta: f64, reason: GoldReason, time: f64) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() == self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(GoldEvent {
            delta,
            gold: self.gold,
            timestamp: time,
            reason,
        });
    }

    pub fn snapshot(&self) -> ResourceState {
        ResourceState {
            gold: self.gold,
            gold_display: self.display_gold(),
            gold_events: self.events.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_rejects_without_mutation() {
        let mut ledger = EconomyLedger::new(30.0, 5);
        let err = ledger.spend(40.0, GoldReason::TurretPlaced, 1.0);
        assert!(matches!(err, Err(BastionError::InsufficientGold { .. })));
        assert_eq!(ledger.gold(), 30.0);
        assert_eq!(ledger.events().count(), 0);
    }

    #[test]
    fn test_bounty_bonus_applies_only_to_bounties() {
        let mut ledger = EconomyLedger::new(0.0, 5);
        ledger.set_bonus_percent(10.0);
        assert!((ledger.credit(10.0, GoldReason::EnemyDefeated, 0.0) - 11.0).abs() < 1e-9);
        assert_eq!(ledger.credit(10.0, GoldReason::WaveCleared, 0.0), 10.0);
        assert!((ledger.gold() - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_penalize_clamps_at_zero() {
        let mut ledger = EconomyLedger::new(20.0, 5);
        assert_eq!(ledger.penalize(30.0, GoldReason::EvacuationPenalty, 2.0), 20.0);
        assert_eq!(ledger.gold(), 0.0);
        let last = ledger.events().last().unwrap();
        assert_eq!(last.delta, -20.0);
        assert_eq!(last.gold, 0.0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut ledger = EconomyLedger::new(0.0, 3);
        for i in 0..5 {
            ledger.credit(1.0, GoldReason::WaveCleared, i as f64);
        }
        let stamps: Vec<f64> = ledger.events().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_display_gold_is_floored() {
        let mut ledger = EconomyLedger::new(10.0, 3);
        ledger.set_bonus_percent(5.0);
        ledger.credit(7.0, GoldReason::EnemyDefeated, 0.0);
        assert_eq!(ledger.display_gold(), 17);
        assert_eq!(ledger.snapshot().gold_display, 17);
    }
}
