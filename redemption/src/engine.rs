//! Redemption records, obligation counters, and deadline queries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use keel_types::{
    BtcAddress, PrincipalId, ProtocolParams, RedemptionId, RedemptionStatus, ReserveId, Sats,
    Timestamp,
};

use crate::error::RedemptionError;

/// One redemption request. Never deleted; `Fulfilled` and `Defaulted` are
/// absorbing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Redemption {
    pub id: RedemptionId,
    pub requester: PrincipalId,
    pub reserve: ReserveId,
    /// The registered source wallet the reserve pays out of.
    pub wallet: BtcAddress,
    /// Requested payout, satoshi-denominated.
    pub requested: Sats,
    /// Where the Bitcoin goes.
    pub destination: BtcAddress,
    pub created_at: Timestamp,
    /// Creation time plus the redemption timeout current at creation.
    /// Later timeout changes never move an existing deadline.
    pub deadline: Timestamp,
    pub status: RedemptionStatus,
    /// Actual payout recorded on fulfillment. Under- and over-fulfillment
    /// are both accepted; judging the difference is the arbiter's job.
    pub actual: Option<Sats>,
    /// Set on default, never empty.
    pub default_reason: Option<String>,
}

/// Owned map of all redemptions plus incrementally maintained counters
/// and history indices.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RedemptionEngine {
    redemptions: HashMap<RedemptionId, Redemption>,
    next_id: u64,
    active_by_reserve: HashMap<ReserveId, u64>,
    active_by_wallet: HashMap<BtcAddress, u64>,
    history_by_reserve: HashMap<ReserveId, Vec<RedemptionId>>,
    history_by_wallet: HashMap<BtcAddress, Vec<RedemptionId>>,
}

impl RedemptionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new redemption obligation.
    ///
    /// The facade has already verified pause state, wallet ownership and
    /// activity, destination format, and taken the requester's tokens
    /// into escrow; this enforces the amount bounds and does the
    /// bookkeeping. The deadline snapshots the timeout in `params`.
    pub fn initiate(
        &mut self,
        requester: PrincipalId,
        reserve: ReserveId,
        wallet: BtcAddress,
        destination: BtcAddress,
        amount: Sats,
        params: &ProtocolParams,
        now: Timestamp,
    ) -> Result<RedemptionId, RedemptionError> {
        if amount < params.min_redemption {
            return Err(RedemptionError::BelowMinimum {
                amount,
                min: params.min_redemption,
            });
        }
        if amount > params.max_redemption {
            return Err(RedemptionError::AboveMaximum {
                amount,
                max: params.max_redemption,
            });
        }

        let id = RedemptionId::new(self.next_id);
        self.next_id += 1;

        *self.active_by_reserve.entry(reserve.clone()).or_default() += 1;
        *self.active_by_wallet.entry(wallet.clone()).or_default() += 1;
        self.history_by_reserve
            .entry(reserve.clone())
            .or_default()
            .push(id);
        self.history_by_wallet
            .entry(wallet.clone())
            .or_default()
            .push(id);

        self.redemptions.insert(
            id,
            Redemption {
                id,
                requester,
                reserve,
                wallet,
                requested: amount,
                destination,
                created_at: now,
                deadline: now.plus_secs(params.redemption_timeout_secs),
                status: RedemptionStatus::Pending,
                actual: None,
                default_reason: None,
            },
        );
        Ok(id)
    }

    /// Resolve a pending redemption as fulfilled with the actually paid
    /// amount.
    pub fn record_fulfillment(
        &mut self,
        id: RedemptionId,
        actual: Sats,
    ) -> Result<(), RedemptionError> {
        if actual.is_zero() {
            return Err(RedemptionError::ZeroFulfillmentAmount(id));
        }
        let redemption = self.pending_mut(id)?;
        redemption.status = RedemptionStatus::Fulfilled;
        redemption.actual = Some(actual);
        let (reserve, wallet) = (redemption.reserve.clone(), redemption.wallet.clone());
        self.retire_obligation(&reserve, &wallet);
        Ok(())
    }

    /// Resolve a pending redemption as defaulted, with a reason.
    pub fn flag_default(&mut self, id: RedemptionId, reason: &str) -> Result<(), RedemptionError> {
        if reason.is_empty() {
            return Err(RedemptionError::EmptyDefaultReason(id));
        }
        let redemption = self.pending_mut(id)?;
        redemption.status = RedemptionStatus::Defaulted;
        redemption.default_reason = Some(reason.to_string());
        let (reserve, wallet) = (redemption.reserve.clone(), redemption.wallet.clone());
        self.retire_obligation(&reserve, &wallet);
        Ok(())
    }

    /// Whether a redemption has blown its deadline. Always false for
    /// terminal or unknown ids — a resolved obligation cannot time out.
    pub fn is_timed_out(&self, id: RedemptionId, now: Timestamp) -> bool {
        self.redemptions
            .get(&id)
            .map(|r| r.status == RedemptionStatus::Pending && r.deadline.is_past(now))
            .unwrap_or(false)
    }

    /// The soonest deadline among the reserve's pending redemptions, or
    /// `None` if nothing is pending.
    pub fn earliest_deadline_for_reserve(&self, reserve: &ReserveId) -> Option<Timestamp> {
        self.earliest_deadline(self.history_by_reserve.get(reserve))
    }

    /// The soonest deadline among the wallet's pending redemptions, or
    /// `None` if nothing is pending.
    pub fn earliest_deadline_for_wallet(&self, wallet: &BtcAddress) -> Option<Timestamp> {
        self.earliest_deadline(self.history_by_wallet.get(wallet))
    }

    pub fn active_count_for_reserve(&self, reserve: &ReserveId) -> u64 {
        self.active_by_reserve.get(reserve).copied().unwrap_or(0)
    }

    pub fn active_count_for_wallet(&self, wallet: &BtcAddress) -> u64 {
        self.active_by_wallet.get(wallet).copied().unwrap_or(0)
    }

    pub fn get(&self, id: RedemptionId) -> Option<&Redemption> {
        self.redemptions.get(&id)
    }

    /// Every redemption ever opened against `reserve`, oldest first.
    pub fn history_for_reserve(&self, reserve: &ReserveId) -> &[RedemptionId] {
        self.history_by_reserve
            .get(reserve)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every redemption ever opened against `wallet`, oldest first.
    pub fn history_for_wallet(&self, wallet: &BtcAddress) -> &[RedemptionId] {
        self.history_by_wallet
            .get(wallet)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn pending_mut(&mut self, id: RedemptionId) -> Result<&mut Redemption, RedemptionError> {
        let redemption = self
            .redemptions
            .get_mut(&id)
            .ok_or(RedemptionError::Unknown(id))?;
        if redemption.status.is_terminal() {
            return Err(RedemptionError::NotPending {
                id,
                status: redemption.status,
            });
        }
        Ok(redemption)
    }

    fn earliest_deadline(&self, history: Option<&Vec<RedemptionId>>) -> Option<Timestamp> {
        history?
            .iter()
            .filter_map(|id| self.redemptions.get(id))
            .filter(|r| r.status == RedemptionStatus::Pending)
            .map(|r| r.deadline)
            .min()
    }

    fn retire_obligation(&mut self, reserve: &ReserveId, wallet: &BtcAddress) {
        if let Some(count) = self.active_by_reserve.get_mut(reserve) {
            *count = count.saturating_sub(1);
        }
        if let Some(count) = self.active_by_wallet.get_mut(wallet) {
            *count = count.saturating_sub(1);
        }
    }
}
