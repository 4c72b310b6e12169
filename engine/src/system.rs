//! The caller-facing reserve system.

use tracing::{info, warn};

use keel_auth::{AccessControl, Role};
use keel_capacity::CapacityEngine;
use keel_collab::{BtcAddressValidator, Clock, OwnershipProver, ReserveOracle, TokenIssuer};
use keel_ledger::{LedgerError, ReserveLedger, SystemPause};
use keel_redemption::{Redemption, RedemptionEngine, RedemptionError};
use keel_registry::{RegistryError, ReserveRegistry, WalletRegistry};
use keel_types::{
    BtcAddress, PauseLevel, PrincipalId, ProtocolParams, RedemptionId, ReserveId, ReserveStatus,
    Sats, Timestamp, WalletStatus,
};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::snapshot::SystemSnapshot;

/// Per-reserve view joining registry, ledger, and redemption state.
#[derive(Clone, Debug)]
pub struct ReserveStats {
    pub id: ReserveId,
    pub status: ReserveStatus,
    /// Registry-level ratcheted cap.
    pub registry_cap: Sats,
    /// Ledger-level governance-adjustable cap.
    pub ledger_cap: Sats,
    pub minted: Sats,
    /// Backing the reserve last attested via `update_backing`.
    pub attested_backing: Sats,
    /// Backing last synced from the oracle.
    pub synced_backing: Sats,
    pub emergency_paused: bool,
    pub active_obligations: u64,
    pub live_wallets: usize,
    pub registered_at: Timestamp,
    pub last_sync_timestamp: Option<Timestamp>,
    pub oracle_failure_detected: bool,
}

/// Per-wallet view joining registry and redemption state.
#[derive(Clone, Debug)]
pub struct WalletStats {
    pub address: BtcAddress,
    pub reserve: ReserveId,
    pub status: WalletStatus,
    pub registered_at: Timestamp,
    pub active_obligations: u64,
    pub total_redemptions: usize,
}

/// The assembled engine: access control, the five core components, and
/// the collaborator implementations, behind one capability-checked
/// operation surface.
///
/// Every mutating operation is atomic: capability check first, then every
/// cross-component precondition, and only then the mutations — a failed
/// precondition leaves no partial effect.
pub struct ReserveSystem<O, I, V, P, C>
where
    O: ReserveOracle,
    I: TokenIssuer,
    V: BtcAddressValidator,
    P: OwnershipProver,
    C: Clock,
{
    auth: AccessControl,
    registry: ReserveRegistry,
    wallets: WalletRegistry,
    ledger: ReserveLedger,
    capacity: CapacityEngine<O>,
    redemptions: RedemptionEngine,
    issuer: I,
    validator: V,
    prover: P,
    clock: C,
    params: ProtocolParams,
}

impl<O, I, V, P, C> ReserveSystem<O, I, V, P, C>
where
    O: ReserveOracle,
    I: TokenIssuer,
    V: BtcAddressValidator,
    P: OwnershipProver,
    C: Clock,
{
    /// Assemble a system. `governance` receives the initial governance
    /// grant; everything else is granted through it.
    pub fn new(
        config: EngineConfig,
        governance: PrincipalId,
        oracle: O,
        issuer: I,
        validator: V,
        prover: P,
        clock: C,
    ) -> Self {
        let mut auth = AccessControl::new();
        auth.grant(Role::Governance, governance);
        Self {
            auth,
            registry: ReserveRegistry::new(),
            wallets: WalletRegistry::new(config.params.max_wallets_per_reserve),
            ledger: ReserveLedger::new(),
            capacity: CapacityEngine::new(oracle),
            redemptions: RedemptionEngine::new(),
            issuer,
            validator,
            prover,
            clock,
            params: config.params,
        }
    }

    // ── Capability administration ──────────────────────────────────────

    pub fn grant_role(
        &mut self,
        caller: &PrincipalId,
        role: Role,
        principal: PrincipalId,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Governance, caller)?;
        self.auth.grant(role, principal);
        Ok(())
    }

    pub fn revoke_role(
        &mut self,
        caller: &PrincipalId,
        role: Role,
        principal: &PrincipalId,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Governance, caller)?;
        self.auth.revoke(role, principal);
        Ok(())
    }

    pub fn grant_minter(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        principal: PrincipalId,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Governance, caller)?;
        self.registry.get(reserve)?;
        self.auth.grant_minter(reserve.clone(), principal);
        Ok(())
    }

    pub fn revoke_minter(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        principal: &PrincipalId,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Governance, caller)?;
        self.auth.revoke_minter(reserve, principal);
        Ok(())
    }

    // ── Reserve lifecycle ──────────────────────────────────────────────

    /// Register a reserve and authorize it on the ledger with the same
    /// initial cap.
    pub fn register_reserve(
        &mut self,
        caller: &PrincipalId,
        reserve: ReserveId,
        cap: Sats,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Governance, caller)?;
        if self.ledger.is_authorized(&reserve) {
            return Err(LedgerError::AlreadyAuthorized(reserve).into());
        }
        let now = self.clock.now();
        self.registry.register(reserve.clone(), cap, now)?;
        self.ledger.authorize_reserve(reserve.clone(), cap)?;
        info!(reserve = %reserve, cap = %cap, "reserve registered");
        Ok(())
    }

    /// Fully deauthorize a reserve. Requires zero minted supply and zero
    /// open redemption obligations; wallet records stay for audit.
    pub fn deauthorize_reserve(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Governance, caller)?;
        self.registry.get(reserve)?;
        let open = self.redemptions.active_count_for_reserve(reserve);
        if open > 0 {
            return Err(EngineError::ObligationsOutstanding {
                reserve: reserve.clone(),
                count: open,
            });
        }
        self.ledger.deauthorize_reserve(reserve)?;
        self.registry.remove(reserve)?;
        self.auth.revoke_reserve_minters(reserve);
        info!(reserve = %reserve, "reserve deauthorized");
        Ok(())
    }

    // ── Balance operations ─────────────────────────────────────────────

    /// The reserve attests its own backing.
    pub fn update_backing(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        amount: Sats,
    ) -> Result<(), EngineError> {
        self.require_reserve_principal(caller, reserve)?;
        self.ledger.update_backing(reserve, amount)?;
        Ok(())
    }

    /// Mint against a reserve, crediting `destination`.
    pub fn mint(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        destination: &PrincipalId,
        amount: Sats,
    ) -> Result<(), EngineError> {
        self.auth.require_minter(reserve, caller)?;
        let record = self.registry.get(reserve)?;
        if !record.status.permits_minting() {
            return Err(EngineError::ReserveNotActive {
                reserve: reserve.clone(),
                status: record.status,
            });
        }
        let token = self
            .ledger
            .mint(reserve, destination, amount, &self.params, &mut self.issuer)?;
        info!(reserve = %reserve, destination = %destination, amount = %amount, token = %token, "minted");
        Ok(())
    }

    /// The reserve retires part of its minted supply.
    pub fn redeem(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        amount: Sats,
    ) -> Result<(), EngineError> {
        self.require_reserve_principal(caller, reserve)?;
        self.ledger.redeem(reserve, amount)?;
        info!(reserve = %reserve, amount = %amount, "redeemed");
        Ok(())
    }

    /// Governance-path cap adjustment on the ledger record.
    pub fn set_minting_cap(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        new_cap: Sats,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Governance, caller)?;
        self.ledger.set_minting_cap(reserve, new_cap)?;
        Ok(())
    }

    /// Custodian-initiated ratcheted capacity growth.
    pub fn increase_minting_capacity(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        new_cap: Sats,
    ) -> Result<(), EngineError> {
        self.require_reserve_principal(caller, reserve)?;
        self.capacity
            .increase_minting_capacity(&mut self.registry, &mut self.ledger, reserve, new_cap)?;
        Ok(())
    }

    /// Governance status change, validated against the transition table.
    pub fn set_reserve_status(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        status: ReserveStatus,
        reason: &str,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Governance, caller)?;
        self.capacity
            .set_reserve_status(&mut self.registry, reserve, status, reason)?;
        Ok(())
    }

    /// How much the reserve could mint right now. Refreshes the oracle
    /// sync metadata as a side effect; never touches minted amounts.
    pub fn available_minting_capacity(&mut self, reserve: &ReserveId) -> Result<Sats, EngineError> {
        let now = self.clock.now();
        Ok(self
            .capacity
            .available_minting_capacity(&mut self.registry, &self.ledger, reserve, now)?)
    }

    // ── Pause control ──────────────────────────────────────────────────

    /// Status-level pause. The reserve may pause itself; governance may
    /// pause any reserve.
    pub fn pause_reserve(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        level: PauseLevel,
    ) -> Result<(), EngineError> {
        if caller == reserve {
            self.registry.self_pause(reserve, level)?;
        } else {
            self.auth.require(Role::Governance, caller)?;
            self.registry.governance_pause(reserve, level)?;
        }
        warn!(reserve = %reserve, level = ?level, "reserve paused");
        Ok(())
    }

    /// Lift a status-level pause. A governance pause only yields to
    /// governance.
    pub fn resume_reserve(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
    ) -> Result<(), EngineError> {
        if caller == reserve {
            self.registry.resume(reserve, false)?;
        } else {
            self.auth.require(Role::Governance, caller)?;
            self.registry.resume(reserve, true)?;
        }
        info!(reserve = %reserve, "reserve resumed");
        Ok(())
    }

    /// Fast-acting ledger-level halt. Fail-safe: the emergency council
    /// (or governance) can set it...
    pub fn emergency_pause_reserve(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
    ) -> Result<(), EngineError> {
        self.auth
            .require_any(&[Role::EmergencyCouncil, Role::Governance], caller)?;
        self.ledger.set_emergency_pause(reserve)?;
        warn!(reserve = %reserve, "reserve emergency-paused");
        Ok(())
    }

    /// ...but recovery is deliberate: only governance can clear it.
    pub fn lift_emergency_pause(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Governance, caller)?;
        self.ledger.clear_emergency_pause(reserve)?;
        info!(reserve = %reserve, "reserve emergency pause lifted");
        Ok(())
    }

    pub fn set_system_minting_paused(
        &mut self,
        caller: &PrincipalId,
        paused: bool,
    ) -> Result<(), EngineError> {
        self.require_pause_authority(caller, paused)?;
        self.ledger.set_minting_paused(paused);
        warn!(paused, "system minting pause changed");
        Ok(())
    }

    pub fn set_system_redemption_paused(
        &mut self,
        caller: &PrincipalId,
        paused: bool,
    ) -> Result<(), EngineError> {
        self.require_pause_authority(caller, paused)?;
        self.ledger.set_redemption_paused(paused);
        warn!(paused, "system redemption pause changed");
        Ok(())
    }

    pub fn set_system_wallet_registration_paused(
        &mut self,
        caller: &PrincipalId,
        paused: bool,
    ) -> Result<(), EngineError> {
        self.require_pause_authority(caller, paused)?;
        self.ledger.set_wallet_registration_paused(paused);
        warn!(paused, "system wallet-registration pause changed");
        Ok(())
    }

    // ── Wallet lifecycle ───────────────────────────────────────────────

    /// Register a wallet under a reserve, in `Inactive` state.
    pub fn register_wallet(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        address: BtcAddress,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Registrar, caller)?;
        self.register_wallet_inner(reserve, address)
    }

    /// Register a wallet with a signature-based ownership proof checked
    /// through the prover collaborator.
    pub fn register_wallet_with_proof(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        address: BtcAddress,
        challenge: &[u8],
        pubkey: &[u8],
        signature: &[u8],
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Registrar, caller)?;
        if !self.prover.verify(challenge, pubkey, signature) {
            return Err(EngineError::OwnershipProofRejected(address));
        }
        self.register_wallet_inner(reserve, address)
    }

    fn register_wallet_inner(
        &mut self,
        reserve: &ReserveId,
        address: BtcAddress,
    ) -> Result<(), EngineError> {
        if self.ledger.pause().wallet_registration {
            return Err(EngineError::WalletRegistrationPaused);
        }
        let record = self.registry.get(reserve)?;
        if record.status == ReserveStatus::Revoked {
            return Err(EngineError::ReserveRevoked(reserve.clone()));
        }
        if !self.validator.is_valid(&address) {
            return Err(EngineError::InvalidBtcAddress(address));
        }
        let now = self.clock.now();
        self.wallets.register(reserve.clone(), address.clone(), now)?;
        info!(reserve = %reserve, wallet = %address, "wallet registered");
        Ok(())
    }

    pub fn activate_wallet(
        &mut self,
        caller: &PrincipalId,
        address: &BtcAddress,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Registrar, caller)?;
        self.wallets.activate(address)?;
        Ok(())
    }

    pub fn request_wallet_deregistration(
        &mut self,
        caller: &PrincipalId,
        address: &BtcAddress,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Registrar, caller)?;
        self.wallets.request_deregistration(address)?;
        Ok(())
    }

    /// Finalize a pending de-registration. A wallet with open redemption
    /// obligations cannot leave the live set.
    pub fn finalize_wallet_deregistration(
        &mut self,
        caller: &PrincipalId,
        address: &BtcAddress,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Registrar, caller)?;
        let open = self.redemptions.active_count_for_wallet(address);
        if open > 0 {
            return Err(EngineError::WalletObligationsOutstanding {
                wallet: address.clone(),
                count: open,
            });
        }
        self.wallets.finalize_deregistration(address)?;
        info!(wallet = %address, "wallet deregistered");
        Ok(())
    }

    // ── Redemptions ────────────────────────────────────────────────────

    /// Open a redemption against a reserve/wallet pair, escrowing the
    /// requester's tokens.
    pub fn initiate_redemption(
        &mut self,
        caller: &PrincipalId,
        reserve: &ReserveId,
        source_wallet: &BtcAddress,
        destination: BtcAddress,
        amount: Sats,
    ) -> Result<RedemptionId, EngineError> {
        // System-wide pause always overrides; the reserve-level emergency
        // pause is checked independently after it.
        if self.ledger.pause().redemption {
            return Err(LedgerError::SystemRedemptionPaused.into());
        }
        if self.ledger.is_emergency_paused(reserve) {
            return Err(LedgerError::ReservePaused(reserve.clone()).into());
        }
        let wallet = self.wallets.get(source_wallet)?;
        if &wallet.reserve != reserve {
            return Err(EngineError::WalletNotOwnedByReserve {
                wallet: source_wallet.clone(),
                expected: reserve.clone(),
                actual: wallet.reserve.clone(),
            });
        }
        if wallet.status != WalletStatus::Active {
            return Err(RegistryError::WalletNotActive {
                address: source_wallet.clone(),
                actual: wallet.status,
            }
            .into());
        }
        if !self.validator.is_valid(&destination) {
            return Err(EngineError::InvalidBtcAddress(destination));
        }
        if amount < self.params.min_redemption {
            return Err(RedemptionError::BelowMinimum {
                amount,
                min: self.params.min_redemption,
            }
            .into());
        }
        if amount > self.params.max_redemption {
            return Err(RedemptionError::AboveMaximum {
                amount,
                max: self.params.max_redemption,
            }
            .into());
        }

        self.issuer.escrow(caller, amount.to_token_amount())?;
        let now = self.clock.now();
        let id = self.redemptions.initiate(
            caller.clone(),
            reserve.clone(),
            source_wallet.clone(),
            destination,
            amount,
            &self.params,
            now,
        )?;
        info!(redemption = %id, reserve = %reserve, wallet = %source_wallet, amount = %amount, "redemption initiated");
        Ok(id)
    }

    /// Arbiter-recorded fulfillment. Burns the escrowed tokens and
    /// retires the obligation. Blocked by the system-wide redemption
    /// pause, but allowed while the owning reserve is emergency-paused —
    /// arbiters may still resolve pending obligations during a
    /// reserve-level emergency.
    pub fn record_redemption_fulfillment(
        &mut self,
        caller: &PrincipalId,
        id: RedemptionId,
        actual: Sats,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::DisputeArbiter, caller)?;
        if self.ledger.pause().redemption {
            return Err(LedgerError::SystemRedemptionPaused.into());
        }
        let redemption = self
            .redemptions
            .get(id)
            .ok_or(RedemptionError::Unknown(id))?;
        if redemption.status.is_terminal() {
            return Err(RedemptionError::NotPending {
                id,
                status: redemption.status,
            }
            .into());
        }
        if actual.is_zero() {
            return Err(RedemptionError::ZeroFulfillmentAmount(id).into());
        }
        let escrowed = redemption.requested.to_token_amount();
        self.issuer.debit_from_escrow(escrowed)?;
        self.redemptions.record_fulfillment(id, actual)?;
        info!(redemption = %id, actual = %actual, "redemption fulfilled");
        Ok(())
    }

    /// Arbiter-flagged default. Never blocked by any pause — obligations
    /// can always be closed out.
    pub fn flag_defaulted_redemption(
        &mut self,
        caller: &PrincipalId,
        id: RedemptionId,
        reason: &str,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::DisputeArbiter, caller)?;
        self.redemptions.flag_default(id, reason)?;
        warn!(redemption = %id, reason, "redemption defaulted");
        Ok(())
    }

    // ── Parameter changes ──────────────────────────────────────────────

    /// Change the redemption timeout for future redemptions. Existing
    /// deadlines are unaffected.
    pub fn set_redemption_timeout(
        &mut self,
        caller: &PrincipalId,
        timeout_secs: u64,
    ) -> Result<(), EngineError> {
        self.auth.require(Role::Governance, caller)?;
        self.params.redemption_timeout_secs = timeout_secs;
        info!(timeout_secs, "redemption timeout changed");
        Ok(())
    }

    // ── Read-only queries ──────────────────────────────────────────────

    pub fn reserve_stats(&self, reserve: &ReserveId) -> Result<ReserveStats, EngineError> {
        let record = self.registry.get(reserve)?;
        let entry = self
            .ledger
            .entry(reserve)
            .ok_or_else(|| LedgerError::NotAuthorized(reserve.clone()))?;
        Ok(ReserveStats {
            id: record.id.clone(),
            status: record.status,
            registry_cap: record.minting_cap,
            ledger_cap: entry.minting_cap,
            minted: entry.minted,
            attested_backing: entry.backing,
            synced_backing: record.backing_amount,
            emergency_paused: entry.emergency_paused,
            active_obligations: self.redemptions.active_count_for_reserve(reserve),
            live_wallets: self.wallets.live_wallet_count(reserve),
            registered_at: record.registered_at,
            last_sync_timestamp: record.last_sync_timestamp,
            oracle_failure_detected: record.oracle_failure_detected,
        })
    }

    pub fn wallet_stats(&self, address: &BtcAddress) -> Result<WalletStats, EngineError> {
        let wallet = self.wallets.get(address)?;
        Ok(WalletStats {
            address: wallet.address.clone(),
            reserve: wallet.reserve.clone(),
            status: wallet.status,
            registered_at: wallet.registered_at,
            active_obligations: self.redemptions.active_count_for_wallet(address),
            total_redemptions: self.redemptions.history_for_wallet(address).len(),
        })
    }

    pub fn pause_state(&self) -> SystemPause {
        self.ledger.pause()
    }

    pub fn total_minted(&self) -> Sats {
        self.ledger.total_minted()
    }

    pub fn redemption(&self, id: RedemptionId) -> Option<&Redemption> {
        self.redemptions.get(id)
    }

    pub fn is_redemption_timed_out(&self, id: RedemptionId) -> bool {
        self.redemptions.is_timed_out(id, self.clock.now())
    }

    pub fn earliest_redemption_deadline_for_reserve(
        &self,
        reserve: &ReserveId,
    ) -> Option<Timestamp> {
        self.redemptions.earliest_deadline_for_reserve(reserve)
    }

    pub fn earliest_redemption_deadline_for_wallet(
        &self,
        wallet: &BtcAddress,
    ) -> Option<Timestamp> {
        self.redemptions.earliest_deadline_for_wallet(wallet)
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    // ── Snapshots ──────────────────────────────────────────────────────

    /// Copy out every persisted record.
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            auth: self.auth.clone(),
            registry: self.registry.clone(),
            wallets: self.wallets.clone(),
            ledger: self.ledger.clone(),
            redemptions: self.redemptions.clone(),
            params: self.params.clone(),
            version: SystemSnapshot::VERSION,
        }
    }

    /// Replace the engine's persisted state wholesale.
    pub fn restore(&mut self, snapshot: SystemSnapshot) {
        self.auth = snapshot.auth;
        self.registry = snapshot.registry;
        self.wallets = snapshot.wallets;
        self.ledger = snapshot.ledger;
        self.redemptions = snapshot.redemptions;
        self.params = snapshot.params;
    }

    // ── Internal helpers ───────────────────────────────────────────────

    fn require_reserve_principal(
        &self,
        caller: &PrincipalId,
        reserve: &ReserveId,
    ) -> Result<(), EngineError> {
        if caller != reserve {
            return Err(EngineError::NotReservePrincipal {
                caller: caller.clone(),
                reserve: reserve.clone(),
            });
        }
        Ok(())
    }

    /// Pausing is fail-safe (emergency council or governance); unpausing
    /// is recover-deliberately (governance only).
    fn require_pause_authority(
        &self,
        caller: &PrincipalId,
        pausing: bool,
    ) -> Result<(), EngineError> {
        if pausing {
            self.auth
                .require_any(&[Role::EmergencyCouncil, Role::Governance], caller)?;
        } else {
            self.auth.require(Role::Governance, caller)?;
        }
        Ok(())
    }
}
