//! Role table and reserve-bound minter grants.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use keel_types::{PrincipalId, ReserveId};

use crate::error::AuthError;

/// Capability roles checked at the start of each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Deliberate recovery and policy: unpause, caps, status changes.
    Governance,
    /// Fast-acting halt authority: may pause, never unpause.
    EmergencyCouncil,
    /// Wallet lifecycle operations.
    Registrar,
    /// Redemption fulfillment/default resolution.
    DisputeArbiter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Governance => "governance",
            Self::EmergencyCouncil => "emergency-council",
            Self::Registrar => "registrar",
            Self::DisputeArbiter => "dispute-arbiter",
        };
        write!(f, "{s}")
    }
}

/// Principal → capability lookup owned by the engine facade.
///
/// Plain grant sets; no hierarchy, no inheritance. Minters are tracked
/// per reserve because a minter capability is only meaningful bound to
/// the reserve it mints against.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccessControl {
    grants: HashMap<Role, HashSet<PrincipalId>>,
    minters: HashMap<ReserveId, HashSet<PrincipalId>>,
}

impl AccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, role: Role, principal: PrincipalId) {
        self.grants.entry(role).or_default().insert(principal);
    }

    pub fn revoke(&mut self, role: Role, principal: &PrincipalId) {
        if let Some(set) = self.grants.get_mut(&role) {
            set.remove(principal);
        }
    }

    pub fn has_role(&self, role: Role, principal: &PrincipalId) -> bool {
        self.grants
            .get(&role)
            .map(|set| set.contains(principal))
            .unwrap_or(false)
    }

    /// Fail unless `principal` holds `role`.
    pub fn require(&self, role: Role, principal: &PrincipalId) -> Result<(), AuthError> {
        if self.has_role(role, principal) {
            Ok(())
        } else {
            Err(AuthError::NotAuthorized {
                principal: principal.clone(),
                role,
            })
        }
    }

    /// Fail unless `principal` holds any of `roles`.
    pub fn require_any(&self, roles: &[Role], principal: &PrincipalId) -> Result<(), AuthError> {
        if roles.iter().any(|r| self.has_role(*r, principal)) {
            return Ok(());
        }
        Err(AuthError::NotAuthorized {
            principal: principal.clone(),
            role: roles[0],
        })
    }

    pub fn grant_minter(&mut self, reserve: ReserveId, principal: PrincipalId) {
        self.minters.entry(reserve).or_default().insert(principal);
    }

    pub fn revoke_minter(&mut self, reserve: &ReserveId, principal: &PrincipalId) {
        if let Some(set) = self.minters.get_mut(reserve) {
            set.remove(principal);
        }
    }

    /// Drop every minter grant bound to `reserve` (on deauthorization).
    pub fn revoke_reserve_minters(&mut self, reserve: &ReserveId) {
        self.minters.remove(reserve);
    }

    pub fn is_minter(&self, reserve: &ReserveId, principal: &PrincipalId) -> bool {
        self.minters
            .get(reserve)
            .map(|set| set.contains(principal))
            .unwrap_or(false)
    }

    /// Fail unless `principal` holds a minter grant bound to `reserve`.
    pub fn require_minter(
        &self,
        reserve: &ReserveId,
        principal: &PrincipalId,
    ) -> Result<(), AuthError> {
        if self.is_minter(reserve, principal) {
            Ok(())
        } else {
            Err(AuthError::NotMinter {
                principal: principal.clone(),
                reserve: reserve.clone(),
            })
        }
    }
}
