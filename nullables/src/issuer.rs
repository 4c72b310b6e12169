//! Nullable token issuer — records credits, tracks balances and escrow.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use keel_collab::{IssuerError, TokenIssuer};
use keel_types::{PrincipalId, TokenAmount};

#[derive(Default)]
struct IssuerState {
    balances: HashMap<PrincipalId, u128>,
    escrowed: u128,
    fail_next: bool,
}

/// A programmable issuer double.
///
/// Holds per-principal balances so escrow checks behave like the real
/// token, and can be told to fail its next call to exercise the
/// fatal-to-operation path. Clones share the same state.
#[derive(Clone, Default)]
pub struct NullIssuer {
    state: Rc<RefCell<IssuerState>>,
}

impl NullIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a principal with a token balance.
    pub fn fund(&self, principal: &PrincipalId, amount: TokenAmount) {
        *self
            .state
            .borrow_mut()
            .balances
            .entry(principal.clone())
            .or_default() += amount.raw();
    }

    /// Make the next issuer call fail.
    pub fn fail_next_call(&self) {
        self.state.borrow_mut().fail_next = true;
    }

    pub fn balance_of(&self, principal: &PrincipalId) -> TokenAmount {
        TokenAmount::new(
            self.state
                .borrow()
                .balances
                .get(principal)
                .copied()
                .unwrap_or(0),
        )
    }

    /// Total credited to `principal` so far (alias for its balance when
    /// nothing was escrowed away).
    pub fn credited_to(&self, principal: &PrincipalId) -> TokenAmount {
        self.balance_of(principal)
    }

    pub fn escrowed(&self) -> TokenAmount {
        TokenAmount::new(self.state.borrow().escrowed)
    }
}

impl TokenIssuer for NullIssuer {
    fn credit(&mut self, destination: &PrincipalId, amount: TokenAmount) -> Result<(), IssuerError> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_next) {
            return Err(IssuerError::Failed("programmed failure".into()));
        }
        *state.balances.entry(destination.clone()).or_default() += amount.raw();
        Ok(())
    }

    fn escrow(&mut self, from: &PrincipalId, amount: TokenAmount) -> Result<(), IssuerError> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_next) {
            return Err(IssuerError::Failed("programmed failure".into()));
        }
        let balance = state.balances.entry(from.clone()).or_default();
        if *balance < amount.raw() {
            return Err(IssuerError::InsufficientBalance {
                principal: from.clone(),
                needed: amount,
                available: TokenAmount::new(*balance),
            });
        }
        *balance -= amount.raw();
        state.escrowed += amount.raw();
        Ok(())
    }

    fn debit_from_escrow(&mut self, amount: TokenAmount) -> Result<(), IssuerError> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_next) {
            return Err(IssuerError::Failed("programmed failure".into()));
        }
        if state.escrowed < amount.raw() {
            return Err(IssuerError::InsufficientEscrow {
                needed: amount,
                available: TokenAmount::new(state.escrowed),
            });
        }
        state.escrowed -= amount.raw();
        Ok(())
    }
}
