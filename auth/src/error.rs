//! Access-control errors.

use keel_types::{PrincipalId, ReserveId};
use thiserror::Error;

use crate::roles::Role;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authorized: {principal} lacks the {role} capability")]
    NotAuthorized { principal: PrincipalId, role: Role },

    #[error("not a minter: {principal} holds no minter grant for reserve {reserve}")]
    NotMinter {
        principal: PrincipalId,
        reserve: ReserveId,
    },
}
