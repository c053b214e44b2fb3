//! Identity of the signed-in user: wire payload, the providers that fetch it
//! and the client-side session that owns loading state and invalidation.
//! Keep the public surface thin and split implementation across sub-modules.

mod payload;
mod provider;
mod session;

pub use payload::{IdentityPayload, UserProfile};
pub use provider::{IdentityProvider, HttpIdentityProvider, StaticIdentityProvider};
pub use session::{IdentitySession, LoadTicket, LoadedIdentity, SessionState};
