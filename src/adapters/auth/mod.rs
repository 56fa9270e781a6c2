//! Authentication adapters.

mod jwt;
mod mock;

pub use jwt::{JwtAuthProvider, JwtConfig};
pub use mock::MockAuthProvider;
