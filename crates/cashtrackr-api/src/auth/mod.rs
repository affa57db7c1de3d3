// Authentication module
//
// - jwt: session token issue/verify
// - middleware: bearer-token extractor and shared auth state
// - token: 6-digit confirmation and reset codes
// - routes: /api/auth/* account endpoints

pub mod jwt;
pub mod middleware;
pub mod routes;
pub mod token;

pub use jwt::{JwtService, SessionClaims};
pub use middleware::{AuthState, AuthUser, CurrentUser};
pub use routes::{routes, AccountState};
