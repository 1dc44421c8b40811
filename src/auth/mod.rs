//! 认证：JWT 签发与校验、会话管理、请求守卫

pub mod guard;
pub mod jwt;
pub mod session;

pub use guard::{AuthGuard, AuthenticatedUser};
pub use jwt::{AccessClaims, JwtService, RefreshClaims, TokenIssuer};
pub use session::{SessionManager, TokenPair};
