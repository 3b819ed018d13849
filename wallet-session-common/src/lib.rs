//! Wallet Session Common Types
//!
//! Wire types shared by the backend and any client talking to it.

pub mod envelope;
pub mod session;

pub use envelope::ApiResponse;
pub use session::{LoginAction, LoginData, LoginRequest, LogoutData};
