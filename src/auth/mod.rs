// Authentication, sessions and one-time passwords

pub mod errors;
pub mod extract;
pub mod otp;
pub mod password;
pub mod session;

pub use errors::*;
pub use extract::*;
pub use otp::*;
pub use password::*;
pub use session::*;
