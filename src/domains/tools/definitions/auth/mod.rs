//! Phone/OTP authentication tools.

pub mod phone;
pub mod resend_otp;
pub mod sign_in;
pub mod verify_otp;

pub use phone::{NormalizedPhone, normalize_phone};
pub use resend_otp::{ResendOtpParams, ResendOtpTool};
pub use sign_in::{SignInParams, SignInTool};
pub use verify_otp::{VerifyOtpParams, VerifyOtpTool};
