mod signup_wizard;

pub use signup_wizard::run_signup_wizard;
