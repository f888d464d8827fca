pub mod config;
pub mod forgot_password;
pub mod login;
pub mod logout;
pub mod status;
