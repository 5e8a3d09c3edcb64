//! Page components.

pub mod login;
pub mod settings;
