pub mod access;
pub mod authenticator;
