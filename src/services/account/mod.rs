mod registrar;

pub use registrar::{AccountDraft, AccountRegistrar, RegistrationError};
