/*
 * Responsibility
 * - アカウントに紐づく閉じた列挙型 (AuthProvider / Role)
 * - wire code <-> variant の対応表を持つ
 */
mod provider;
mod role;

pub use provider::{AuthProvider, UnknownProvider};
pub use role::Role;
