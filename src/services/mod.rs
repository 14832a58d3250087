/*
 * Responsibility
 * - アプリのビジネスロジック (token 検証 / アカウント作成)
 */
pub mod account;
pub mod auth;
