/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: bearer token 検証 (access filter)
 * - http: request id / trace / limit / timeout / CORS
 */
pub mod auth;
pub mod http;
