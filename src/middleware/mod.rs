/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: cookie / Bearer の token 検証, role gate
 * - cors / http / security_headers: Router 全体に掛ける横断的関心事
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
