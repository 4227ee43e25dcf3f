//! TokenGate Token
//!
//! A permissioned token: balances move only to identity-verified wallets
//! and only when the bound compliance engine agrees.

pub mod token;

pub use token::Token;
