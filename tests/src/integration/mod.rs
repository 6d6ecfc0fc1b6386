//! Cross-module scenarios driven through the public `web3_session` API.

pub mod support;

mod health_checks;
mod initialization;
mod lifecycle;
