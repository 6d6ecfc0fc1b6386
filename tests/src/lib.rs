//! # Web3 Session Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── support.rs         # Recording timer service, service builders
//!     ├── lifecycle.rs       # connect / authenticate / disconnect scenarios
//!     ├── health_checks.rs   # silent loss of a guarantee
//!     └── initialization.rs  # settings, providers, injected transport, signer
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p web3-session-tests
//! cargo test -p web3-session-tests integration::health_checks::
//! ```

pub mod integration;
