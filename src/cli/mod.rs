//! # CLI Module
//!
//! Command-line tools for operation manifests, shipped as the `restwire` binary.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! List operations in registration (and therefore matching) order:
//!
//! ```bash
//! restwire routes --manifest operations.yaml
//! ```
//!
//! ### `check`
//!
//! Validate every operation's parameters, path template and methods; exits non-zero when
//! anything is wrong:
//!
//! ```bash
//! restwire check --manifest operations.yaml
//! ```
//!
//! ### `probe`
//!
//! Run the matching algorithm for one request without invoking handlers. Prints the
//! selected handler, captured path parameters and negotiated media type, or the fallback
//! status:
//!
//! ```bash
//! restwire probe --manifest operations.yaml --method POST --path /pets \
//!     -H 'Content-Type: application/json' -H 'Accept: application/*'
//! ```

mod commands;


pub use commands::{check_descriptors, probe, render_routes, run_cli, Cli, Commands};
