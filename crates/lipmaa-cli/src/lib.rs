//! Lipmaa command-line tool.
//!
//! Inspects lipmaa addressing, builds signed logs into CBOR files and
//! verifies them along their skip links.
//!
//! ## Architecture
//!
//! ```text
//! lipmaa-cli
//!   ├─ Command       (clap subcommands)
//!   ├─ run           (dispatch, output to any io::Write)
//!   ├─ SystemClock   (production Clock impl)
//!   └─ MemoryLog     (log file loaded for verification)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod commands;
mod error;
mod system_clock;

pub use commands::{Command, Outcome, load_log, parse_seed, run};
pub use error::CliError;
pub use system_clock::SystemClock;
