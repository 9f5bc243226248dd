//! Subcommand handlers.
//!
//! | File          | Invocation              | Description                        |
//! |---------------|-------------------------|------------------------------------|
//! | `init.rs`     | `mongo-dumper init`     | Scaffold a `conf.json`             |
//! | `run.rs`      | `mongo-dumper`          | Dump once or start the scheduler   |

pub mod init;
pub mod run;
