//! # Prompt 🌸 Tty
//!
//! This crate provides **console prompts with timeouts and defaults**, plus a
//! small library of ANSI escape sequences for console output. Besides the
//! [`log`](https://crates.io/crates/log) facade, its only dependencies are
//! the low-level crates enabling system calls, i.e.,
//! [`libc`](https://crates.io/crates/libc) on Unix and
//! [`windows-sys`](https://crates.io/crates/windows-sys) on Windows.
//!
//! Prompting with a timeout is easy:
//!
//!   * Describe the prompt with a [`PromptRequest`].
//!   * Open a [`TimedLineReader`].
//!   * Call [`TimedLineReader::read`] and receive a [`PromptResult`].
//!
//! If you need just one answer, [`read_line_with_timeout`] and
//! [`read_args_with_timeout`] do all three steps at once.
//!
//! The reader waits for input with one of two strategies, chosen once when
//! the reader is created. On Unix, the **alarm** strategy arms a one-shot
//! timer before a blocking read. Its timeout is a hard deadline and partial
//! input is discarded upon expiry. The **polling** strategy, the only option
//! on Windows, checks for keystrokes every few milliseconds. Its timeout is
//! an idle timeout that restarts with every keystroke and partial input is
//! returned upon expiry. The [`opt`] module explains how to pick one.
//!
//! An [`InterruptPolicy`] asks whether to continue or exit after control-c.
//! The [`cmd`] module provides commands for moving the cursor, erasing (parts
//! of) the screen, scrolling, and styling text. A [`Console`] combines them
//! into higher-level operations with positions checked against the terminal
//! size.
//!
//!
//! # Example
//!
//! ```no_run
//! # use std::time::Duration;
//! # use promptty::read_line_with_timeout;
//! // Returns "n" if nobody answers within 5 seconds.
//! let answer = read_line_with_timeout(
//!     "Overwrite file (y/n)? ",
//!     &["y", "n"],
//!     Some("n"),
//!     Some(Duration::from_secs(5)),
//! )?;
//!
//! if answer == "y" {
//!     // Overwrite file...
//! }
//! # Ok::<(), promptty::err::Error>(())
//! ```
//!
//!
//! # Logging
//!
//! The crate logs the selected strategy, expired prompts, rejected responses,
//! and interrupt escalations through the [`log`](https://docs.rs/log) facade
//! at debug and trace levels. It never installs a logger.

mod api;
pub mod cmd;
pub mod console;
pub mod err;
mod interrupt;
pub mod opt;
#[cfg(target_family = "unix")]
mod read;
mod reader;
pub mod request;
mod sys;
#[cfg(target_family = "unix")]
mod utf8;
pub mod util;
pub mod wait;

pub use api::{Command, Sgr};
pub use console::Console;
pub use interrupt::{Decision, InterruptGuard, InterruptPolicy};
pub use reader::{read_args_with_timeout, read_line_with_timeout, TimedLineReader};
pub use request::{PromptRequest, PromptResult};

#[cfg(target_family = "unix")]
pub use sys::{AlarmWait, TtyKeystrokes};
#[cfg(target_family = "windows")]
pub use sys::ConsoleKeystrokes;
