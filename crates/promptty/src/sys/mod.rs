#[cfg(target_family = "unix")]
pub(crate) type RawHandle = std::os::fd::RawFd;
#[cfg(target_family = "windows")]
pub(crate) type RawHandle = std::os::windows::io::RawHandle;

mod util;
#[cfg(target_family = "unix")]
mod unix;
#[cfg(target_family = "windows")]
mod windows;

#[cfg(target_family = "unix")]
pub use self::unix::{AlarmWait, TtyKeystrokes};
#[cfg(target_family = "unix")]
pub(crate) use self::unix::{exit_now, select, terminal_size, InterruptHandler};
#[cfg(all(test, target_family = "unix"))]
pub(crate) use self::unix::test;
#[cfg(target_family = "windows")]
pub use self::windows::ConsoleKeystrokes;
#[cfg(target_family = "windows")]
pub(crate) use self::windows::{exit_now, select, terminal_size, InterruptHandler};
