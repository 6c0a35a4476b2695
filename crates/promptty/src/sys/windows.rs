use std::collections::VecDeque;
use std::mem::MaybeUninit;
use std::ptr::from_mut;
use std::sync::atomic::{AtomicBool, Ordering};

use windows_sys::Win32::Foundation::{self, BOOL};
use windows_sys::Win32::System::Console::{self, CONSOLE_MODE as ConsoleMode, INPUT_RECORD};
use windows_sys::Win32::System::Threading;

use super::{util::IntoResult, RawHandle};
use crate::err::{Error, ErrorKind, Result};
use crate::opt::{Options, Strategy};
use crate::wait::{Keystrokes, PollingWait, TimedWait};

// ----------------------------------------------------------------------------------------------------------

/// Select the waiting strategy for the options.
///
/// Windows has no `SIGALRM`, so asking for the alarm strategy fails with
/// [`ErrorKind::PlatformUnavailable`].
pub(crate) fn select(options: &Options) -> Result<Box<dyn TimedWait>> {
    match options.strategy() {
        Strategy::Alarm => Err(ErrorKind::PlatformUnavailable.into()),
        Strategy::Auto | Strategy::Polling => {
            Ok(Box::new(PollingWait::new(ConsoleKeystrokes::open()?, options)))
        }
    }
}

/// Terminate the process right away.
pub(crate) fn exit_now(code: i32) -> ! {
    unsafe { Threading::ExitProcess(code as u32) }
}

/// Query the size of the console window as rows and columns.
pub(crate) fn terminal_size() -> Option<(u16, u16)> {
    let output = unsafe { Console::GetStdHandle(Console::STD_OUTPUT_HANDLE) };
    let mut info = MaybeUninit::uninit();
    unsafe { Console::GetConsoleScreenBufferInfo(output, info.as_mut_ptr()) }
        .into_result()
        .ok()?;

    let window = unsafe { info.assume_init() }.srWindow;
    let rows = window.Bottom - window.Top + 1;
    let cols = window.Right - window.Left + 1;
    if 0 < rows && 0 < cols {
        Some((rows as u16, cols as u16))
    } else {
        None
    }
}

// ----------------------------------------------------------------------------------------------------------

/// Keystrokes read from the console input buffer without blocking.
///
/// Only key-down events carrying a character count as keystrokes. Surrogate
/// pairs are combined into one character and repeated keys are expanded.
#[derive(Debug)]
pub struct ConsoleKeystrokes {
    handle: RawHandle,
    pending: VecDeque<char>,
    high_surrogate: Option<u16>,
}

impl ConsoleKeystrokes {
    /// Open keystrokes on standard input.
    ///
    /// This method fails with [`ErrorKind::PlatformUnavailable`] if standard
    /// input is not a console.
    pub fn open() -> Result<Self> {
        let handle = unsafe { Console::GetStdHandle(Console::STD_INPUT_HANDLE) };
        if handle.is_null() || handle == Foundation::INVALID_HANDLE_VALUE {
            return Err(ErrorKind::PlatformUnavailable.into());
        }

        let mut mode: ConsoleMode = 0;
        unsafe { Console::GetConsoleMode(handle, from_mut(&mut mode)) }
            .into_result()
            .map_err(Error::unavailable)?;

        Ok(Self {
            handle,
            pending: VecDeque::new(),
            high_surrogate: None,
        })
    }

    fn available(&self) -> Result<u32> {
        let mut count = 0;
        unsafe { Console::GetNumberOfConsoleInputEvents(self.handle, from_mut(&mut count)) }
            .into_result()?;
        Ok(count)
    }

    fn read_record(&self) -> Result<Option<INPUT_RECORD>> {
        let mut record = MaybeUninit::uninit();
        let mut count = 0;
        unsafe {
            Console::ReadConsoleInputW(self.handle, record.as_mut_ptr(), 1, from_mut(&mut count))
        }
        .into_result()?;

        if count == 0 {
            Ok(None)
        } else {
            Ok(Some(unsafe { record.assume_init() }))
        }
    }

    fn accept(&mut self, record: &INPUT_RECORD) {
        if u32::from(record.EventType) != u32::from(Console::KEY_EVENT) {
            return;
        }

        // SAFETY: The event type says this is a key event.
        let event = unsafe { record.Event.KeyEvent };
        let unit = unsafe { event.uChar.UnicodeChar };
        if event.bKeyDown == 0 || unit == 0 {
            return;
        }

        let units = match self.high_surrogate.take() {
            Some(high) => vec![high, unit],
            None if (0xd800..0xdc00).contains(&unit) => {
                self.high_surrogate = Some(unit);
                return;
            }
            None => vec![unit],
        };

        let repeat = event.wRepeatCount.max(1);
        for key in char::decode_utf16(units).flatten() {
            for _ in 0..repeat {
                self.pending.push_back(key);
            }
        }
    }
}

impl Keystrokes for ConsoleKeystrokes {
    fn poll_key(&mut self) -> Result<Option<char>> {
        loop {
            if let Some(key) = self.pending.pop_front() {
                return Ok(Some(key));
            } else if self.available()? == 0 {
                return Ok(None);
            }

            match self.read_record()? {
                Some(record) => self.accept(&record),
                None => return Ok(None),
            }
        }
    }
}

// ----------------------------------------------------------------------------------------------------------

static INTERRUPT_INSTALLED: AtomicBool = AtomicBool::new(false);
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

unsafe extern "system" fn on_control(event: u32) -> BOOL {
    if event == Console::CTRL_C_EVENT {
        INTERRUPTED.store(true, Ordering::SeqCst);
        1
    } else {
        0
    }
}

/// A registered console control handler that only records control-c.
///
/// Dropping the handler unregisters it again.
#[derive(Debug)]
pub(crate) struct InterruptHandler {
    _private: (),
}

impl InterruptHandler {
    /// Install the handler.
    pub fn install() -> Result<Self> {
        if INTERRUPT_INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(ErrorKind::InFlight.into());
        }

        INTERRUPTED.store(false, Ordering::SeqCst);
        let status = unsafe { Console::SetConsoleCtrlHandler(Some(on_control), 1) }.into_result();
        if let Err(error) = status {
            INTERRUPT_INSTALLED.store(false, Ordering::SeqCst);
            return Err(Error::from(error));
        }
        Ok(Self { _private: () })
    }

    /// Consume a recorded interrupt.
    pub fn take_pending() -> bool {
        INTERRUPTED.swap(false, Ordering::SeqCst)
    }
}

impl Drop for InterruptHandler {
    fn drop(&mut self) {
        let _ = unsafe { Console::SetConsoleCtrlHandler(Some(on_control), 0) };
        INTERRUPT_INSTALLED.store(false, Ordering::SeqCst);
    }
}
