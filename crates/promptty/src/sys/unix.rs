use std::ffi::c_void;
use std::io::{self, Read, Write};
use std::mem::MaybeUninit;
use std::ptr::{from_mut, from_ref, null, null_mut};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use log::{debug, trace};

use super::{util::IntoResult, RawHandle};
use crate::err::{Error, ErrorKind, Result};
use crate::opt::{Options, Strategy};
use crate::read::DoggedReader;
use crate::utf8::CharAssembler;
use crate::wait::{Keystrokes, PollingWait, TimedWait, Wait};

// ----------------------------------------------------------------------------------------------------------

/// Select the waiting strategy for the options.
///
/// Unix has `SIGALRM`, so the alarm strategy is the default. The polling
/// strategy requires standard input to be a terminal.
pub(crate) fn select(options: &Options) -> Result<Box<dyn TimedWait>> {
    match options.strategy() {
        Strategy::Auto | Strategy::Alarm => Ok(Box::new(AlarmWait::new())),
        Strategy::Polling => Ok(Box::new(PollingWait::new(TtyKeystrokes::open()?, options))),
    }
}

/// Terminate the process right away, without unwinding or exit handlers.
pub(crate) fn exit_now(code: i32) -> ! {
    // SAFETY: _exit has no preconditions and never returns.
    unsafe { libc::_exit(code) }
}

/// Query the terminal size as rows and columns.
pub(crate) fn terminal_size() -> Option<(u16, u16)> {
    // SAFETY: winsize is plain old data and ioctl only writes into it.
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };
    let status = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, from_mut(&mut size)) };

    if status == 0 && 0 < size.ws_row && 0 < size.ws_col {
        Some((size.ws_row, size.ws_col))
    } else {
        None
    }
}

// ----------------------------------------------------------------------------------------------------------

/// Raw unbuffered console input.
#[derive(Debug)]
struct RawInput {
    handle: RawHandle,
}

impl RawInput {
    fn new(handle: RawHandle) -> Self {
        Self { handle }
    }

    #[inline]
    fn handle(&self) -> RawHandle {
        self.handle
    }

    /// Discard input that has been received but not read.
    fn discard_pending(&self) {
        // Fails for pipes and files, which is fine.
        let _ = unsafe { libc::tcflush(self.handle, libc::TCIFLUSH) };
    }
}

impl Read for RawInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        unsafe {
            libc::read(
                self.handle,
                buf.as_mut_ptr() as *mut c_void,
                buf.len() as libc::size_t,
            )
        }
        .into_result()
    }
}

/// Turn the bytes of a line without line feed into a string.
fn finish_line(mut bytes: Vec<u8>) -> Result<String> {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|_| ErrorKind::MalformedUtf8.into())
}

// ----------------------------------------------------------------------------------------------------------

static ALARM_ACTIVE: AtomicBool = AtomicBool::new(false);
static ALARM_FIRED: AtomicBool = AtomicBool::new(false);
static ALARM_THREAD: AtomicUsize = AtomicUsize::new(0);
static ALARM_FORWARDING: AtomicUsize = AtomicUsize::new(0);

/// The longest timer setitimer accepts everywhere, a little over three years.
const MAX_TIMER_SECS: u64 = 100_000_000;

extern "C" fn on_alarm(_signal: libc::c_int) {
    ALARM_FIRED.store(true, Ordering::SeqCst);

    // The kernel may deliver the process-wide signal to any thread that does
    // not block it. Forward it to the reading thread, which has it blocked
    // outside of pselect and hence receives it exactly while waiting. The
    // forwarding count keeps the alarm's drop from restoring the previous
    // disposition while the forwarded signal is still on its way.
    ALARM_FORWARDING.fetch_add(1, Ordering::SeqCst);
    let target = ALARM_THREAD.load(Ordering::SeqCst);
    if target != 0 {
        let target = target as libc::pthread_t;
        // SAFETY: pthread_self and pthread_kill are async-signal-safe.
        unsafe {
            if libc::pthread_self() != target {
                libc::pthread_kill(target, libc::SIGALRM);
            }
        }
    }
    ALARM_FORWARDING.fetch_sub(1, Ordering::SeqCst);
}

fn set_timer(value: Duration) -> Result<()> {
    let secs = value.as_secs().min(MAX_TIMER_SECS);
    let timer = libc::itimerval {
        it_interval: libc::timeval {
            tv_sec: 0,
            tv_usec: 0,
        },
        it_value: libc::timeval {
            tv_sec: libc::time_t::try_from(secs).unwrap_or(libc::time_t::MAX),
            tv_usec: value.subsec_micros() as libc::suseconds_t,
        },
    };

    unsafe { libc::setitimer(libc::ITIMER_REAL, from_ref(&timer), null_mut()) }.into_result()?;
    Ok(())
}

/// An armed one-shot alarm.
///
/// While the alarm exists, `SIGALRM` is handled by this module and blocked
/// in the arming thread. Dropping the alarm disarms the timer, waits for
/// signals being forwarded from other threads, restores the thread's signal
/// mask, and then restores the previous signal disposition, in that order.
struct Alarm {
    previous_action: libc::sigaction,
    previous_mask: libc::sigset_t,
    wait_mask: libc::sigset_t,
}

impl Alarm {
    /// Arm an alarm firing after the timeout.
    fn arm(timeout: Duration) -> Result<Self> {
        if ALARM_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(ErrorKind::InFlight.into());
        }

        ALARM_FIRED.store(false, Ordering::SeqCst);
        ALARM_THREAD.store(unsafe { libc::pthread_self() } as usize, Ordering::SeqCst);

        let (previous_mask, wait_mask) = match Self::block() {
            Ok(masks) => masks,
            Err(error) => {
                ALARM_ACTIVE.store(false, Ordering::SeqCst);
                return Err(error);
            }
        };

        // SAFETY: An all-zero sigaction is valid. Its mask is emptied below.
        let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
        action.sa_sigaction = on_alarm as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = 0;
        unsafe { libc::sigemptyset(from_mut(&mut action.sa_mask)) };

        let mut previous_action = MaybeUninit::uninit();
        let status = unsafe {
            libc::sigaction(libc::SIGALRM, from_ref(&action), previous_action.as_mut_ptr())
        }
        .into_result();
        if let Err(error) = status {
            unsafe { libc::pthread_sigmask(libc::SIG_SETMASK, from_ref(&previous_mask), null_mut()) };
            ALARM_ACTIVE.store(false, Ordering::SeqCst);
            return Err(error.into());
        }

        // From here on, drop undoes everything.
        let this = Self {
            previous_action: unsafe { previous_action.assume_init() },
            previous_mask,
            wait_mask,
        };

        // A zero timer value disarms, so always ask for at least 1µs.
        set_timer(timeout.max(Duration::from_micros(1)))?;
        trace!("armed alarm for {:?}", timeout);
        Ok(this)
    }

    /// Block `SIGALRM` in the current thread.
    ///
    /// This function returns the previous mask and the mask for waiting.
    fn block() -> Result<(libc::sigset_t, libc::sigset_t)> {
        let mut blocked = MaybeUninit::uninit();
        let mut previous = MaybeUninit::uninit();

        let status = unsafe {
            libc::sigemptyset(blocked.as_mut_ptr());
            libc::sigaddset(blocked.as_mut_ptr(), libc::SIGALRM);
            libc::pthread_sigmask(libc::SIG_BLOCK, blocked.as_ptr(), previous.as_mut_ptr())
        };
        if status != 0 {
            return Err(io::Error::from_raw_os_error(status).into());
        }

        let previous = unsafe { previous.assume_init() };
        let mut waiting = previous;
        unsafe { libc::sigdelset(from_mut(&mut waiting), libc::SIGALRM) };
        Ok((previous, waiting))
    }

    /// Determine whether the alarm fired.
    fn fired(&self) -> bool {
        ALARM_FIRED.load(Ordering::SeqCst)
    }

    /// Wait until the input is readable.
    ///
    /// `SIGALRM` is unblocked only for the duration of the wait. This method
    /// returns `false` if the wait was interrupted by any signal.
    fn wait_readable(&self, handle: RawHandle) -> Result<bool> {
        // SAFETY: fd_set is plain old data and initialized by FD_ZERO.
        let mut readable: libc::fd_set = unsafe { std::mem::zeroed() };
        unsafe {
            libc::FD_ZERO(from_mut(&mut readable));
            libc::FD_SET(handle, from_mut(&mut readable));
        }

        let status = unsafe {
            libc::pselect(
                handle + 1,
                from_mut(&mut readable),
                null_mut(),
                null_mut(),
                null(),
                from_ref(&self.wait_mask),
            )
        };

        if status == -1 {
            let error = io::Error::last_os_error();
            if error.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(error.into());
        }
        Ok(true)
    }
}

impl Drop for Alarm {
    fn drop(&mut self) {
        let _ = set_timer(Duration::ZERO);
        ALARM_THREAD.store(0, Ordering::SeqCst);
        while ALARM_FORWARDING.load(Ordering::SeqCst) != 0 {
            std::hint::spin_loop();
        }

        // A pending SIGALRM is delivered to on_alarm once unblocked.
        unsafe {
            libc::pthread_sigmask(libc::SIG_SETMASK, from_ref(&self.previous_mask), null_mut());
            libc::sigaction(libc::SIGALRM, from_ref(&self.previous_action), null_mut());
        }
        ALARM_ACTIVE.store(false, Ordering::SeqCst);
        trace!("disarmed alarm");
    }
}

/// The signal-deadline strategy.
///
/// This strategy arms a one-shot `SIGALRM` for the timeout and then performs
/// a blocking line read. If the alarm fires first, the read is abandoned, any
/// partially entered line is discarded, and the read expires. The deadline is
/// measured from the start of the read and never extended.
///
/// Since the process has only one real-time interval timer, only one timed
/// read may be in flight at any time. Attempting a second one concurrently
/// fails with [`ErrorKind::InFlight`].
#[derive(Debug)]
pub struct AlarmWait {
    input: RawInput,
}

impl AlarmWait {
    /// Create a new alarm strategy reading from standard input.
    pub fn new() -> Self {
        Self::with_handle(libc::STDIN_FILENO)
    }

    /// Create a new alarm strategy reading from the file descriptor.
    ///
    /// The strategy does not take ownership of the file descriptor.
    pub fn with_handle(handle: RawHandle) -> Self {
        Self {
            input: RawInput::new(handle),
        }
    }
}

impl Default for AlarmWait {
    fn default() -> Self {
        Self::new()
    }
}

impl TimedWait for AlarmWait {
    fn name(&self) -> &'static str {
        "alarm"
    }

    fn read_line(&mut self, _echo: &mut dyn Write) -> Result<String> {
        let mut reader = DoggedReader::new(&mut self.input);
        let mut line = Vec::new();
        let mut byte = [0; 1];

        loop {
            if reader.read(&mut byte)? == 0 {
                break;
            } else if byte[0] == b'\n' {
                return finish_line(line);
            }
            line.push(byte[0]);
        }

        if line.is_empty() {
            Err(ErrorKind::EndOfInput.into())
        } else {
            finish_line(line)
        }
    }

    fn read_line_within(&mut self, _echo: &mut dyn Write, timeout: Duration) -> Result<Wait> {
        let alarm = Alarm::arm(timeout)?;
        let mut line = Vec::new();
        let mut byte = [0; 1];

        loop {
            if alarm.fired() {
                drop(alarm);
                self.input.discard_pending();
                debug!("alarm fired, discarding {} bytes of input", line.len());
                return Ok(Wait::Expired);
            } else if !alarm.wait_readable(self.input.handle())? {
                continue;
            }

            match self.input.read(&mut byte) {
                Ok(0) if line.is_empty() => return Err(ErrorKind::EndOfInput.into()),
                Ok(0) => return finish_line(line).map(Wait::Line),
                Ok(_) if byte[0] == b'\n' => return finish_line(line).map(Wait::Line),
                Ok(_) => line.push(byte[0]),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            }
        }
    }
}

// ----------------------------------------------------------------------------------------------------------

/// A terminal configuration.
#[derive(Clone, Copy)]
struct Config {
    state: libc::termios,
}

impl Config {
    /// Read the configuration.
    fn read(input: &RawInput) -> io::Result<Self> {
        let mut state = MaybeUninit::uninit();
        unsafe { libc::tcgetattr(input.handle(), state.as_mut_ptr()) }.into_result()?;
        Ok(Self {
            state: unsafe { state.assume_init() },
        })
    }

    /// Derive the configuration for polling keystrokes.
    ///
    /// The line editor and echo are disabled, while signal keys such as
    /// control-c keep working. Reads return right away, even without data.
    fn polling(&self) -> Self {
        let mut state = self.state;
        state.c_lflag &= !(libc::ECHO | libc::ICANON);
        state.c_cc[libc::VMIN] = 0;
        state.c_cc[libc::VTIME] = 0;
        Self { state }
    }

    /// Write the configuration.
    fn write(&self, input: &RawInput) -> io::Result<()> {
        // TCSANOW keeps keys typed ahead of the prompt.
        unsafe { libc::tcsetattr(input.handle(), libc::TCSANOW, from_ref(&self.state)) }
            .into_result()?;
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Termios")
            .field("echo", &(self.state.c_lflag & libc::ECHO != 0))
            .field("icanon", &(self.state.c_lflag & libc::ICANON != 0))
            .field("vmin", &self.state.c_cc[libc::VMIN])
            .field("vtime", &self.state.c_cc[libc::VTIME])
            .finish()
    }
}

/// Keystrokes read from a terminal without blocking.
///
/// While activated, the terminal is in non-canonical mode without echo and
/// with `VMIN` and `VTIME` both zero. Deactivating restores the previous
/// configuration.
#[derive(Debug)]
pub struct TtyKeystrokes {
    input: RawInput,
    saved: Option<Config>,
    assembler: CharAssembler,
}

impl TtyKeystrokes {
    /// Open keystrokes on standard input.
    ///
    /// This method fails with [`ErrorKind::PlatformUnavailable`] if standard
    /// input is not a terminal.
    pub fn open() -> Result<Self> {
        Self::with_handle(libc::STDIN_FILENO)
    }

    /// Open keystrokes on the terminal file descriptor.
    pub fn with_handle(handle: RawHandle) -> Result<Self> {
        let input = RawInput::new(handle);
        Config::read(&input).map_err(Error::unavailable)?;
        Ok(Self {
            input,
            saved: None,
            assembler: CharAssembler::new(),
        })
    }
}

impl Keystrokes for TtyKeystrokes {
    fn activate(&mut self) -> Result<()> {
        let config = Config::read(&self.input)?;
        config.polling().write(&self.input)?;
        self.saved = Some(config);
        Ok(())
    }

    fn deactivate(&mut self) {
        if let Some(config) = self.saved.take() {
            let _ = config.write(&self.input);
        }
    }

    fn poll_key(&mut self) -> Result<Option<char>> {
        let mut byte = [0; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    if let Some(key) = self.assembler.push(byte[0])? {
                        return Ok(Some(key));
                    }
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => return Ok(None),
                Err(error) => return Err(error.into()),
            }
        }
    }
}

// ----------------------------------------------------------------------------------------------------------

static INTERRUPT_INSTALLED: AtomicBool = AtomicBool::new(false);
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// A registered `SIGINT` handler that only records interrupts.
///
/// Dropping the handler restores the previous disposition.
#[derive(Debug)]
pub(crate) struct InterruptHandler {
    previous: Option<libc::sigaction>,
}

impl InterruptHandler {
    /// Install the handler.
    pub fn install() -> Result<Self> {
        if INTERRUPT_INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(ErrorKind::InFlight.into());
        }

        INTERRUPTED.store(false, Ordering::SeqCst);
        // SAFETY: An all-zero sigaction is valid. Its mask is emptied below.
        let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
        action.sa_sigaction = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        unsafe { libc::sigemptyset(from_mut(&mut action.sa_mask)) };

        let mut previous = MaybeUninit::uninit();
        let status =
            unsafe { libc::sigaction(libc::SIGINT, from_ref(&action), previous.as_mut_ptr()) }
                .into_result();
        if let Err(error) = status {
            INTERRUPT_INSTALLED.store(false, Ordering::SeqCst);
            return Err(error.into());
        }

        Ok(Self {
            previous: Some(unsafe { previous.assume_init() }),
        })
    }

    /// Consume a recorded interrupt.
    pub fn take_pending() -> bool {
        INTERRUPTED.swap(false, Ordering::SeqCst)
    }
}

impl Drop for InterruptHandler {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            unsafe { libc::sigaction(libc::SIGINT, from_ref(&previous), null_mut()) };
        }
        INTERRUPT_INSTALLED.store(false, Ordering::SeqCst);
    }
}

// =====================================================================================
