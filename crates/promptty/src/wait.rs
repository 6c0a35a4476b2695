//! Waiting strategies for reading a line with a deadline.
//!
//! A [`TimedWait`] reads one line of console input, either without any limit
//! or within a timeout. Two strategies implement the trait:
//!
//!   * [`PollingWait`] polls a [`Keystrokes`] source at a short interval and
//!     treats the timeout as an idle timeout, extending the deadline with every
//!     keystroke and returning partial input on expiry.
//!   * `AlarmWait`, available on Unix only, arms a one-shot interval timer
//!     before a single blocking read. Its deadline is never extended and
//!     partial input is discarded on expiry.
//!
//! The two strategies deliberately differ in their timeout semantics. Callers
//! pick one through [`Strategy`](crate::opt::Strategy), which is resolved once
//! when creating a [`TimedLineReader`](crate::TimedLineReader).

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use log::trace;

use crate::err::{ErrorKind, Result};
use crate::opt::Options;

/// The outcome of waiting for a line with a deadline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Wait {
    /// A line of input without terminator.
    ///
    /// For the polling strategy, this may also be partial input that was
    /// pending when the idle timeout expired.
    Line(String),
    /// The deadline passed without producing a line.
    Expired,
}

/// A strategy for reading lines with and without deadline.
///
/// Only one timed read may be in flight at any time. Strategies backed by
/// process-wide facilities fail with [`ErrorKind::InFlight`] when asked to
/// nest reads.
pub trait TimedWait {
    /// Get a short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Read a line, blocking until the line terminator arrives.
    ///
    /// Strategies that handle echoing themselves write to `echo`.
    fn read_line(&mut self, echo: &mut dyn Write) -> Result<String>;

    /// Read a line within the given timeout.
    fn read_line_within(&mut self, echo: &mut dyn Write, timeout: Duration) -> Result<Wait>;
}

/// A boxed strategy is a strategy.
impl<T: TimedWait + ?Sized> TimedWait for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn read_line(&mut self, echo: &mut dyn Write) -> Result<String> {
        (**self).read_line(echo)
    }

    fn read_line_within(&mut self, echo: &mut dyn Write, timeout: Duration) -> Result<Wait> {
        (**self).read_line_within(echo, timeout)
    }
}

// ------------------------------------------------------------------------------------------------

/// A source of keystrokes that can be checked without blocking.
pub trait Keystrokes {
    /// Prepare the source for polling.
    ///
    /// Every successful activation is matched by exactly one call to
    /// [`Keystrokes::deactivate`].
    fn activate(&mut self) -> Result<()> {
        Ok(())
    }

    /// Undo the preparations made by [`Keystrokes::activate`].
    fn deactivate(&mut self) {}

    /// Get the next pending keystroke, if any, without blocking.
    fn poll_key(&mut self) -> Result<Option<char>>;
}

/// An activated keystroke source, which is deactivated again on drop.
struct Active<'a, K: Keystrokes + ?Sized>(&'a mut K);

impl<'a, K: Keystrokes + ?Sized> Active<'a, K> {
    fn new(keys: &'a mut K) -> Result<Self> {
        keys.activate()?;
        Ok(Self(keys))
    }

    fn poll_key(&mut self) -> Result<Option<char>> {
        self.0.poll_key()
    }
}

impl<K: Keystrokes + ?Sized> Drop for Active<'_, K> {
    fn drop(&mut self) {
        self.0.deactivate();
    }
}

fn is_terminator(key: char) -> bool {
    key == '\r' || key == '\n'
}

fn is_backspace(key: char) -> bool {
    key == '\x08' || key == '\x7f'
}

fn show(echo: &mut dyn Write, enabled: bool, text: &str) -> Result<()> {
    if enabled {
        echo.write_all(text.as_bytes())?;
        echo.flush()?;
    }
    Ok(())
}

/// Determine the deadline for the timeout, starting now.
///
/// A timeout too large to represent as an instant has no deadline.
fn deadline_after(timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|timeout| Instant::now().checked_add(timeout))
}

/// The cooperative polling strategy.
///
/// This strategy checks for pending keystrokes, drains them into the line
/// buffer, and then sleeps for the poll interval before checking again. Each
/// keystroke, including backspace, resets the deadline to now plus timeout.
/// A carriage return or line feed completes the line, with a line feed right
/// after a carriage return being part of the same terminator. When the
/// deadline passes, accumulated input is returned as the line. Only without
/// any input does the read expire.
///
/// Malformed keystrokes are skipped.
#[derive(Debug)]
pub struct PollingWait<K> {
    keys: K,
    interval: Duration,
    echo: bool,
    after_cr: bool,
}

impl<K: Keystrokes> PollingWait<K> {
    /// Create a new polling strategy for the keystroke source.
    pub fn new(keys: K, options: &Options) -> Self {
        Self {
            keys,
            interval: options.poll_interval(),
            echo: options.echo(),
            after_cr: false,
        }
    }

    /// Get the keystroke source.
    pub fn keys(&self) -> &K {
        &self.keys
    }

    fn collect(&mut self, echo: &mut dyn Write, timeout: Option<Duration>) -> Result<Wait> {
        let (interval, echoing) = (self.interval, self.echo);
        let mut keys = Active::new(&mut self.keys)?;
        let mut line = String::new();
        let mut deadline = deadline_after(timeout);

        loop {
            loop {
                let key = match keys.poll_key() {
                    Ok(Some(key)) => key,
                    Ok(None) => break,
                    Err(error) if error.kind() == ErrorKind::MalformedUtf8 => {
                        trace!("skipping malformed keystroke");
                        continue;
                    }
                    Err(error) => return Err(error),
                };

                // The line feed of a CRLF pair may arrive with the next read.
                if core::mem::replace(&mut self.after_cr, key == '\r') && key == '\n' {
                    continue;
                }

                if is_terminator(key) {
                    show(echo, echoing, "\r\n")?;
                    return Ok(Wait::Line(line));
                } else if is_backspace(key) {
                    if line.pop().is_some() {
                        show(echo, echoing, "\x08 \x08")?;
                    }
                } else {
                    line.push(key);
                    let mut buffer = [0; 4];
                    show(echo, echoing, key.encode_utf8(&mut buffer))?;
                }

                if timeout.is_some() {
                    deadline = deadline_after(timeout);
                }
            }

            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if deadline <= now {
                        break;
                    }
                    interval.min(deadline - now)
                }
                None => interval,
            };
            thread::sleep(pause);
        }

        if line.is_empty() {
            trace!("polling wait expired without input");
            Ok(Wait::Expired)
        } else {
            trace!("polling wait idled out with {} chars", line.chars().count());
            show(echo, echoing, "\r\n")?;
            Ok(Wait::Line(line))
        }
    }
}

impl<K: Keystrokes> TimedWait for PollingWait<K> {
    fn name(&self) -> &'static str {
        "polling"
    }

    fn read_line(&mut self, echo: &mut dyn Write) -> Result<String> {
        match self.collect(echo, None)? {
            Wait::Line(line) => Ok(line),
            Wait::Expired => Err(ErrorKind::Timeout.into()),
        }
    }

    fn read_line_within(&mut self, echo: &mut dyn Write, timeout: Duration) -> Result<Wait> {
        self.collect(echo, Some(timeout))
    }
}

// =====================================================================================

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::collections::VecDeque;

    /// A keystroke source replaying a script, one entry per poll.
    ///
    /// `None` entries stand for polls without a pending key. After the
    /// script runs out, no more keys arrive.
    #[derive(Debug, Default)]
    pub(crate) struct Script {
        keys: VecDeque<Option<char>>,
        pub activations: usize,
        pub deactivations: usize,
    }

    impl Script {
        pub fn new<I: IntoIterator<Item = Option<char>>>(keys: I) -> Self {
            Self {
                keys: keys.into_iter().collect(),
                ..Self::default()
            }
        }

        pub fn typing(text: &str) -> Self {
            Self::new(text.chars().map(Some))
        }
    }

    impl Keystrokes for Script {
        fn activate(&mut self) -> Result<()> {
            self.activations += 1;
            Ok(())
        }

        fn deactivate(&mut self) {
            self.deactivations += 1;
        }

        fn poll_key(&mut self) -> Result<Option<char>> {
            Ok(self.keys.pop_front().flatten())
        }
    }

    /// A keystroke source that yields `a`, `b`, a malformed key, and then `c`
    /// followed by carriage return.
    #[derive(Debug, Default)]
    struct Garbled(usize);

    impl Keystrokes for Garbled {
        fn poll_key(&mut self) -> Result<Option<char>> {
            self.0 += 1;
            match self.0 {
                1 => Ok(Some('a')),
                2 => Ok(Some('b')),
                3 => Err(ErrorKind::MalformedUtf8.into()),
                4 => Ok(Some('c')),
                5 => Ok(Some('\r')),
                _ => Ok(None),
            }
        }
    }

    fn options(interval: u64) -> Options {
        Options::builder()
            .poll_interval(Duration::from_millis(interval))
            .build()
    }

    #[test]
    fn test_terminated_line() -> Result<()> {
        let mut wait = PollingWait::new(Script::typing("y\rignored"), &options(5));
        let mut echo = Vec::new();
        let outcome = wait.read_line_within(&mut echo, Duration::from_secs(1))?;
        assert_eq!(outcome, Wait::Line("y".to_owned()));
        assert_eq!(echo, b"y\r\n");
        assert_eq!(wait.keys().activations, 1);
        assert_eq!(wait.keys().deactivations, 1);
        Ok(())
    }

    #[test]
    fn test_expires_without_input() -> Result<()> {
        let mut wait = PollingWait::new(Script::default(), &options(5));
        let timeout = Duration::from_millis(100);
        let start = Instant::now();
        let outcome = wait.read_line_within(&mut std::io::sink(), timeout)?;
        assert_eq!(outcome, Wait::Expired);
        assert!(timeout <= start.elapsed());
        assert_eq!(wait.keys().deactivations, 1);
        Ok(())
    }

    #[test]
    fn test_idle_timeout_keeps_partial_input() -> Result<()> {
        // Each key is followed by two empty polls, so keys arrive roughly
        // every 10ms. In total, typing takes much longer than the timeout.
        let text = "the quick brown fox jumps over";
        let script = text.chars().flat_map(|c| [Some(c), None, None]);
        let mut wait = PollingWait::new(Script::new(script), &options(5));
        let timeout = Duration::from_millis(150);

        let start = Instant::now();
        let outcome = wait.read_line_within(&mut std::io::sink(), timeout)?;
        let elapsed = start.elapsed();

        assert_eq!(outcome, Wait::Line(text.to_owned()));
        assert!(timeout < elapsed, "typing plus idle time exceeds the timeout");
        Ok(())
    }

    #[test]
    fn test_backspace() -> Result<()> {
        let mut wait = PollingWait::new(Script::typing("\x7fnoo\x08\x08\r"), &options(5));
        let mut echo = Vec::new();
        let outcome = wait.read_line_within(&mut echo, Duration::from_secs(1))?;
        assert_eq!(outcome, Wait::Line("n".to_owned()));
        assert_eq!(echo, b"noo\x08 \x08\x08 \x08\r\n");
        Ok(())
    }

    #[test]
    fn test_no_echo() -> Result<()> {
        let options = Options::builder().echo(false).build();
        let mut wait = PollingWait::new(Script::typing("secret\n"), &options);
        let mut echo = Vec::new();
        assert_eq!(wait.read_line(&mut echo)?, "secret");
        assert!(echo.is_empty());
        Ok(())
    }

    #[test]
    fn test_read_line_waits_for_terminator() -> Result<()> {
        // Without deadline, long pauses between keys do not end the read.
        let script = [Some('o')]
            .into_iter()
            .chain(std::iter::repeat(None).take(20))
            .chain([Some('k'), Some('\n')]);
        let mut wait = PollingWait::new(Script::new(script), &options(1));
        assert_eq!(wait.read_line(&mut std::io::sink())?, "ok");
        Ok(())
    }

    #[test]
    fn test_huge_timeout() -> Result<()> {
        let mut wait = PollingWait::new(Script::typing("y\r"), &options(5));
        let outcome = wait.read_line_within(&mut std::io::sink(), Duration::MAX)?;
        assert_eq!(outcome, Wait::Line("y".to_owned()));
        Ok(())
    }

    #[test]
    fn test_malformed_key_is_skipped() -> Result<()> {
        let mut wait = PollingWait::new(Garbled::default(), &options(5));
        let outcome = wait.read_line_within(&mut std::io::sink(), Duration::from_secs(1))?;
        assert_eq!(outcome, Wait::Line("abc".to_owned()));
        Ok(())
    }

    #[test]
    fn test_crlf_is_one_terminator() -> Result<()> {
        let mut wait = PollingWait::new(Script::typing("a\r\nb\r\n\nc\n"), &options(5));
        let mut echo = Vec::new();
        assert_eq!(wait.read_line(&mut echo)?, "a");
        assert_eq!(wait.read_line(&mut echo)?, "b");
        assert_eq!(wait.read_line(&mut echo)?, "");
        assert_eq!(wait.read_line(&mut echo)?, "c");
        assert_eq!(echo, b"a\r\nb\r\n\r\nc\r\n");
        Ok(())
    }
}
