use std::io::{self, Write};
use std::time::Duration;

use log::{debug, trace};

use crate::err::{ErrorKind, Result};
use crate::opt::Options;
use crate::request::{PromptRequest, PromptResult};
use crate::sys;
use crate::wait::{TimedWait, Wait};

/// A reader of console lines with optional timeout and default.
///
/// The reader resolves its waiting strategy once, upon creation, and then
/// uses it for all reads. It writes prompts and, depending on strategy, the
/// echo of typed keys to its output.
///
///
/// # Example
///
/// ```no_run
/// # use std::time::Duration;
/// # use promptty::{PromptRequest, TimedLineReader, request::YES_NO};
/// let mut reader = TimedLineReader::open()?;
/// let request = PromptRequest::builder("Continue (y/n)? ")
///     .accept(YES_NO)
///     .default("n")
///     .timeout(Duration::from_secs(5))
///     .build();
///
/// let answer = reader.read(&request)?;
/// println!("answer: {}", answer.response());
/// # Ok::<(), promptty::err::Error>(())
/// ```
pub struct TimedLineReader<W: Write = io::Stdout> {
    strategy: Box<dyn TimedWait>,
    output: W,
}

impl TimedLineReader<io::Stdout> {
    /// Create a new reader with the default options.
    pub fn open() -> Result<Self> {
        Self::with_options(&Options::default())
    }

    /// Create a new reader with the given options.
    ///
    /// This method fails with [`ErrorKind::PlatformUnavailable`] if the
    /// requested strategy is not supported by the platform or console.
    pub fn with_options(options: &Options) -> Result<Self> {
        let strategy = sys::select(options)?;
        debug!("reading console lines with {} strategy", strategy.name());
        Ok(Self {
            strategy,
            output: io::stdout(),
        })
    }
}

impl<W: Write> TimedLineReader<W> {
    /// Create a new reader with the given strategy and output.
    pub fn with_strategy<S: TimedWait + 'static>(strategy: S, output: W) -> Self {
        Self {
            strategy: Box::new(strategy),
            output,
        }
    }

    /// Get the name of the waiting strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Get the output.
    pub fn output(&self) -> &W {
        &self.output
    }

    fn show_prompt(&mut self, prompt: &str) -> Result<()> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }

    fn end_line(&mut self) -> Result<()> {
        self.output.write_all(b"\n")?;
        self.output.flush()?;
        Ok(())
    }

    /// Read a line for the request.
    ///
    /// This method displays the prompt and reads a line. Without timeout,
    /// the read blocks until a line terminator arrives. With timeout, the
    /// read's outcome depends on the strategy. The polling strategy treats
    /// the timeout as idle timeout and returns partial input, whereas the
    /// alarm strategy treats it as hard deadline and discards partial input.
    ///
    /// The line is then split into response and arguments, if so requested.
    /// If the response is not acceptable, the reader prompts again. If the
    /// deadline expires without line, the reader returns the request's
    /// default without checking it, or fails with [`ErrorKind::Timeout`] if
    /// there is no default.
    pub fn read(&mut self, request: &PromptRequest) -> Result<PromptResult> {
        loop {
            self.show_prompt(request.prompt())?;

            let line = match request.timeout() {
                None => self.strategy.read_line(&mut self.output)?,
                Some(timeout) => match self.strategy.read_line_within(&mut self.output, timeout)? {
                    Wait::Line(line) => line,
                    Wait::Expired => {
                        self.end_line()?;
                        debug!("prompt expired after {:?}", timeout);
                        return request.expire().ok_or_else(|| ErrorKind::Timeout.into());
                    }
                },
            };

            let result = request.interpret(line);
            if request.accepts(result.response()) {
                return Ok(result);
            }
            trace!("rejected response {:?}", result.response());
        }
    }

    /// Pause for the duration or until the user presses enter.
    ///
    /// Unlike [`TimedLineReader::read`], this method does not fail when the
    /// duration elapses.
    pub fn pause(&mut self, duration: Duration) -> Result<()> {
        match self.strategy.read_line_within(&mut self.output, duration)? {
            Wait::Line(_) => Ok(()),
            Wait::Expired => self.end_line(),
        }
    }
}

impl<W: Write> std::fmt::Debug for TimedLineReader<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedLineReader")
            .field("strategy", &self.strategy.name())
            .finish_non_exhaustive()
    }
}

fn build_request(
    prompt: &str,
    acceptable: &[&str],
    default: Option<&str>,
    timeout: Option<Duration>,
    split_arguments: bool,
) -> PromptRequest {
    let mut builder = PromptRequest::builder(prompt);
    builder
        .accept(acceptable.iter().copied())
        .split_arguments(split_arguments);
    if let Some(default) = default {
        builder.default(default);
    }
    if let Some(timeout) = timeout {
        builder.timeout(timeout);
    }
    builder.build()
}

/// Read a line from the console with optional timeout and default.
///
/// This function opens a reader with the default options for one read. An
/// empty list of acceptable responses accepts anything.
///
/// # Example
///
/// ```no_run
/// # use std::time::Duration;
/// # use promptty::read_line_with_timeout;
/// let answer = read_line_with_timeout(
///     "continue? ", &["y", "n"], Some("n"), Some(Duration::from_secs(2)))?;
/// # Ok::<(), promptty::err::Error>(())
/// ```
pub fn read_line_with_timeout(
    prompt: &str,
    acceptable: &[&str],
    default: Option<&str>,
    timeout: Option<Duration>,
) -> Result<String> {
    let request = build_request(prompt, acceptable, default, timeout, false);
    Ok(TimedLineReader::open()?.read(&request)?.into_response())
}

/// Read a response with trailing arguments from the console.
///
/// This function behaves like [`read_line_with_timeout`], but splits the
/// line on whitespace. The first token must be acceptable and the remaining
/// tokens are returned as arguments.
pub fn read_args_with_timeout(
    prompt: &str,
    acceptable: &[&str],
    default: Option<&str>,
    timeout: Option<Duration>,
) -> Result<(String, Vec<String>)> {
    let request = build_request(prompt, acceptable, default, timeout, true);
    Ok(TimedLineReader::open()?.read(&request)?.into_parts())
}

// =====================================================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::YES_NO;
    use crate::wait::test::Script;
    use crate::wait::PollingWait;
    use std::time::Instant;

    fn reader(script: Script) -> TimedLineReader<Vec<u8>> {
        let options = Options::builder()
            .poll_interval(Duration::from_millis(5))
            .build();
        TimedLineReader::with_strategy(PollingWait::new(script, &options), Vec::new())
    }

    fn yes_no(timeout: Duration, default: Option<&str>) -> PromptRequest {
        build_request("continue? ", &YES_NO, default, Some(timeout), false)
    }

    #[test]
    fn test_default_on_timeout() -> Result<()> {
        let mut reader = reader(Script::default());
        let result = reader.read(&yes_no(Duration::from_millis(100), Some("n")))?;
        assert_eq!(result.response(), "n");
        assert_eq!(reader.output(), b"continue? \n");
        Ok(())
    }

    #[test]
    fn test_typed_response() -> Result<()> {
        let mut reader = reader(Script::typing("y\r"));
        let start = Instant::now();
        let result = reader.read(&yes_no(Duration::from_secs(2), Some("n")))?;
        assert_eq!(result.response(), "y");
        assert!(start.elapsed() < Duration::from_secs(1));
        Ok(())
    }

    #[test]
    fn test_anything_goes() -> Result<()> {
        let mut reader = reader(Script::typing("anything\n"));
        let request = build_request("? ", &[], None, Some(Duration::from_secs(2)), false);
        assert_eq!(reader.read(&request)?.into_response(), "anything");
        assert_eq!(reader.output(), b"? anything\r\n");
        Ok(())
    }

    #[test]
    fn test_timeout_without_default() {
        let mut reader = reader(Script::default());
        let result = reader.read(&yes_no(Duration::from_millis(50), None));
        assert_eq!(result.map_err(|e| e.kind()).map(|_| ()), Err(ErrorKind::Timeout));
    }

    #[test]
    fn test_reprompt() -> Result<()> {
        let mut reader = reader(Script::typing("maybe\nN\n"));
        let result = reader.read(&yes_no(Duration::from_secs(1), None))?;
        assert_eq!(result.response(), "N");
        assert_eq!(reader.output(), b"continue? maybe\r\ncontinue? N\r\n");
        Ok(())
    }

    #[test]
    fn test_arguments() -> Result<()> {
        let mut reader = reader(Script::typing("y extra stuff\n"));
        let request = build_request("? ", &YES_NO, None, None, true);
        let (response, arguments) = reader.read(&request)?.into_parts();
        assert_eq!(response, "y");
        assert_eq!(arguments, vec!["extra".to_owned(), "stuff".to_owned()]);
        Ok(())
    }

    #[test]
    fn test_partial_input_on_idle() -> Result<()> {
        let mut reader = reader(Script::typing("partial"));
        let timeout = Some(Duration::from_millis(50));
        let request = build_request("? ", &[], Some("default"), timeout, false);
        assert_eq!(reader.read(&request)?.into_response(), "partial");
        Ok(())
    }

    #[test]
    fn test_pause() -> Result<()> {
        let mut reader = reader(Script::default());
        reader.pause(Duration::from_millis(20))?;
        let mut reader = self::reader(Script::typing("\r"));
        reader.pause(Duration::from_secs(5))?;
        assert_eq!(reader.strategy_name(), "polling");
        Ok(())
    }

    #[cfg(target_family = "unix")]
    mod alarm {
        use super::*;
        use crate::sys::test::{serialize, Pipe};
        use crate::AlarmWait;
        use std::os::fd::AsRawFd;

        fn reader(pipe: &Pipe) -> TimedLineReader<Vec<u8>> {
            let strategy = AlarmWait::with_handle(pipe.reader.as_raw_fd());
            TimedLineReader::with_strategy(strategy, Vec::new())
        }

        #[test]
        fn test_partial_line_resolves_to_default() -> Result<()> {
            let _serial = serialize();
            let pipe = Pipe::new()?;
            pipe.write(b"y")?;

            let mut reader = reader(&pipe);
            let result = reader.read(&yes_no(Duration::from_millis(200), Some("n")))?;
            assert_eq!(result.response(), "n");
            assert_eq!(reader.output(), b"continue? \n");
            Ok(())
        }

        #[test]
        fn test_partial_line_without_default() -> Result<()> {
            let _serial = serialize();
            let pipe = Pipe::new()?;
            pipe.write(b"y")?;

            let mut reader = reader(&pipe);
            let result = reader.read(&yes_no(Duration::from_millis(200), None));
            assert_eq!(result.map_err(|e| e.kind()).map(|_| ()), Err(ErrorKind::Timeout));
            Ok(())
        }

        #[test]
        fn test_typed_response() -> Result<()> {
            let _serial = serialize();
            let pipe = Pipe::new()?;
            pipe.write(b"maybe\ny\n")?;

            let mut reader = reader(&pipe);
            let result = reader.read(&yes_no(Duration::from_secs(2), Some("n")))?;
            assert_eq!(result.response(), "y");
            assert_eq!(reader.output(), b"continue? continue? ");
            assert_eq!(reader.strategy_name(), "alarm");
            Ok(())
        }
    }
}
