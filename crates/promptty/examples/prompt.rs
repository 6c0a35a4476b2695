/// # prompt: Timed prompts with defaults
///
/// This example asks a few questions with timeouts. Pass `polling` as the
/// first argument to use the polling strategy instead of the platform's
/// default strategy, which lets you compare the two timeout semantics.
use std::time::Duration;

use promptty::cmd::SetForeground8;
use promptty::console::cwrap;
use promptty::err::{report, Result};
use promptty::opt::{Options, Strategy};
use promptty::request::YES_NO;
use promptty::{PromptRequest, TimedLineReader};

#[allow(clippy::print_stdout)]
fn run() -> Result<()> {
    let strategy = match std::env::args().nth(1).as_deref() {
        Some("polling") => Strategy::Polling,
        Some("alarm") => Strategy::Alarm,
        _ => Strategy::Auto,
    };
    let options = Options::builder().strategy(strategy).build();
    let mut reader = TimedLineReader::with_options(&options)?;
    println!(
        "{} strategy\n",
        cwrap(reader.strategy_name(), SetForeground8::<3>)
    );

    let request = PromptRequest::builder("Test prompt (y/n) > ")
        .accept(YES_NO)
        .default("y")
        .timeout(Duration::from_secs(3))
        .build();
    println!("  returns: {}", reader.read(&request)?.response());

    let request = PromptRequest::builder("Command and arguments > ")
        .default("none")
        .timeout(Duration::from_secs(10))
        .split_arguments(true)
        .build();
    let (command, arguments) = reader.read(&request)?.into_parts();
    println!("  returns: {} with {:?}", command, arguments);

    let request = PromptRequest::builder("Anything, no default > ")
        .timeout(Duration::from_secs(5))
        .build();
    match reader.read(&request) {
        Ok(result) => println!("  returns: {}", result.response()),
        Err(error) if error.is_timeout() => println!("  timed out"),
        Err(error) => return Err(error),
    }

    println!("\nWait 5 seconds, or press enter to stop waiting");
    reader.pause(Duration::from_secs(5))?;
    println!("Done.");
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        report(&error);
    }
}
