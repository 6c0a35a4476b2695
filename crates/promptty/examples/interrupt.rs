/// # interrupt: Continue or exit after control-c
///
/// This example counts slowly. Pressing control-c asks whether to continue
/// or exit. Without answer within 10 seconds, the process exits.
use std::io::Write;
use std::thread;
use std::time::Duration;

use promptty::err::{report, Result};
use promptty::{InterruptPolicy, TimedLineReader};

#[allow(clippy::print_stdout)]
fn run() -> Result<()> {
    let policy = InterruptPolicy::default();
    let _guard = policy.install()?;
    let mut reader = TimedLineReader::open()?;

    println!("Counting to 30, press Ctrl-C to interrupt");
    for count in 1..=30 {
        print!("{} ", count);
        std::io::stdout().flush()?;
        thread::sleep(Duration::from_millis(500));
        policy.check(&mut reader);
    }

    println!("\nMade it to the end.");
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        report(&error);
    }
}
