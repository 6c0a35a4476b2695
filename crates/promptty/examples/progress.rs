/// # progress: A progress bar inside a viewport
///
/// This example animates a progress bar in the middle of the screen, shows a
/// status line on the last row, and asks whether to continue after control-c.
/// Once done, it waits a few seconds or until enter is pressed.
use std::thread;
use std::time::Duration;

use rand::rngs::ThreadRng;
use rand_distr::{Distribution, Normal, Uniform};

use promptty::cmd::{HideCursor, ResetStyle, SetForeground8, ShowCursor};
use promptty::err::{report, Error, ErrorKind, Result};
use promptty::{Console, InterruptPolicy, TimedLineReader};

// -------------------------------------------------------------------------------------

/// Progress is a floating point percentage.
pub type Progress = f32;

/// An iterator over monotonically increasing progress reports.
///
/// The first value is 0.0 and the final value is 100.0. Increments follow a
/// normal distribution with mean 1.0 and standard deviation 2.0/3.0.
pub struct ProgressReporter {
    normal: Normal<Progress>,
    rng: ThreadRng,
    status: Progress,
    done: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    pub fn new() -> Result<Self> {
        let normal =
            Normal::new(1.0, 2.0 / 3.0).map_err(|_| Error::from(ErrorKind::InvalidArgument))?;
        Ok(Self {
            normal,
            rng: rand::rng(),
            status: 0.0,
            done: false,
        })
    }
}

impl std::iter::Iterator for ProgressReporter {
    type Item = Progress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Report the old status so that the first value is 0.0
        let result = self.status.min(100.0);
        if 100.0 <= self.status {
            self.done = true;
        } else {
            // Always make some progress
            let incr = self.normal.sample(&mut self.rng).max(0.1);
            self.status += incr;
        }

        Some(result)
    }
}

// -------------------------------------------------------------------------------------

/// A progress bar with 25 cells of 4 steps each.
pub struct Renderer(pub Progress);

// Add the two caps, a space, and up to 6 characters for the percentage.
const WIDTH: u16 = CELLS as u16 + 9;
const CELLS: usize = 25;
const STEPS: usize = 4;

impl std::fmt::Display for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let steps = self.0 as usize;
        let full = steps / STEPS;
        let partial = steps % STEPS;
        let empty = CELLS - full - usize::from(0 < partial);

        write!(f, "┫{}", SetForeground8::<10>)?;
        for _ in 0..full {
            f.write_str("█")?;
        }
        if 0 < partial {
            f.write_str(["▎", "▌", "▊"][partial - 1])?;
        }
        for _ in 0..empty {
            f.write_str(" ")?;
        }

        write!(f, "{}┣ {:5.1}%", ResetStyle, self.0)
    }
}

// -------------------------------------------------------------------------------------

fn run() -> Result<()> {
    let policy = InterruptPolicy::default();
    let _guard = policy.install()?;
    let mut reader = TimedLineReader::open()?;
    let mut console = Console::stdout();
    let size = console.size().ok_or(ErrorKind::PlatformUnavailable)?;

    console.clear_screen(true)?;
    console.exec(HideCursor)?;
    console.set_viewport(Some(1), Some(size.rows.saturating_sub(1).max(1)))?;
    console.display_status("Press Ctrl-C to interrupt")?;

    let row = (size.rows / 2).max(1);
    let col = (size.cols.saturating_sub(WIDTH) / 2).max(1);

    // Nap between 1/60 and 1/10 seconds
    let uniform =
        Uniform::new_inclusive(16, 100).map_err(|_| Error::from(ErrorKind::InvalidArgument))?;
    let mut rng = rand::rng();

    for progress in ProgressReporter::new()? {
        console.print_at(row, col, Renderer(progress).to_string())?;
        policy.check(&mut reader);
        thread::sleep(Duration::from_millis(uniform.sample(&mut rng)));
    }

    console.reset_viewport()?;
    console.exec(ShowCursor)?;
    console.move_to(size.rows, 1)?;
    reader.pause(Duration::from_secs(3))
}

fn main() {
    if let Err(error) = run() {
        report(&error);
    }
}
