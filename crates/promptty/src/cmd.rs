//! A library of ANSI escape sequences for console output.
//!
//! Every type in this module implements the [`Command`] trait, and the style
//! commands also implement [`Sgr`]. Grouped by concern, the library covers:
//!
//!   * The window:
//!       * [`DynSetWindowTitle`]
//!       * [`HideWindow`] and [`ShowWindow`]
//!   * Erasing content:
//!       * [`EraseScreen`], [`EraseToEndOfScreen`], and [`EraseToStartOfScreen`]
//!       * [`EraseLine`], [`EraseRestOfLine`], and [`EraseStartOfLine`]
//!   * Scrolling and the viewport:
//!       * [`ScrollUp`], [`ScrollDown`], [`DynScrollUp`], and [`DynScrollDown`]
//!       * [`SetScrollRegion`] and [`DynSetScrollRegion`]
//!       * [`ResetScrollRegion`]
//!   * The cursor:
//!       * [`SetCursor`] for selecting the cursor's shape
//!       * [`HideCursor`] and [`ShowCursor`]
//!       * [`EnableCursorBlinking`] and [`DisableCursorBlinking`]
//!       * Relative [`MoveUp`], [`MoveDown`], [`MoveLeft`], [`MoveRight`],
//!         [`DynMoveUp`], [`DynMoveDown`], [`DynMoveLeft`], and
//!         [`DynMoveRight`]
//!       * Absolute [`MoveTo`], [`MoveToColumn`], [`DynMoveTo`], and
//!         [`DynMoveToColumn`]
//!       * [`SaveCursorPosition`] and [`RestoreCursorPosition`]
//!   * Styling text:
//!       * [`ResetStyle`]
//!       * [`Format`] for bold, italic, underlined, blinking, reversed,
//!         hidden, and stricken text as well as their negations
//!       * [`SetForeground8`], [`SetForeground24`], [`DynSetForeground8`],
//!         and [`DynSetForeground24`]
//!       * [`SetBackground8`], [`SetBackground24`], [`DynSetBackground8`],
//!         and [`DynSetBackground24`]
//!
//! Commands without arguments are zero-sized unit structs or enum variants.
//! Commands with arguments come in a static flavor, which uses const generics
//! and hence is zero-sized as well, and a dynamic flavor, whose name starts
//! with `Dyn` and which stores its arguments.
//!
//! The [`fuse!`](crate::fuse) and [`fuse_sgr!`](crate::fuse_sgr) macros
//! combine several commands into one.
//!
//!
//! # Example
//!
//! A command is executed by writing its display:
//! ```
//! # use promptty::{fuse_sgr, Sgr, cmd::{Format, ResetStyle, SetForeground8}};
//! let warning = format!(
//!     "{}Careful!{}",
//!     fuse_sgr!(Format::Bold, SetForeground8::<3>),
//!     ResetStyle
//! );
//! assert_eq!(warning, "\x1b[1;33mCareful!\x1b[m");
//! ```

use crate::{Command, Sgr};

macro_rules! declare_unit_struct {
    ($name:ident) => {
        #[doc = concat!("The unit `",stringify!($name),"` command.")]
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name;
    };
}

macro_rules! declare_n_struct {
    ($name:ident( $( $arg:ident : $typ:ty ),+ $(,)? )) => {
        #[doc = concat!("The dynamic `",stringify!($name),"(",stringify!($($arg),+),")` command.")]
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name( $( pub $typ ),+ );
    };
    ($name:ident< $( $arg:ident : $typ:ty ),+ >) => {
        #[doc = concat!("The static `",stringify!($name),"<",stringify!($($arg),+),">` command.")]
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name< $(const $arg: $typ),+ >;
    }
}

macro_rules! implement_command {
    ($name:ident $(< $( $arg:ident : $typ:ty ),+ >)? : $selfish:ident ; $output:ident $body:block) => {
        impl $(< $(const $arg: $typ),+ >)? $crate::Command for $name $(< $($arg),+ >)? {}

        impl $(< $(const $arg: $typ),+ >)? ::core::fmt::Display for $name $(< $($arg),+ >)? {
            #[inline]
            fn fmt(&$selfish, $output: &mut ::core::fmt::Formatter<'_>) -> core::fmt::Result {
                $body
            }
        }
    }
}

macro_rules! define_unit_command {
    ($name:ident, $ansi:tt) => {
        declare_unit_struct!($name);
        implement_command!($name: self; f { f.write_str($ansi) });
    };
}

macro_rules! define_cmd_1 {
    ($name:ident <$arg:ident : $typ:ty>, $dyn_name:ident, $suffix:literal) => {
        declare_n_struct!($name<$arg : $typ>);
        implement_command!($name<$arg : $typ>: self; f {
            f.write_str("\x1b[")?;
            <_ as ::core::fmt::Display>::fmt(&$arg, f)?;
            f.write_str($suffix)
        });

        declare_n_struct!($dyn_name($arg : $typ));
        implement_command!($dyn_name: self; f {
            f.write_str("\x1b[")?;
            <_ as ::core::fmt::Display>::fmt(&self.0, f)?;
            f.write_str($suffix)
        });
    }
}

macro_rules! define_cmd_2 {
    ($name:ident <$arg1:ident : $typ1:ty, $arg2:ident : $typ2:ty>, $dyn_name:ident, $suffix:literal) => {
        declare_n_struct!($name<$arg1 : $typ1, $arg2 : $typ2>);
        implement_command!($name<$arg1 : $typ1, $arg2 : $typ2>: self; f {
            f.write_str("\x1b[")?;
            <_ as ::core::fmt::Display>::fmt(&$arg1, f)?;
            f.write_str(";")?;
            <_ as ::core::fmt::Display>::fmt(&$arg2, f)?;
            f.write_str($suffix)
        });

        declare_n_struct!($dyn_name($arg1 : $typ1, $arg2 : $typ2));
        implement_command!($dyn_name: self; f {
            f.write_str("\x1b[")?;
            <_ as ::core::fmt::Display>::fmt(&self.0, f)?;
            f.write_str(";")?;
            <_ as ::core::fmt::Display>::fmt(&self.1, f)?;
            f.write_str($suffix)
        });
    }
}

macro_rules! implement_sgr {
    ($name:ident $(< $( $arg:ident : $typ:ty ),+ >)? : $selfish:ident ; $output:ident $body:block) => {
        impl $(< $(const $arg: $typ),+ >)? $crate::Command for $name $(< $($arg),+ >)? {}

        impl $(< $(const $arg: $typ),+ >)? $crate::Sgr for $name $(< $($arg),+ >)? {
            #[inline]
            fn write_param(&$selfish, $output: &mut ::core::fmt::Formatter<'_>) -> core::fmt::Result {
                $body
            }
        }

        impl $(< $(const $arg: $typ),+ >)?  ::core::fmt::Display for $name $(< $($arg),+ >)? {
            #[inline]
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str("\x1b[")?;
                self.write_param(f)?;
                f.write_str("m")
            }
        }
    };
}

/// Write the parameter for one of 256 colors.
///
/// The 16 ANSI colors use the short codes starting at `dark` and `bright`;
/// all others use the `prefix` and the color number.
fn write_8bit(
    f: &mut core::fmt::Formatter<'_>,
    color: u8,
    dark: u8,
    bright: u8,
    prefix: &str,
) -> core::fmt::Result {
    match color {
        0..=7 => <_ as core::fmt::Display>::fmt(&(dark + color), f),
        8..=15 => <_ as core::fmt::Display>::fmt(&(bright + color - 8), f),
        _ => {
            f.write_str(prefix)?;
            <_ as core::fmt::Display>::fmt(&color, f)
        }
    }
}

macro_rules! define_8bit_color {
    ($name:ident, $dyn_name:ident, $dark:literal, $bright:literal, $prefix:literal) => {
        declare_n_struct!($name<COLOR: u8>);
        implement_sgr!($name<COLOR: u8>: self; f {
            write_8bit(f, COLOR, $dark, $bright, $prefix)
        });

        declare_n_struct!($dyn_name(COLOR: u8));
        implement_sgr!($dyn_name: self; f {
            write_8bit(f, self.0, $dark, $bright, $prefix)
        });
    }
}

macro_rules! define_24bit_color {
    ($name:ident, $dyn_name:ident, $prefix:literal) => {
        declare_n_struct!($name<R: u8, G: u8, B: u8>);
        implement_sgr!($name<R: u8, G: u8, B: u8>: self; f {
            f.write_fmt(format_args!("{}{};{};{}", $prefix, R, G, B))
        });

        declare_n_struct!($dyn_name(R: u8, G: u8, B: u8));
        implement_sgr!($dyn_name: self; f {
            f.write_fmt(format_args!("{}{};{};{}", $prefix, self.0, self.1, self.2))
        });
    }
}

// ====================================== Library ======================================

// ---------------------------------------- Window ---------------------------------------

/// The dynamic `DynSetWindowTitle(String)` command.
///
/// This command cannot be copied, only cloned. It also cannot be fused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynSetWindowTitle(String);

impl DynSetWindowTitle {
    /// Create a new command setting the window title.
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self(title.into())
    }
}

implement_command!(DynSetWindowTitle: self; f {
    f.write_str("\x1b]2;")?;
    f.write_str(self.0.as_str())?;
    f.write_str("\x1b\\")
});

define_unit_command!(HideWindow, "\x1b[2t");
define_unit_command!(ShowWindow, "\x1b[1t");

// --------------------------------------- Erasing ---------------------------------------

define_unit_command!(EraseScreen, "\x1b[2J");
define_unit_command!(EraseToEndOfScreen, "\x1b[0J");
define_unit_command!(EraseToStartOfScreen, "\x1b[1J");

define_unit_command!(EraseLine, "\x1b[2K");
define_unit_command!(EraseRestOfLine, "\x1b[K");
define_unit_command!(EraseStartOfLine, "\x1b[1K");

// -------------------------------------- Scrolling --------------------------------------

define_cmd_1!(ScrollUp<ROWS: u16>, DynScrollUp, "S");
define_cmd_1!(ScrollDown<ROWS: u16>, DynScrollDown, "T");

define_cmd_2!(SetScrollRegion<TOP: u16, BOTTOM: u16>, DynSetScrollRegion, "r");
define_unit_command!(ResetScrollRegion, "\x1b[r");

// --------------------------------------- Cursor ----------------------------------------

/// The enumeration of cursor shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetCursor {
    Default = 0,
    BlinkingBlock = 1,
    SteadyBlock = 2,
    BlinkingUnderscore = 3,
    SteadyUnderscore = 4,
    BlinkingBar = 5,
    SteadyBar = 6,
}

impl Command for SetCursor {}

impl core::fmt::Display for SetCursor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("\x1b[")?;
        <_ as core::fmt::Display>::fmt(&(*self as u8), f)?;
        f.write_str(" q")
    }
}

define_unit_command!(HideCursor, "\x1b[?25l");
define_unit_command!(ShowCursor, "\x1b[?25h");
define_unit_command!(EnableCursorBlinking, "\x1b[?12h");
define_unit_command!(DisableCursorBlinking, "\x1b[?12l");

define_cmd_1!(MoveUp<ROWS: u16>, DynMoveUp, "A");
define_cmd_1!(MoveDown<ROWS: u16>, DynMoveDown, "B");
define_cmd_1!(MoveRight<COLUMNS: u16>, DynMoveRight, "C");
define_cmd_1!(MoveLeft<COLUMNS: u16>, DynMoveLeft, "D");

define_cmd_2!(MoveTo<ROW: u16, COLUMN: u16>, DynMoveTo, "H");
define_cmd_1!(MoveToColumn<COLUMN: u16>, DynMoveToColumn, "G");

define_unit_command!(SaveCursorPosition, "\x1b7");
define_unit_command!(RestoreCursorPosition, "\x1b8");

// ---------------------------------------- Style ----------------------------------------

define_unit_command!(ResetStyle, "\x1b[m");

define_8bit_color!(SetForeground8, DynSetForeground8, 30, 90, "38;5;");
define_8bit_color!(SetBackground8, DynSetBackground8, 40, 100, "48;5;");
define_24bit_color!(SetForeground24, DynSetForeground24, "38;2;");
define_24bit_color!(SetBackground24, DynSetBackground24, "48;2;");

/// The enumeration of unit `Format` commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Format {
    Bold = 1,
    Thin = 2,
    Regular = 22,
    Italic = 3,
    Upright = 23,
    Underlined = 4,
    NotUnderlined = 24,
    Blinking = 5,
    NotBlinking = 25,
    Reversed = 7,
    NotReversed = 27,
    Hidden = 8,
    NotHidden = 28,
    Stricken = 9,
    NotStricken = 29,
}

impl Format {
    /// Get the format that restores the default appearance.
    #[must_use = "the only reason to invoke method is to access the returned value"]
    pub fn undo(&self) -> Self {
        use self::Format::*;

        match *self {
            Bold | Thin => Regular,
            Italic => Upright,
            Underlined => NotUnderlined,
            Blinking => NotBlinking,
            Reversed => NotReversed,
            Hidden => NotHidden,
            Stricken => NotStricken,
            _ => *self,
        }
    }
}

impl Sgr for Format {
    #[inline]
    fn write_param(&self, f: &mut core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        <_ as core::fmt::Display>::fmt(&(*self as u8), f)
    }
}

impl Command for Format {}

impl core::fmt::Display for Format {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("\x1b[")?;
        self.write_param(f)?;
        f.write_str("m")
    }
}

// =====================================================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<EraseScreen>(), 0);
        assert_eq!(std::mem::size_of::<MoveLeft::<2>>(), 0);
        assert_eq!(std::mem::size_of::<DynMoveLeft>(), 2);
        assert_eq!(std::mem::size_of::<MoveTo::<5, 7>>(), 0);
        assert_eq!(std::mem::size_of::<DynMoveTo>(), 4);
        assert_eq!(std::mem::size_of::<SetForeground8::<88>>(), 0);
        assert_eq!(std::mem::size_of::<DynSetForeground8>(), 1);
        assert_eq!(std::mem::size_of::<SetBackground24::<134, 36, 161>>(), 0);
        assert_eq!(std::mem::size_of::<DynSetBackground24>(), 3);
    }

    #[test]
    fn test_erase_and_window() {
        assert_eq!(format!("{}", EraseScreen), "\x1b[2J");
        assert_eq!(format!("{}", EraseToEndOfScreen), "\x1b[0J");
        assert_eq!(format!("{}", EraseToStartOfScreen), "\x1b[1J");
        assert_eq!(format!("{}", EraseRestOfLine), "\x1b[K");
        assert_eq!(format!("{}", EraseStartOfLine), "\x1b[1K");
        assert_eq!(format!("{}", HideWindow), "\x1b[2t");
        assert_eq!(
            format!("{}", DynSetWindowTitle::new("Prompt")),
            "\x1b]2;Prompt\x1b\\"
        );
    }

    #[test]
    fn test_cursor() {
        assert_eq!(format!("{}", MoveUp::<3>), "\x1b[3A");
        assert_eq!(format!("{}", DynMoveDown(1)), "\x1b[1B");
        assert_eq!(format!("{}", MoveRight::<2>), "\x1b[2C");
        assert_eq!(format!("{}", DynMoveLeft(2)), "\x1b[2D");
        assert_eq!(format!("{}", MoveTo::<5, 7>), "\x1b[5;7H");
        assert_eq!(format!("{}", DynMoveTo(5, 7)), "\x1b[5;7H");
        assert_eq!(format!("{}", DynMoveToColumn(17)), "\x1b[17G");
        assert_eq!(format!("{}", SetCursor::SteadyBar), "\x1b[6 q");
        assert_eq!(format!("{}", DisableCursorBlinking), "\x1b[?12l");
    }

    #[test]
    fn test_scrolling() {
        assert_eq!(format!("{}", ScrollUp::<4>), "\x1b[4S");
        assert_eq!(format!("{}", DynScrollDown(4)), "\x1b[4T");
        assert_eq!(format!("{}", SetScrollRegion::<2, 20>), "\x1b[2;20r");
        assert_eq!(format!("{}", DynSetScrollRegion(1, 24)), "\x1b[1;24r");
        assert_eq!(format!("{}", ResetScrollRegion), "\x1b[r");
    }

    #[test]
    fn test_style() {
        assert_eq!(format!("{}", SetForeground8::<0>), "\x1b[30m");
        assert_eq!(format!("{}", SetForeground8::<15>), "\x1b[97m");
        assert_eq!(format!("{}", SetForeground8::<88>), "\x1b[38;5;88m");
        assert_eq!(format!("{}", SetBackground8::<7>), "\x1b[47m");
        assert_eq!(format!("{}", DynSetBackground8(9)), "\x1b[101m");
        assert_eq!(format!("{}", SetBackground8::<226>), "\x1b[48;5;226m");
        assert_eq!(
            format!("{}", SetForeground24::<255, 103, 227>),
            "\x1b[38;2;255;103;227m"
        );
        assert_eq!(
            format!("{}", DynSetBackground24(134, 36, 161)),
            "\x1b[48;2;134;36;161m"
        );
        assert_eq!(format!("{}", Format::Italic), "\x1b[3m");
        assert_eq!(Format::Bold.undo(), Format::Regular);
        assert_eq!(Format::Regular.undo(), Format::Regular);
    }
}
