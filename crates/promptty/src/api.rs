/// A command for the console.
///
/// Commands are written to the console in-band as ANSI escape sequences. The
/// [`std::fmt::Display`] implementation writes the escape sequence, whereas
/// the [`std::fmt::Debug`] implementation names the command.
///
/// This trait is object-safe.
pub trait Command: std::fmt::Debug + std::fmt::Display {}

/// A borrowed command is a command.
impl<C: Command + ?Sized> Command for &C {}

/// A boxed command is a command.
impl<C: Command + ?Sized> Command for Box<C> {}

/// Combine several commands into a single new command.
///
/// The new command writes the escape sequences of its components in order.
/// Its debug representation shows the macro's arguments. Since
/// [`DynSetWindowTitle`](crate::cmd::DynSetWindowTitle) is not [`Copy`], it
/// cannot be fused.
///
/// When fusing only SGR commands, prefer [`fuse_sgr!`](crate::fuse_sgr),
/// which writes a single escape sequence.
///
/// # Example
///
/// ```
/// # use promptty::{cmd::{MoveDown, MoveRight}, fuse};
/// let move_down_right_twice = fuse!(MoveDown::<2>, MoveRight::<2>);
/// assert_eq!(format!("{}", move_down_right_twice), "\x1b[2B\x1b[2C");
/// ```
#[macro_export]
macro_rules! fuse {
    ($($command:expr),+ $(,)?) => {{
        /// One or more combined commands.
        #[derive(Copy, Clone, PartialEq, Eq)]
        struct Fused;

        impl $crate::Command for Fused {}

        impl ::std::fmt::Debug for Fused {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(concat!(stringify!(fuse!), "(", stringify!($($command),+), ")"))
            }
        }

        impl ::std::fmt::Display for Fused {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                $($command.fmt(f)?;)*
                Ok(())
            }
        }

        Fused
    }}
}

// ------------------------------------------------------------------------------------------------

/// A command using select-graphic-rendition escape sequences.
///
/// SGR commands write their parameters separately through
/// [`Sgr::write_param`], without the leading `CSI` and trailing `m`, so that
/// several of them can share one escape sequence. The method takes a
/// formatter instead of a generic writer to keep the trait object-safe.
pub trait Sgr: Command {
    /// Write the parameter(s) for this SGR command.
    fn write_param(&self, out: &mut std::fmt::Formatter<'_>) -> ::std::fmt::Result;
}

/// A borrowed SGR is an SGR.
impl<S: Sgr + ?Sized> Sgr for &S {
    fn write_param(&self, out: &mut std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        (**self).write_param(out)
    }
}

/// A boxed SGR is an SGR.
impl<S: Sgr + ?Sized> Sgr for Box<S> {
    fn write_param(&self, out: &mut std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        (**self).write_param(out)
    }
}

/// Combine several SGR commands into a single new SGR command.
///
/// The new command writes one escape sequence with the parameters of its
/// components in order. Its debug representation shows the macro's
/// arguments. To fuse commands other than SGR commands, use [`fuse!`].
#[macro_export]
macro_rules! fuse_sgr {
    ( $sgr:expr, $( $sgr2:expr ),* $(,)? ) => {{
        /// One or more SGR commands fused into one.
        #[derive(Copy, Clone, PartialEq, Eq)]
        struct FusedSgr;

        impl ::std::fmt::Debug for FusedSgr {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(concat!(stringify!(fuse_sgr!), "(", stringify!($sgr, $($sgr2),*), ")"))
            }
        }

        impl ::std::fmt::Display for FusedSgr {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str("\x1b[")?;
                self.write_param(f)?;
                f.write_str("m")
            }
        }

        impl $crate::Command for FusedSgr {}
        impl $crate::Sgr for FusedSgr {
            fn write_param(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                $sgr.write_param(f)?;
                $(
                    f.write_str(";")?;
                    $sgr2.write_param(f)?;
                )*
                Ok(())
            }
        }

        FusedSgr
    }};
}

fn _assert_traits_are_object_safe() {
    fn is_object_safe<T: ?Sized>() {}

    is_object_safe::<dyn Command>();
    is_object_safe::<dyn Sgr>();
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cmd::{EraseRestOfLine, Format, MoveToColumn, SetBackground8, SetForeground8};

    #[test]
    fn test_fuse() {
        let cmd = fuse!(MoveToColumn::<1>, EraseRestOfLine);
        assert_eq!(format!("{}", cmd), "\x1b[1G\x1b[K");
        assert_eq!(
            format!("{:?}", cmd),
            "fuse!(MoveToColumn::<1>, EraseRestOfLine)"
        );

        let copy = cmd;
        assert_eq!(format!("{}{}", cmd, copy), "\x1b[1G\x1b[K\x1b[1G\x1b[K");
        assert_eq!(cmd, copy);
    }

    #[test]
    fn test_fuse_sgr() {
        let cmd = fuse_sgr!(Format::Bold, SetForeground8::<0>, SetBackground8::<15>);
        assert_eq!(format!("{}", cmd), "\x1b[1;30;107m");
        assert_eq!(
            format!("{:?}", cmd),
            "fuse_sgr!(Format::Bold, SetForeground8::<0>, SetBackground8::<15>)"
        );

        let boxed: Box<dyn Sgr> = Box::new(cmd);
        assert_eq!(format!("{}", boxed), "\x1b[1;30;107m");
    }
}
