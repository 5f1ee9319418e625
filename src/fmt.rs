//! Logging shim.
//!
//! Forwards to `defmt` and/or `log` depending on the enabled features and
//! expands to nothing otherwise. Only primitive arguments are passed so the
//! same format string works for both backends.
#![macro_use]
#![allow(unused)]

#[allow(unused_macros)]
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-0-3")]
            ::defmt::trace!($s $(, $x)*);
            #[cfg(feature = "log")]
            ::log::trace!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt-0-3", feature = "log")))]
            let _ = ($( & $x, )*);
        }
    };
}

#[allow(unused_macros)]
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-0-3")]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(feature = "log")]
            ::log::debug!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt-0-3", feature = "log")))]
            let _ = ($( & $x, )*);
        }
    };
}

#[allow(unused_macros)]
macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-0-3")]
            ::defmt::info!($s $(, $x)*);
            #[cfg(feature = "log")]
            ::log::info!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt-0-3", feature = "log")))]
            let _ = ($( & $x, )*);
        }
    };
}

#[allow(unused_macros)]
macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-0-3")]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(feature = "log")]
            ::log::warn!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt-0-3", feature = "log")))]
            let _ = ($( & $x, )*);
        }
    };
}
