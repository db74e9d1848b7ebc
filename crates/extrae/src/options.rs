//! Runtime option flags for `Extrae_set_options`.

use std::ffi::c_int;
use std::fmt;

use bitflags::bitflags;
use extrae_sys::{
    EXTRAE_CALLER_OPTION, EXTRAE_HWC_OPTION, EXTRAE_MPI_HWC_OPTION, EXTRAE_MPI_OPTION,
    EXTRAE_OMP_HWC_OPTION, EXTRAE_OMP_OPTION, EXTRAE_UF_HWC_OPTION,
};

use crate::{Error, Result};

bitflags! {
    /// Tracer features that can be toggled at runtime.
    ///
    /// The empty set is valid and disables every option.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Options: u32 {
        /// Record call stacks with events.
        const CALLER = EXTRAE_CALLER_OPTION as u32;
        /// Gather hardware counters.
        const HWC = EXTRAE_HWC_OPTION as u32;
        /// Gather hardware counters at MPI calls.
        const MPI_HWC = EXTRAE_MPI_HWC_OPTION as u32;
        /// Trace MPI calls.
        const MPI = EXTRAE_MPI_OPTION as u32;
        /// Trace OpenMP runtime calls.
        const OMP = EXTRAE_OMP_OPTION as u32;
        /// Gather hardware counters at OpenMP calls.
        const OMP_HWC = EXTRAE_OMP_HWC_OPTION as u32;
        /// Gather hardware counters at user function markers.
        const UF_HWC = EXTRAE_UF_HWC_OPTION as u32;
    }
}

impl Options {
    /// Validate a raw mask, rejecting any bit outside the named flags.
    ///
    /// # Errors
    ///
    /// `InvalidOptionMask` if `mask` has bits outside the named flags.
    pub fn from_mask(mask: u32) -> Result<Self> {
        match Self::from_bits(mask) {
            Some(options) => Ok(options),
            None => Err(Error::InvalidOptionMask {
                mask,
                unknown: mask & !Self::all().bits(),
            }),
        }
    }

    /// Parse a list like `"caller,hwc"` or `"mpi|omp_hwc"`.
    ///
    /// Names are case-insensitive; `none` and the empty string are the empty set.
    ///
    /// # Errors
    ///
    /// `UnknownOption` for a name that is not a flag.
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut options = Self::empty();
        for name in list.split([',', '|']).map(str::trim) {
            if name.is_empty() || name.eq_ignore_ascii_case("none") {
                continue;
            }
            let flag = Self::from_name(&name.to_ascii_uppercase())
                .ok_or_else(|| Error::UnknownOption(name.to_string()))?;
            options |= flag;
        }
        Ok(options)
    }

    /// Value passed across the boundary.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_raw(self) -> c_int {
        // Only the low seven bits can be set.
        self.bits() as c_int
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(&name.to_ascii_lowercase())?;
            first = false;
        }
        Ok(())
    }
}
