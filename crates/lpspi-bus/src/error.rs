use crate::instance::Instance;

const EIO: i32 = 5;
const EBUSY: i32 = 16;
const ENODEV: i32 = 19;
const ENOSYS: i32 = 38;

/// Errors surfaced by the LPSPI driver contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The index names no LPSPI block on this chip.
    UnknownBus(u8),
    /// The block exists but is not compiled into this build.
    Disabled(Instance),
    /// The board or clock collaborator could not bring the block up.
    Peripheral,
    /// Bring-up of the block was entered again while still in progress.
    Busy,
    /// The optional capability is compiled out or not wired for this bus.
    Unsupported,
    /// The board rejected the request with a negated errno.
    Rejected(i32),
}

impl BusError {
    /// Negated errno for consumers that speak integer result codes.
    pub const fn errno(self) -> i32 {
        match self {
            BusError::UnknownBus(_) | BusError::Disabled(_) => -ENODEV,
            BusError::Peripheral => -EIO,
            BusError::Busy => -EBUSY,
            BusError::Unsupported => -ENOSYS,
            BusError::Rejected(code) if code < 0 => code,
            BusError::Rejected(_) => -EIO,
        }
    }
}

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BusError::UnknownBus(index) => {
                write!(f, "no LPSPI block with index {}", index)
            }
            BusError::Disabled(instance) => {
                write!(f, "{:?} is not enabled in this build", instance)
            }
            BusError::Peripheral => write!(f, "peripheral configuration failed"),
            BusError::Busy => write!(f, "bring-up already in progress"),
            BusError::Unsupported => write!(f, "operation not supported on this bus"),
            BusError::Rejected(code) => write!(f, "board rejected request: {}", code),
        }
    }
}
