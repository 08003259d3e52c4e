use bitflags::bitflags;

use crate::error::BusError;
use crate::instance::{Descriptor, Instance};

/// Opaque token naming one device on a bus.
///
/// The driver passes it through unmodified; only the bound [`BoardHooks`]
/// know which chip-select line it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId(pub u32);

impl From<u32> for DeviceId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

bitflags! {
    /// Device status reported by the board.
    ///
    /// Bits outside the named flags are kept as reported.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusBits: u8 {
        /// A device (e.g. a memory card) is in the slot.
        const PRESENT = 1 << 0;
        /// The device is write-protected.
        const WRITE_PROTECTED = 1 << 1;

        const _ = !0;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusBits {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StatusBits({=u8:#x})", self.bits())
    }
}

/// Board-specific side of the bus contract.
///
/// One implementation is bound per bus instance at
/// [`LpspiBank::initialize`](crate::LpspiBank::initialize). Every method must
/// complete in bounded time; they are called from the transfer engine's
/// context and never suspend.
pub trait BoardHooks: Sync {
    /// Gate the block's clock and mux its pins.
    ///
    /// Called once, before the first handle for the bus is returned, with no
    /// driver lock held. A failed call may be retried by a later
    /// initialization.
    fn configure(&self, descriptor: &Descriptor) -> Result<(), BusError>;

    /// Assert or deassert chip select for `device`.
    ///
    /// Unknown devices must be ignored.
    fn select(&self, device: DeviceId, selected: bool);

    /// Report the status of `device`.
    fn status(&self, device: DeviceId) -> StatusBits;

    /// Switch `device` between its command and data phase.
    ///
    /// Boards without a data/command line keep the default, which reports
    /// [`BusError::Unsupported`].
    #[cfg(feature = "cmddata")]
    fn cmddata(&self, device: DeviceId, command: bool) -> Result<(), BusError> {
        let _ = (device, command);
        Err(BusError::Unsupported)
    }

    /// Whether this bus has a card-detect line able to raise media-change
    /// notifications.
    fn card_detect(&self) -> bool {
        false
    }
}

/// Receiver of media-change notifications.
///
/// The implementor is its own context. Closures implement this trait, so a
/// closure capturing its state can be registered directly. Invocations may
/// come from interrupt context.
pub trait MediaChangeCallback: Sync {
    /// Card presence changed on the bus `instance`.
    fn media_changed(&self, instance: Instance);
}

impl<F> MediaChangeCallback for F
where
    F: Fn(Instance) + Sync,
{
    fn media_changed(&self, instance: Instance) {
        self(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_bits_pass_through() {
        let bits = StatusBits::from_bits_retain(0b1000_0001);
        assert!(bits.contains(StatusBits::PRESENT));
        assert!(!bits.contains(StatusBits::WRITE_PROTECTED));
        assert_eq!(bits.bits(), 0b1000_0001);
    }

    #[test]
    fn device_id_from_raw() {
        assert_eq!(DeviceId::from(0x01), DeviceId(0x01));
    }
}
