use core::marker::PhantomData;

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::bus::{BusHandle, LpspiBus};
use crate::error::BusError;
use crate::hooks::BoardHooks;
use crate::instance::Instance;

/// The chip's LPSPI blocks, one slot per block enabled in this build.
///
/// Meant to live in a `static`:
///
/// ```ignore
/// static LPSPI: LpspiBank<'static, CriticalSectionRawMutex> = LpspiBank::new();
///
/// let spi0 = LPSPI.initialize(0, &BOARD_SPI0)?;
/// ```
///
/// Blocks compiled out have no storage at all.
pub struct LpspiBank<'a, M: RawMutex> {
    #[cfg(feature = "lpspi0")]
    lpspi0: LpspiBus<'a, M>,
    #[cfg(feature = "lpspi1")]
    lpspi1: LpspiBus<'a, M>,
    #[cfg(feature = "lpspi2")]
    lpspi2: LpspiBus<'a, M>,
    _phantom: PhantomData<(&'a (), M)>,
}

impl<'a, M: RawMutex> LpspiBank<'a, M> {
    /// Bank with every enabled block still in reset.
    pub const fn new() -> Self {
        Self {
            #[cfg(feature = "lpspi0")]
            lpspi0: LpspiBus::new(Instance::Lpspi0),
            #[cfg(feature = "lpspi1")]
            lpspi1: LpspiBus::new(Instance::Lpspi1),
            #[cfg(feature = "lpspi2")]
            lpspi2: LpspiBus::new(Instance::Lpspi2),
            _phantom: PhantomData,
        }
    }

    /// Bring up bus `bus` with the board's `hooks` and return its handle.
    ///
    /// Fails for an index the chip does not have, for a block not enabled in
    /// this build (without touching the hardware), and when `hooks` cannot
    /// configure the block. After a failed configuration the block stays in
    /// reset and the call may be repeated.
    ///
    /// Initializing a bus twice returns a handle to the first binding; the
    /// second `hooks` are ignored.
    pub fn initialize(
        &'a self,
        bus: u8,
        hooks: &'a dyn BoardHooks,
    ) -> Result<BusHandle<'a, M>, BusError> {
        let instance = Instance::from_index(bus).ok_or_else(|| {
            warn!("no LPSPI block with index {=u8}", bus);
            BusError::UnknownBus(bus)
        })?;
        self.initialize_instance(instance, hooks)
    }

    /// Same as [`initialize`](Self::initialize), addressed by block.
    pub fn initialize_instance(
        &'a self,
        instance: Instance,
        hooks: &'a dyn BoardHooks,
    ) -> Result<BusHandle<'a, M>, BusError> {
        match self.slot(instance) {
            Some(bus) => bus.bring_up(hooks),
            None => {
                warn!("{} is not enabled", instance);
                Err(BusError::Disabled(instance))
            }
        }
    }

    /// Handle to a bus that has already been initialized.
    ///
    /// Lets card-detect interrupt handlers reach the bus without holding on
    /// to the handle returned at bring-up.
    pub fn handle(&'a self, instance: Instance) -> Option<BusHandle<'a, M>> {
        self.slot(instance).and_then(LpspiBus::handle)
    }

    fn slot(&'a self, instance: Instance) -> Option<&'a LpspiBus<'a, M>> {
        match instance {
            #[cfg(feature = "lpspi0")]
            Instance::Lpspi0 => Some(&self.lpspi0),
            #[cfg(feature = "lpspi1")]
            Instance::Lpspi1 => Some(&self.lpspi1),
            #[cfg(feature = "lpspi2")]
            Instance::Lpspi2 => Some(&self.lpspi2),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl<M: RawMutex> Default for LpspiBank<'_, M> {
    fn default() -> Self {
        Self::new()
    }
}
