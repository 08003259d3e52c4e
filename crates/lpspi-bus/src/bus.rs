use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::error::BusError;
use crate::hooks::{BoardHooks, DeviceId, MediaChangeCallback, StatusBits};
use crate::instance::{Descriptor, Instance};

/// Bring-up state of one block.
#[derive(Clone, Copy)]
enum Binding<'a> {
    /// Block still in reset.
    Reset,
    /// The board's `configure` is running.
    Configuring,
    Ready(&'a dyn BoardHooks),
}

/// Storage behind one enabled LPSPI block.
pub(crate) struct LpspiBus<'a, M: RawMutex> {
    instance: Instance,
    binding: Mutex<M, Cell<Binding<'a>>>,
    #[cfg(feature = "media-change")]
    media_change: Mutex<M, Cell<Option<&'a dyn MediaChangeCallback>>>,
}

impl<'a, M: RawMutex> LpspiBus<'a, M> {
    pub(crate) const fn new(instance: Instance) -> Self {
        Self {
            instance,
            binding: Mutex::new(Cell::new(Binding::Reset)),
            #[cfg(feature = "media-change")]
            media_change: Mutex::new(Cell::new(None)),
        }
    }

    /// Configure the block and bind `hooks`, unless that already happened.
    ///
    /// A second call hands out a handle to the existing binding and leaves the
    /// hardware alone; the `hooks` passed in are dropped on the floor.
    ///
    /// The lock is only held to claim the block, `configure` itself runs with
    /// it released. Re-entering bring-up from inside `configure` fails with
    /// [`BusError::Busy`].
    pub(crate) fn bring_up(
        &'a self,
        hooks: &'a dyn BoardHooks,
    ) -> Result<BusHandle<'a, M>, BusError> {
        let index = self.instance.index();
        let claimed = self.binding.lock(|cell| match cell.get() {
            Binding::Ready(bound) => {
                debug!("LPSPI{=u8} already initialized", index);
                Ok(Some(bound))
            }
            Binding::Configuring => {
                warn!("LPSPI{=u8} bring-up already in progress", index);
                Err(BusError::Busy)
            }
            Binding::Reset => {
                cell.set(Binding::Configuring);
                Ok(None)
            }
        })?;
        if let Some(bound) = claimed {
            return Ok(BusHandle { bus: self, hooks: bound });
        }

        let configured = hooks.configure(self.instance.descriptor());
        self.binding.lock(|cell| {
            cell.set(match configured {
                Ok(()) => Binding::Ready(hooks),
                Err(_) => Binding::Reset,
            })
        });
        configured.map_err(|err| {
            warn!("LPSPI{=u8} bring-up failed: {}", index, err);
            err
        })?;

        info!("LPSPI{=u8} ready", index);
        Ok(BusHandle { bus: self, hooks })
    }

    #[cfg(feature = "media-change")]
    fn swap_media_change(
        &self,
        callback: Option<&'a dyn MediaChangeCallback>,
    ) -> Option<&'a dyn MediaChangeCallback> {
        self.media_change.lock(|cell| cell.replace(callback))
    }

    #[cfg(not(feature = "media-change"))]
    fn swap_media_change(
        &self,
        _callback: Option<&'a dyn MediaChangeCallback>,
    ) -> Option<&'a dyn MediaChangeCallback> {
        None
    }

    #[cfg(feature = "media-change")]
    fn media_change(&self) -> Option<&'a dyn MediaChangeCallback> {
        self.media_change.lock(|cell| cell.get())
    }

    #[cfg(not(feature = "media-change"))]
    fn media_change(&self) -> Option<&'a dyn MediaChangeCallback> {
        None
    }

    pub(crate) fn handle(&'a self) -> Option<BusHandle<'a, M>> {
        match self.binding.lock(|cell| cell.get()) {
            Binding::Ready(hooks) => Some(BusHandle { bus: self, hooks }),
            Binding::Reset | Binding::Configuring => None,
        }
    }
}

/// Handle to an initialized LPSPI bus.
///
/// Handles are plain references into the [`LpspiBank`](crate::LpspiBank);
/// the bus lives as long as the bank and is never torn down.
pub struct BusHandle<'a, M: RawMutex> {
    bus: &'a LpspiBus<'a, M>,
    hooks: &'a dyn BoardHooks,
}

impl<M: RawMutex> Clone for BusHandle<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex> Copy for BusHandle<'_, M> {}

impl<'a, M: RawMutex> BusHandle<'a, M> {
    /// Block this handle drives.
    pub fn instance(&self) -> Instance {
        self.bus.instance
    }

    /// Register base and clock source of the block.
    pub fn descriptor(&self) -> &'static Descriptor {
        self.bus.instance.descriptor()
    }

    /// Returns `true` if both handles drive the same block.
    pub fn same_bus(&self, other: &Self) -> bool {
        core::ptr::eq(self.bus, other.bus)
    }

    /// Assert (`true`) or deassert (`false`) chip select for `device`.
    #[inline]
    pub fn select(&self, device: DeviceId, selected: bool) {
        self.hooks.select(device, selected);
    }

    /// Status of `device`, exactly as the board reports it.
    #[inline]
    pub fn status(&self, device: DeviceId) -> StatusBits {
        self.hooks.status(device)
    }

    /// Put `device` into its command (`true`) or data (`false`) phase.
    ///
    /// An error means the in-flight transfer must be aborted; nothing is
    /// retried here.
    #[cfg(feature = "cmddata")]
    pub fn cmddata(&self, device: DeviceId, command: bool) -> Result<(), BusError> {
        self.hooks.cmddata(device, command).map_err(|err| {
            warn!(
                "LPSPI{=u8} cmddata rejected for {}: {}",
                self.bus.instance.index(),
                device,
                err
            );
            err
        })
    }

    /// Bind `callback` to this bus's card-detect notifications.
    ///
    /// Replaces any earlier binding in one step. Fails with
    /// [`BusError::Unsupported`] if media-change support is compiled out or
    /// the board has no card-detect line on this bus. The callback must not
    /// call back into [`LpspiBank::initialize`](crate::LpspiBank::initialize).
    pub fn register_media_change(
        &self,
        callback: &'a dyn MediaChangeCallback,
    ) -> Result<(), BusError> {
        if !cfg!(feature = "media-change") || !self.hooks.card_detect() {
            return Err(BusError::Unsupported);
        }
        self.bus.swap_media_change(Some(callback));
        debug!("LPSPI{=u8} media-change callback bound", self.bus.instance.index());
        Ok(())
    }

    /// Drop the media-change binding. Returns `true` if one was bound.
    pub fn unregister_media_change(&self) -> bool {
        self.bus.swap_media_change(None).is_some()
    }

    /// Deliver a presence change to the bound callback.
    ///
    /// Called by the board's card-detect interrupt or poll loop. Returns
    /// `true` if a callback was bound and invoked.
    pub fn notify_media_change(&self) -> bool {
        match self.bus.media_change() {
            Some(callback) => {
                callback.media_changed(self.bus.instance);
                true
            }
            None => false,
        }
    }
}
