use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::digital::{InputPin, OutputPin};
use heapless::Vec;
use lpspi_bus::{BoardHooks, BusError, BusHandle, Descriptor, DeviceId, StatusBits};
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

#[cfg(feature = "cmddata")]
const EIO: i32 = 5;

/// `bound` value before the board has configured any bus.
const UNBOUND: u8 = u8::MAX;

/// Removable-media slot: card-detect switch plus optional write-protect tab.
///
/// Card detect is active low (switch to ground when a card is inserted);
/// write protect is active high.
struct CardSlot<IN> {
    device: DeviceId,
    detect: IN,
    write_protect: Option<IN>,
}

/// Board hooks for one LPSPI bus built from plain GPIO lines.
///
/// * up to `N` devices, each with an active-low chip-select output,
/// * optionally one card slot whose device reports presence and write
///   protection (all other devices are soldered down and always present),
/// * optionally a data/command output shared by all devices (low selects the
///   command phase).
///
/// Pins sit behind an `embassy-sync` blocking mutex so the hooks can be
/// called through a shared reference from the transfer engine and from a
/// card-detect poll loop.
pub struct GpioBoard<M: RawMutex, OUT, IN, const N: usize> {
    chip_selects: Mutex<M, RefCell<Vec<(DeviceId, OUT), N>>>,
    card_slot: Option<Mutex<M, RefCell<CardSlot<IN>>>>,
    #[cfg(feature = "cmddata")]
    data_command: Option<Mutex<M, RefCell<OUT>>>,
    card_present: AtomicBool,
    /// Index of the bus this board configured, or [`UNBOUND`].
    bound: AtomicU8,
}

impl<M, OUT, IN, const N: usize> GpioBoard<M, OUT, IN, N>
where
    M: RawMutex,
    OUT: OutputPin,
    IN: InputPin,
{
    /// Board with no lines attached.
    pub fn new() -> Self {
        Self {
            chip_selects: Mutex::new(RefCell::new(Vec::new())),
            card_slot: None,
            #[cfg(feature = "cmddata")]
            data_command: None,
            card_present: AtomicBool::new(false),
            bound: AtomicU8::new(UNBOUND),
        }
    }

    /// Route `device` to the chip-select line `pin`.
    ///
    /// Gives the pin back if all `N` entries are taken.
    pub fn with_chip_select(mut self, device: DeviceId, pin: OUT) -> Result<Self, OUT> {
        self.chip_selects
            .get_mut()
            .get_mut()
            .push((device, pin))
            .map_err(|(_, pin)| pin)?;
        Ok(self)
    }

    /// Attach a card slot for `device`.
    pub fn with_card_slot(
        mut self,
        device: DeviceId,
        detect: IN,
        write_protect: Option<IN>,
    ) -> Self {
        let slot = CardSlot { device, detect, write_protect };
        self.card_slot = Some(Mutex::new(RefCell::new(slot)));
        self
    }

    /// Attach the data/command line.
    #[cfg(feature = "cmddata")]
    pub fn with_data_command(mut self, pin: OUT) -> Self {
        self.data_command = Some(Mutex::new(RefCell::new(pin)));
        self
    }

    /// Presence of the card as of the last [`poll_card_detect`](Self::poll_card_detect).
    pub fn card_present(&self) -> bool {
        self.card_present.load(Ordering::Acquire)
    }

    /// Sample the card-detect line and notify `handle` if presence changed.
    ///
    /// Meant for a periodic task or the card-detect edge interrupt. Returns
    /// `true` if presence changed since the previous poll. Every change is
    /// forwarded; flaps are not coalesced.
    ///
    /// `handle` must belong to the bus this board was bound to at
    /// initialization. Any other handle is refused without sampling the line.
    pub fn poll_card_detect<HM: RawMutex>(&self, handle: &BusHandle<'_, HM>) -> bool {
        if self.bound.load(Ordering::Acquire) != handle.instance().index() {
            warn!("card-detect poll through a handle for {}", handle.instance());
            return false;
        }
        let Some(present) = self.sample_card_detect() else {
            return false;
        };
        if self.card_present.swap(present, Ordering::AcqRel) == present {
            return false;
        }

        debug!("card {}", if present { "inserted" } else { "removed" });
        handle.notify_media_change();
        true
    }

    fn sample_card_detect(&self) -> Option<bool> {
        let slot = self.card_slot.as_ref()?;
        slot.lock(|slot| match slot.borrow_mut().detect.is_low() {
            Ok(present) => Some(present),
            Err(_) => {
                warn!("card-detect line unreadable");
                None
            }
        })
    }

    fn drive_chip_select(pin: &mut OUT, selected: bool) -> Result<(), OUT::Error> {
        if selected {
            pin.set_low()
        } else {
            pin.set_high()
        }
    }
}

impl<M, OUT, IN, const N: usize> Default for GpioBoard<M, OUT, IN, N>
where
    M: RawMutex,
    OUT: OutputPin,
    IN: InputPin,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M, OUT, IN, const N: usize> BoardHooks for GpioBoard<M, OUT, IN, N>
where
    M: RawMutex + Sync,
    OUT: OutputPin + Send,
    IN: InputPin + Send,
{
    /// Park every chip select deasserted and latch the initial card state.
    fn configure(&self, descriptor: &Descriptor) -> Result<(), BusError> {
        debug!("configuring board lines for {}", descriptor.instance);
        self.chip_selects.lock(|chip_selects| {
            chip_selects
                .borrow_mut()
                .iter_mut()
                .try_for_each(|(_, pin)| Self::drive_chip_select(pin, false))
                .map_err(|_| BusError::Peripheral)
        })?;

        if let Some(present) = self.sample_card_detect() {
            self.card_present.store(present, Ordering::Release);
        }
        self.bound.store(descriptor.instance.index(), Ordering::Release);
        Ok(())
    }

    fn select(&self, device: DeviceId, selected: bool) {
        self.chip_selects.lock(|chip_selects| {
            let mut chip_selects = chip_selects.borrow_mut();
            let Some((_, pin)) = chip_selects.iter_mut().find(|(id, _)| *id == device) else {
                return;
            };
            if Self::drive_chip_select(pin, selected).is_err() {
                warn!("chip select for {} stuck", device);
            }
        });
    }

    fn status(&self, device: DeviceId) -> StatusBits {
        let Some(slot) = self.card_slot.as_ref() else {
            return StatusBits::PRESENT;
        };
        slot.lock(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.device != device {
                return StatusBits::PRESENT;
            }

            let mut status = StatusBits::empty();
            match slot.detect.is_low() {
                Ok(true) => status |= StatusBits::PRESENT,
                Ok(false) => {}
                Err(_) => warn!("card-detect line unreadable, reporting {} absent", device),
            }
            if let Some(pin) = slot.write_protect.as_mut() {
                match pin.is_high() {
                    Ok(true) => status |= StatusBits::WRITE_PROTECTED,
                    Ok(false) => {}
                    Err(_) => warn!("write-protect line unreadable for {}", device),
                }
            }
            status
        })
    }

    #[cfg(feature = "cmddata")]
    fn cmddata(&self, _device: DeviceId, command: bool) -> Result<(), BusError> {
        let Some(line) = self.data_command.as_ref() else {
            return Err(BusError::Unsupported);
        };
        line.lock(|pin| {
            let mut pin = pin.borrow_mut();
            let driven = if command { pin.set_low() } else { pin.set_high() };
            driven.map_err(|_| BusError::Rejected(-EIO))
        })
    }

    fn card_detect(&self) -> bool {
        self.card_slot.is_some()
    }
}
