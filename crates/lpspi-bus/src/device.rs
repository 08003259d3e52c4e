use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{self, ErrorKind, ErrorType, Operation, SpiBus, SpiDevice};

use crate::bus::BusHandle;
use crate::error::BusError;
use crate::hooks::{DeviceId, StatusBits};

/// Error from an [`LpspiDevice`] transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<E> {
    /// The underlying bus transfer failed.
    Spi(E),
    /// A board hook refused the request.
    Bus(BusError),
}

impl<E: spi::Error> spi::Error for DeviceError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            DeviceError::Spi(err) => err.kind(),
            DeviceError::Bus(_) => ErrorKind::Other,
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for DeviceError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DeviceError::Spi(err) => write!(f, "SPI transfer error: {:?}", err),
            DeviceError::Bus(err) => write!(f, "bus error: {}", err),
        }
    }
}

/// One device on an LPSPI bus, driven through the board's chip-select hook.
///
/// `BUS` is the transfer engine: anything implementing the `embedded-hal`
/// [`SpiBus`] for the block behind `handle`. Each transaction asserts chip
/// select for `device`, runs the operations, flushes the bus and deasserts
/// chip select again, also when an operation fails.
pub struct LpspiDevice<'a, M: RawMutex, BUS, D> {
    handle: BusHandle<'a, M>,
    device: DeviceId,
    bus: BUS,
    delay: D,
}

impl<'a, M: RawMutex, BUS, D> LpspiDevice<'a, M, BUS, D> {
    /// Bind `device` on the bus behind `handle` to the transfer engine `bus`.
    pub fn new(handle: BusHandle<'a, M>, device: DeviceId, bus: BUS, delay: D) -> Self {
        Self { handle, device, bus, delay }
    }

    /// Device whose chip select this adapter drives.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Handle of the bus the device sits on.
    pub fn handle(&self) -> BusHandle<'a, M> {
        self.handle
    }

    /// Status of this device as reported by the board.
    pub fn status(&self) -> StatusBits {
        self.handle.status(self.device)
    }

    /// Borrow the transfer engine.
    pub fn bus(&self) -> &BUS {
        &self.bus
    }

    /// Give back the transfer engine.
    pub fn release(self) -> BUS {
        self.bus
    }
}

impl<M: RawMutex, BUS: SpiBus, D: DelayNs> LpspiDevice<'_, M, BUS, D> {
    fn run(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BUS::Error> {
        for op in operations {
            match op {
                Operation::Read(buf) => self.bus.read(buf)?,
                Operation::Write(buf) => self.bus.write(buf)?,
                Operation::Transfer(read, write) => self.bus.transfer(read, write)?,
                Operation::TransferInPlace(buf) => self.bus.transfer_in_place(buf)?,
                Operation::DelayNs(ns) => {
                    self.bus.flush()?;
                    self.delay.delay_ns(*ns);
                }
            }
        }
        Ok(())
    }

    /// Send `command` with the device switched to its command phase.
    ///
    /// The data phase is restored afterwards. If the board refuses the switch
    /// nothing is sent and the error is returned for the caller to abort on.
    #[cfg(feature = "cmddata")]
    pub fn command(&mut self, command: &[u8]) -> Result<(), DeviceError<BUS::Error>> {
        self.handle.select(self.device, true);
        let result = self.command_phase(command);
        self.handle.select(self.device, false);
        result
    }

    #[cfg(feature = "cmddata")]
    fn command_phase(&mut self, command: &[u8]) -> Result<(), DeviceError<BUS::Error>> {
        self.handle
            .cmddata(self.device, true)
            .map_err(DeviceError::Bus)?;
        let written = self.bus.write(command).and_then(|()| self.bus.flush());
        let restored = self.handle.cmddata(self.device, false);
        written.map_err(DeviceError::Spi)?;
        restored.map_err(DeviceError::Bus)
    }
}

impl<M: RawMutex, BUS: ErrorType, D> ErrorType for LpspiDevice<'_, M, BUS, D> {
    type Error = DeviceError<BUS::Error>;
}

impl<M: RawMutex, BUS: SpiBus, D: DelayNs> SpiDevice for LpspiDevice<'_, M, BUS, D> {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        self.handle.select(self.device, true);
        let result = self.run(operations);
        let flushed = self.bus.flush();
        self.handle.select(self.device, false);

        result.and(flushed).map_err(DeviceError::Spi)
    }
}
