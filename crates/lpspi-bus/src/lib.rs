#![cfg_attr(not(test), no_std)]
//! Driver contract for the S32K1xx low-power SPI (LPSPI) bus bank.
//!
//! The chip carries a fixed set of LPSPI blocks. Each one enabled through a
//! Cargo feature (`lpspi0`, `lpspi1`, `lpspi2`) gets a slot in an
//! [`LpspiBank`]. Board bring-up code hands a [`BoardHooks`] implementation to
//! [`LpspiBank::initialize`], which configures the block once and returns a
//! [`BusHandle`]. Consumers (transfer engines, memory-card stacks) use the
//! handle to drive chip select, query device status, switch command/data
//! phases and register for card-detect notifications.
//!
//! Register-level programming of the block is left to the transfer engine;
//! [`LpspiDevice`] adapts any `embedded-hal` [`SpiBus`](embedded_hal::spi::SpiBus)
//! into a [`SpiDevice`](embedded_hal::spi::SpiDevice) that brackets every
//! transaction with the board's chip-select hook.
//!
//! # Concurrency
//!
//! Bindings are written during single-threaded bring-up and only read
//! afterwards. Storage sits behind an `embassy-sync` blocking mutex, so with
//! `CriticalSectionRawMutex` a card-detect interrupt always sees a complete
//! media-change binding. Concurrent calls to
//! [`BusHandle::register_media_change`] from several execution contexts are
//! not supported; callers must serialize them.

#[macro_use]
mod fmt;

mod bank;
mod bus;
mod device;
mod error;
mod hooks;
mod instance;

pub use bank::LpspiBank;
pub use bus::BusHandle;
pub use device::{DeviceError, LpspiDevice};
pub use error::BusError;
pub use hooks::{BoardHooks, DeviceId, MediaChangeCallback, StatusBits};
pub use instance::{ClockSource, Descriptor, Instance};
