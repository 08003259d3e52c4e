#![cfg_attr(not(test), no_std)]
//! Reference board layer for the LPSPI bus contract.
//!
//! [`GpioBoard`] implements [`lpspi_bus::BoardHooks`] with `embedded-hal`
//! digital pins: a chip-select table keyed by [`DeviceId`](lpspi_bus::DeviceId),
//! an optional card slot (card detect and write protect) and an optional
//! data/command line. Its [`poll_card_detect`](GpioBoard::poll_card_detect)
//! turns card-detect edges into media-change notifications on the bus handle.

#[macro_use]
mod fmt;

mod board;

pub use board::GpioBoard;
