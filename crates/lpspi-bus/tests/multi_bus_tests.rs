//! Buses enabled side by side.
//!
//! Run with `cargo test -p lpspi-bus --features lpspi1,lpspi2`.

use std::sync::Mutex;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use lpspi_bus::{BoardHooks, BusError, Descriptor, DeviceId, Instance, LpspiBank, StatusBits};

type Bank<'a> = LpspiBank<'a, CriticalSectionRawMutex>;

/// Board for one bus: remembers what it was asked to configure and select.
struct BusBoard {
    configured: Mutex<Vec<Instance>>,
    selects: Mutex<Vec<(DeviceId, bool)>>,
}

impl BusBoard {
    fn new() -> Self {
        Self { configured: Mutex::new(Vec::new()), selects: Mutex::new(Vec::new()) }
    }

    fn configured(&self) -> Vec<Instance> {
        self.configured.lock().unwrap().clone()
    }

    fn selects(&self) -> Vec<(DeviceId, bool)> {
        self.selects.lock().unwrap().clone()
    }
}

impl BoardHooks for BusBoard {
    fn configure(&self, descriptor: &Descriptor) -> Result<(), BusError> {
        self.configured.lock().unwrap().push(descriptor.instance);
        Ok(())
    }

    fn select(&self, device: DeviceId, selected: bool) {
        self.selects.lock().unwrap().push((device, selected));
    }

    fn status(&self, _device: DeviceId) -> StatusBits {
        StatusBits::PRESENT
    }

    fn card_detect(&self) -> bool {
        true
    }
}

#[test]
fn each_bus_configures_its_own_block() {
    let board0 = BusBoard::new();
    let board2 = BusBoard::new();
    let bank = Bank::new();

    let spi0 = bank.initialize(0, &board0).unwrap();
    let spi2 = bank.initialize(2, &board2).unwrap();

    assert!(!spi0.same_bus(&spi2));
    assert_eq!(spi2.instance(), Instance::Lpspi2);
    assert_eq!(spi2.descriptor().base, 0x4002_E000);
    assert_eq!(board0.configured(), vec![Instance::Lpspi0]);
    assert_eq!(board2.configured(), vec![Instance::Lpspi2]);
    assert!(bank.handle(Instance::Lpspi2).unwrap().same_bus(&spi2));
}

#[test]
fn select_reaches_only_the_addressed_bus() {
    let board0 = BusBoard::new();
    let board2 = BusBoard::new();
    let bank = Bank::new();
    let spi0 = bank.initialize(0, &board0).unwrap();
    let spi2 = bank.initialize(2, &board2).unwrap();

    spi2.select(DeviceId(0x03), true);
    spi0.select(DeviceId(0x01), true);

    assert_eq!(board2.selects(), vec![(DeviceId(0x03), true)]);
    assert_eq!(board0.selects(), vec![(DeviceId(0x01), true)]);
}

#[cfg(feature = "media-change")]
#[test]
fn media_change_bindings_are_per_bus() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let on_spi0 = AtomicUsize::new(0);
    let on_spi2 = AtomicUsize::new(0);
    let callback0 = |instance: Instance| {
        assert_eq!(instance, Instance::Lpspi0);
        on_spi0.fetch_add(1, Ordering::SeqCst);
    };
    let callback2 = |instance: Instance| {
        assert_eq!(instance, Instance::Lpspi2);
        on_spi2.fetch_add(1, Ordering::SeqCst);
    };
    let board0 = BusBoard::new();
    let board2 = BusBoard::new();
    let bank = Bank::new();
    let spi0 = bank.initialize(0, &board0).unwrap();
    let spi2 = bank.initialize(2, &board2).unwrap();

    spi2.register_media_change(&callback2).unwrap();
    assert!(!spi0.notify_media_change());
    assert_eq!(on_spi2.load(Ordering::SeqCst), 0);

    spi0.register_media_change(&callback0).unwrap();
    assert!(spi0.notify_media_change());
    assert!(spi2.notify_media_change());
    assert_eq!(on_spi0.load(Ordering::SeqCst), 1);
    assert_eq!(on_spi2.load(Ordering::SeqCst), 1);

    // Dropping one binding leaves the other in place.
    assert!(spi0.unregister_media_change());
    assert!(spi2.notify_media_change());
    assert_eq!(on_spi2.load(Ordering::SeqCst), 2);
}

#[cfg(feature = "lpspi1")]
#[test]
fn enabled_lpspi1_initializes() {
    let board = BusBoard::new();
    let bank = Bank::new();

    assert!(Instance::Lpspi1.is_enabled());
    let spi1 = bank.initialize(1, &board).unwrap();
    assert_eq!(spi1.instance(), Instance::Lpspi1);
    assert_eq!(spi1.descriptor().base, 0x4002_D000);
    assert_eq!(board.configured(), vec![Instance::Lpspi1]);
}
