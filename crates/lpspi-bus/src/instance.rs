//! Fixed LPSPI peripheral map of the S32K1xx family.

/// PCC functional clock feeding an LPSPI block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// System oscillator, second divider.
    SoscDiv2,
    /// Slow internal RC oscillator, second divider.
    SircDiv2,
    /// Fast internal RC oscillator, second divider.
    FircDiv2,
    /// System PLL, second divider.
    SpllDiv2,
}

/// One of the LPSPI blocks on the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instance {
    /// LPSPI0, bus 0.
    Lpspi0,
    /// LPSPI1, bus 1.
    Lpspi1,
    /// LPSPI2, bus 2.
    Lpspi2,
}

/// Static description of an LPSPI block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor {
    /// Block this entry describes.
    pub instance: Instance,
    /// Base address of the block's register file.
    pub base: usize,
    /// Functional clock selected in the PCC before the block is enabled.
    pub clock: ClockSource,
}

const LPSPI0: Descriptor = Descriptor {
    instance: Instance::Lpspi0,
    base: 0x4002_C000,
    clock: ClockSource::SircDiv2,
};

const LPSPI1: Descriptor = Descriptor {
    instance: Instance::Lpspi1,
    base: 0x4002_D000,
    clock: ClockSource::SircDiv2,
};

const LPSPI2: Descriptor = Descriptor {
    instance: Instance::Lpspi2,
    base: 0x4002_E000,
    clock: ClockSource::SircDiv2,
};

impl Instance {
    /// Every block the chip has, enabled or not.
    pub const ALL: [Instance; 3] =
        [Instance::Lpspi0, Instance::Lpspi1, Instance::Lpspi2];

    /// Map a logical bus number to a block. `None` if the chip has no such block.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Instance::Lpspi0),
            1 => Some(Instance::Lpspi1),
            2 => Some(Instance::Lpspi2),
            _ => None,
        }
    }

    /// Logical bus number of this block.
    pub const fn index(self) -> u8 {
        match self {
            Instance::Lpspi0 => 0,
            Instance::Lpspi1 => 1,
            Instance::Lpspi2 => 2,
        }
    }

    /// Whether this block is compiled into the current build.
    pub const fn is_enabled(self) -> bool {
        match self {
            Instance::Lpspi0 => cfg!(feature = "lpspi0"),
            Instance::Lpspi1 => cfg!(feature = "lpspi1"),
            Instance::Lpspi2 => cfg!(feature = "lpspi2"),
        }
    }

    /// Register base and clock source of this block.
    pub const fn descriptor(self) -> &'static Descriptor {
        match self {
            Instance::Lpspi0 => &LPSPI0,
            Instance::Lpspi1 => &LPSPI1,
            Instance::Lpspi2 => &LPSPI2,
        }
    }
}
