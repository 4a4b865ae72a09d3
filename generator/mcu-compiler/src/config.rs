use mcu_model::consts::DEFAULT_ADDRESS_WIDTH;

/// Knobs of one generator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Physical address width of the target in bits; fixed segments must end
    /// within `2^address_width`.
    pub address_width: u8,
    /// Largest region order the root of a process' region tree may take.
    pub region_bound: u8,
}

impl GeneratorConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            address_width: DEFAULT_ADDRESS_WIDTH,
            region_bound: DEFAULT_ADDRESS_WIDTH,
        }
    }

    #[must_use]
    pub const fn with_address_width(mut self, bits: u8) -> Self {
        self.address_width = bits;
        self
    }

    #[must_use]
    pub const fn with_region_bound(mut self, order: u8) -> Self {
        self.region_bound = order;
        self
    }

    /// First address past the physical address space, `None` for an
    /// unusable width.
    #[must_use]
    pub const fn address_space_end(self) -> Option<u64> {
        if self.address_width == 0 || self.address_width > 63 {
            None
        } else {
            Some(1 << self.address_width)
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcu_model::consts::ADDRESS_SPACE_END;

    #[test]
    fn defaults_cover_a_32_bit_space() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.address_space_end(), Some(ADDRESS_SPACE_END));
        assert_eq!(cfg.region_bound, 32);

        let narrow = cfg.with_address_width(24).with_region_bound(20);
        assert_eq!(narrow.address_space_end(), Some(1 << 24));
        assert_eq!(narrow.region_bound, 20);
        assert_eq!(cfg.with_address_width(64).address_space_end(), None);
    }
}
