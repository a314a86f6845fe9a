use serde::Serialize;

/// Market side implied by a net position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buyer,
    Seller,
    Flat,
}

impl Side {
    pub fn from_net_position(net_position: f64) -> Self {
        if net_position > 0.0 {
            Side::Buyer
        } else if net_position < 0.0 {
            Side::Seller
        } else {
            Side::Flat
        }
    }
}

/// Allocation result for one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Allocation {
    /// Intensity the free allocation is computed from
    pub allocation_intensity: f64,
    /// `output · allocation_intensity · free_share`
    pub base_free_allocation: f64,
    /// Extra allocation for the above-benchmark gap, never negative
    pub transitional_compensation: f64,
    /// Base plus transitional compensation
    pub free_allocation: f64,
    /// `emissions − free_allocation`
    pub net_position: f64,
}

impl Allocation {
    pub fn side(&self) -> Side {
        Side::from_net_position(self.net_position)
    }

    pub fn is_buyer(&self) -> bool {
        self.net_position > 0.0
    }

    pub fn is_seller(&self) -> bool {
        self.net_position < 0.0
    }
}
