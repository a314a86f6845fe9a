use crate::error::SettlementError;
use crate::Result;
use common::safe_ratio;
use serde::Serialize;

/// Cashflows of one entity at the clearing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Settlement {
    pub cost: f64,
    pub revenue: f64,
    /// `revenue − cost`
    pub net_cashflow: f64,
    pub cost_per_unit: f64,
    pub revenue_per_unit: f64,
    pub net_cashflow_per_unit: f64,
    /// `net_cashflow_per_unit × fx_rate`
    pub net_cashflow_local_per_unit: f64,
}

/// Settle one net position at `price`
pub fn settle(net_position: f64, output: f64, price: f64, fx_rate: f64) -> Settlement {
    let cost = net_position.max(0.0) * price;
    let revenue = (-net_position).max(0.0) * price;
    let net_cashflow = revenue - cost;
    let net_cashflow_per_unit = safe_ratio(net_cashflow, output);

    Settlement {
        cost,
        revenue,
        net_cashflow,
        cost_per_unit: safe_ratio(cost, output),
        revenue_per_unit: safe_ratio(revenue, output),
        net_cashflow_per_unit,
        net_cashflow_local_per_unit: net_cashflow_per_unit * fx_rate,
    }
}

/// Settlement at one price and exchange rate
#[derive(Debug, Clone, Copy)]
pub struct SettlementCalculator {
    price: f64,
    fx_rate: f64,
}

impl SettlementCalculator {
    pub fn new(price: f64, fx_rate: f64) -> Result<Self> {
        if !(price.is_finite() && price >= 0.0) {
            return Err(SettlementError::InvalidPrice(price));
        }
        if !(fx_rate.is_finite() && fx_rate > 0.0) {
            return Err(SettlementError::InvalidFxRate(fx_rate));
        }
        Ok(Self { price, fx_rate })
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn fx_rate(&self) -> f64 {
        self.fx_rate
    }

    pub fn settle(&self, net_position: f64, output: f64) -> Settlement {
        settle(net_position, output, self.price, self.fx_rate)
    }
}
