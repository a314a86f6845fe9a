//! Clearing price resolution
//!
//! Every regime consumes the same participants and produces one price
//! within the configured bounds.

use crate::domain::{Participant, PriceBounds};
use crate::error::ClearingError;
use crate::result::ClearingOutcome;
use crate::Result;
use common::{non_zero, ratio_or, EPSILON};
use config::{MarketConfig, PriceSearch, PricingRegime};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use tracing::{debug, info};

/// A procedure that resolves the clearing price
pub trait PricingProcedure: std::fmt::Debug + Send + Sync {
    fn regime(&self) -> PricingRegime;

    fn clear(&self, participants: &[Participant], bounds: PriceBounds) -> ClearingOutcome;
}

/// Procedure for the configured regime.
///
/// The only place a [`PricingRegime`] is mapped to behaviour.
pub fn procedure_for(market: &MarketConfig) -> Result<Box<dyn PricingProcedure>> {
    let procedure: Box<dyn PricingProcedure> = match market.pricing_regime {
        PricingRegime::MarketClearing => {
            Box::new(MarketClearing::new(market.price_step, market.search)?)
        }
        PricingRegime::AverageComplianceCost => Box::new(AverageComplianceCost),
        PricingRegime::AuctionClearing => {
            Box::new(AuctionClearing::new(market.auction_supply_share)?)
        }
    };
    Ok(procedure)
}

/// Σ buyer net positions, Σ |seller net positions|, buyer count, seller count
fn totals(participants: &[Participant]) -> (f64, f64, usize, usize) {
    participants
        .iter()
        .fold((0.0, 0.0, 0, 0), |(demand, supply, buyers, sellers), p| {
            if p.is_buyer() {
                (demand + p.net_position, supply, buyers + 1, sellers)
            } else if p.is_seller() {
                (demand, supply - p.net_position, buyers, sellers + 1)
            } else {
                (demand, supply, buyers, sellers)
            }
        })
}

// ============================================================================
// Market Clearing
// ============================================================================

/// First candidate price at which willing supply meets willing demand
#[derive(Debug, Clone, Copy)]
pub struct MarketClearing {
    step: f64,
    search: PriceSearch,
}

impl MarketClearing {
    pub fn new(step: f64, search: PriceSearch) -> Result<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(ClearingError::InvalidPriceStep(step));
        }
        Ok(Self { step, search })
    }

    /// Index of the last candidate; candidate `last` is exactly `max`.
    fn last_index(&self, bounds: PriceBounds) -> usize {
        let steps = (bounds.range() / self.step - EPSILON).ceil();
        if steps.is_finite() && steps >= 1.0 {
            steps as usize
        } else {
            1
        }
    }

    fn candidate(&self, index: usize, last: usize, bounds: PriceBounds) -> f64 {
        if index >= last {
            bounds.max()
        } else {
            (bounds.min() + index as f64 * self.step).min(bounds.max())
        }
    }

    /// Quantity buyers still want at `price`
    pub fn demand(participants: &[Participant], price: f64, bounds: PriceBounds) -> f64 {
        participants
            .iter()
            .filter(|p| p.is_buyer())
            .map(|p| {
                let willingness =
                    1.0 - (price - bounds.min()) / non_zero(p.bid - bounds.min());
                p.net_position * willingness.clamp(0.0, 1.0)
            })
            .sum()
    }

    /// Quantity sellers are willing to release at `price`
    pub fn supply(participants: &[Participant], price: f64, bounds: PriceBounds) -> f64 {
        participants
            .iter()
            .filter(|p| p.is_seller())
            .map(|p| {
                let willingness =
                    1.0 - (bounds.max() - price) / non_zero(bounds.max() - p.ask);
                -p.net_position * willingness.clamp(0.0, 1.0)
            })
            .sum()
    }

    fn clears(participants: &[Participant], price: f64, bounds: PriceBounds) -> bool {
        Self::supply(participants, price, bounds) >= Self::demand(participants, price, bounds)
    }

    /// (first clearing index, evaluations)
    fn search_linear(
        &self,
        participants: &[Participant],
        bounds: PriceBounds,
    ) -> (Option<usize>, usize) {
        let last = self.last_index(bounds);
        for index in 0..=last {
            if Self::clears(participants, self.candidate(index, last, bounds), bounds) {
                return (Some(index), index + 1);
            }
        }
        (None, last + 1)
    }

    /// Demand is non-increasing and supply non-decreasing in price, so the
    /// clearing predicate flips at most once over the candidates.
    fn search_binary(
        &self,
        participants: &[Participant],
        bounds: PriceBounds,
    ) -> (Option<usize>, usize) {
        let last = self.last_index(bounds);
        let (mut low, mut high) = (0usize, last + 1);
        let mut evaluations = 0;
        while low < high {
            let mid = low + (high - low) / 2;
            evaluations += 1;
            if Self::clears(participants, self.candidate(mid, last, bounds), bounds) {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        if low > last {
            (None, evaluations)
        } else {
            (Some(low), evaluations)
        }
    }
}

impl PricingProcedure for MarketClearing {
    fn regime(&self) -> PricingRegime {
        PricingRegime::MarketClearing
    }

    fn clear(&self, participants: &[Participant], bounds: PriceBounds) -> ClearingOutcome {
        let (total_demand, total_supply, buyer_count, seller_count) = totals(participants);

        let (found, evaluations) = match self.search {
            PriceSearch::Binary => self.search_binary(participants, bounds),
            PriceSearch::Linear => self.search_linear(participants, bounds),
        };
        let last = self.last_index(bounds);
        let price = found
            .map(|index| self.candidate(index, last, bounds))
            .unwrap_or(bounds.max());

        debug!(price, evaluations, candidates = last + 1, search = ?self.search, "Market cleared");

        ClearingOutcome {
            price: bounds.clamp(price),
            regime: self.regime(),
            total_demand,
            total_supply,
            buyer_count,
            seller_count,
            evaluations,
        }
    }
}

// ============================================================================
// Average Compliance Cost
// ============================================================================

/// Net-position-weighted mean of buyer bids
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageComplianceCost;

impl PricingProcedure for AverageComplianceCost {
    fn regime(&self) -> PricingRegime {
        PricingRegime::AverageComplianceCost
    }

    fn clear(&self, participants: &[Participant], bounds: PriceBounds) -> ClearingOutcome {
        let (total_demand, total_supply, buyer_count, seller_count) = totals(participants);

        let weighted: f64 = participants
            .iter()
            .filter(|p| p.is_buyer())
            .map(|p| p.net_position * p.bid)
            .sum();
        let price = ratio_or(weighted, total_demand, bounds.min());

        ClearingOutcome {
            price: bounds.clamp(price),
            regime: self.regime(),
            total_demand,
            total_supply,
            buyer_count,
            seller_count,
            evaluations: 0,
        }
    }
}

// ============================================================================
// Auction Clearing
// ============================================================================

/// Uniform price auction of `supply_share` times compliance demand
#[derive(Debug, Clone, Copy)]
pub struct AuctionClearing {
    supply_share: f64,
}

impl AuctionClearing {
    pub fn new(supply_share: f64) -> Result<Self> {
        if !(supply_share.is_finite() && supply_share > 0.0) {
            return Err(ClearingError::InvalidSupplyShare(supply_share));
        }
        Ok(Self { supply_share })
    }

    /// Bid of the buyer whose demand exhausts `supply`, highest bids first.
    /// Ties in bid keep input order.
    fn marginal_bid(participants: &[Participant], supply: f64) -> Option<f64> {
        let mut buyers: Vec<&Participant> =
            participants.iter().filter(|p| p.is_buyer()).collect();
        buyers.sort_by_key(|p| Reverse(OrderedFloat(p.bid)));

        let mut cumulative = 0.0;
        for buyer in &buyers {
            cumulative += buyer.net_position;
            if cumulative >= supply {
                return Some(buyer.bid);
            }
        }
        buyers.last().map(|p| p.bid)
    }
}

impl PricingProcedure for AuctionClearing {
    fn regime(&self) -> PricingRegime {
        PricingRegime::AuctionClearing
    }

    fn clear(&self, participants: &[Participant], bounds: PriceBounds) -> ClearingOutcome {
        let (total_demand, _, buyer_count, seller_count) = totals(participants);
        let supply = total_demand * self.supply_share;

        let price = if supply >= total_demand {
            bounds.min()
        } else {
            Self::marginal_bid(participants, supply).unwrap_or(bounds.min())
        };

        ClearingOutcome {
            price: bounds.clamp(price),
            regime: self.regime(),
            total_demand,
            total_supply: supply,
            buyer_count,
            seller_count,
            evaluations: 0,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Price bounds plus the configured procedure
#[derive(Debug)]
pub struct ClearingEngine {
    bounds: PriceBounds,
    procedure: Box<dyn PricingProcedure>,
}

impl ClearingEngine {
    pub fn new(market: &MarketConfig) -> Result<Self> {
        Ok(Self {
            bounds: PriceBounds::new(market.price_min, market.price_max)?,
            procedure: procedure_for(market)?,
        })
    }

    pub fn bounds(&self) -> PriceBounds {
        self.bounds
    }

    pub fn regime(&self) -> PricingRegime {
        self.procedure.regime()
    }

    pub fn clear(&self, participants: &[Participant]) -> ClearingOutcome {
        let outcome = self.procedure.clear(participants, self.bounds);
        info!(
            regime = %outcome.regime,
            price = outcome.price,
            buyers = outcome.buyer_count,
            sellers = outcome.seller_count,
            demand = outcome.total_demand,
            supply = outcome.total_supply,
            "Clearing price resolved"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const TOLERANCE: f64 = 1e-9;

    fn bounds() -> PriceBounds {
        PriceBounds::new(5.0, 20.0).unwrap()
    }

    fn market(regime: PricingRegime) -> MarketConfig {
        MarketConfig {
            pricing_regime: regime,
            ..MarketConfig::default()
        }
    }

    fn buyer(net_position: f64, bid: f64) -> Participant {
        Participant {
            net_position,
            bid,
            ask: 20.0,
        }
    }

    fn seller(net_position: f64, ask: f64) -> Participant {
        Participant {
            net_position,
            bid: 5.0,
            ask,
        }
    }

    fn book() -> Vec<Participant> {
        vec![
            buyer(10.0, 14.0),
            seller(-6.0, 9.0),
            buyer(4.0, 18.0),
            seller(-12.0, 11.0),
            buyer(7.5, 8.0),
            Participant {
                net_position: 0.0,
                bid: 5.5,
                ask: 19.5,
            },
        ]
    }

    #[test]
    fn test_procedure_dispatch() {
        for regime in [
            PricingRegime::MarketClearing,
            PricingRegime::AverageComplianceCost,
            PricingRegime::AuctionClearing,
        ] {
            assert_eq!(procedure_for(&market(regime)).unwrap().regime(), regime);
        }
    }

    #[test]
    fn test_invalid_market_parameters() {
        let mut config = market(PricingRegime::MarketClearing);
        config.price_step = 0.0;
        assert_matches!(ClearingEngine::new(&config), Err(ClearingError::InvalidPriceStep(_)));

        let mut config = market(PricingRegime::AuctionClearing);
        config.auction_supply_share = -1.0;
        assert_matches!(ClearingEngine::new(&config), Err(ClearingError::InvalidSupplyShare(_)));

        let mut config = market(PricingRegime::MarketClearing);
        config.price_max = 1.0;
        assert_matches!(
            ClearingEngine::new(&config),
            Err(ClearingError::InvalidPriceBounds { .. })
        );
    }

    #[test]
    fn test_demand_and_supply_monotone() {
        let participants = book();
        let mut last_demand = f64::INFINITY;
        let mut last_supply = f64::NEG_INFINITY;
        for i in 0..=150 {
            let price = 5.0 + i as f64 * 0.1;
            let demand = MarketClearing::demand(&participants, price, bounds());
            let supply = MarketClearing::supply(&participants, price, bounds());
            assert!(demand <= last_demand);
            assert!(supply >= last_supply);
            last_demand = demand;
            last_supply = supply;
        }
    }

    #[test]
    fn test_binary_matches_linear() {
        let books = vec![
            book(),
            vec![buyer(5.0, 20.0), seller(-1.0, 5.0)],
            vec![buyer(100.0, 19.9), seller(-0.5, 19.0)],
            vec![seller(-3.0, 7.0)],
            vec![buyer(3.0, 5.0), seller(-3.0, 20.0)],
            Vec::new(),
        ];
        for step in [0.01, 0.07, 1.0, 4.0, 15.0, 100.0] {
            let linear = MarketClearing::new(step, PriceSearch::Linear).unwrap();
            let binary = MarketClearing::new(step, PriceSearch::Binary).unwrap();
            for participants in &books {
                let a = linear.clear(participants, bounds());
                let b = binary.clear(participants, bounds());
                assert_eq!(a.price, b.price, "step {} book {:?}", step, participants);
            }
        }
    }

    #[test]
    fn test_last_candidate_is_max() {
        let procedure = MarketClearing::new(4.0, PriceSearch::Linear).unwrap();
        let last = procedure.last_index(bounds());
        assert_eq!(last, 4);
        assert_eq!(procedure.candidate(3, last, bounds()), 17.0);
        assert_eq!(procedure.candidate(last, last, bounds()), 20.0);
    }

    #[test]
    fn test_market_clearing_without_buyers_is_min() {
        let engine = ClearingEngine::new(&market(PricingRegime::MarketClearing)).unwrap();
        let outcome = engine.clear(&[seller(-5.0, 12.0)]);
        assert_eq!(outcome.price, 5.0);
        assert_eq!(outcome.seller_count, 1);
        assert!(!outcome.has_buyers());
    }

    #[test]
    fn test_market_clearing_without_sellers() {
        // Demand only reaches zero once the price passes the highest bid
        let procedure = MarketClearing::new(0.5, PriceSearch::Linear).unwrap();
        let outcome = procedure.clear(&[buyer(5.0, 12.0)], bounds());
        assert!((outcome.price - 12.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_market_clearing_interior_price() {
        // buyer(10, bid 15): demand = 10·(1 − (p−5)/10)
        // seller(−10, ask 10): supply = 10·(1 − (20−p)/10)
        // equal at p = 12.5
        let procedure = MarketClearing::new(0.01, PriceSearch::Binary).unwrap();
        let outcome = procedure.clear(&[buyer(10.0, 15.0), seller(-10.0, 10.0)], bounds());
        assert!((outcome.price - 12.5).abs() < 0.01 + TOLERANCE);
        assert_eq!(outcome.total_demand, 10.0);
        assert_eq!(outcome.total_supply, 10.0);
        assert!(outcome.evaluations < 20);
    }

    #[test]
    fn test_average_compliance_cost() {
        let outcome = AverageComplianceCost.clear(&book(), bounds());
        let expected = (10.0 * 14.0 + 4.0 * 18.0 + 7.5 * 8.0) / 21.5;
        assert!((outcome.price - expected).abs() < TOLERANCE);
        assert_eq!(outcome.buyer_count, 3);
        assert_eq!(outcome.seller_count, 2);
        assert_eq!(outcome.total_supply, 18.0);
    }

    #[test]
    fn test_average_compliance_cost_without_buyers_is_min() {
        let outcome = AverageComplianceCost.clear(&[seller(-2.0, 10.0)], bounds());
        assert_eq!(outcome.price, 5.0);
    }

    #[test]
    fn test_auction_full_supply_is_min() {
        let outcome = AuctionClearing::new(1.0).unwrap().clear(&book(), bounds());
        assert_eq!(outcome.price, 5.0);
        assert_eq!(outcome.total_supply, outcome.total_demand);
    }

    #[test]
    fn test_auction_scarcity_marginal_bid() {
        // bids high to low: 18 (4), 14 (10), 8 (7.5); supply 0.5·21.5 = 10.75
        let outcome = AuctionClearing::new(0.5).unwrap().clear(&book(), bounds());
        assert_eq!(outcome.price, 14.0);
        assert!((outcome.total_supply - 10.75).abs() < TOLERANCE);

        let outcome = AuctionClearing::new(0.1).unwrap().clear(&book(), bounds());
        assert_eq!(outcome.price, 18.0);
    }

    #[test]
    fn test_auction_tie_keeps_input_order() {
        let participants = vec![buyer(2.0, 12.0), buyer(3.0, 12.0), buyer(5.0, 9.0)];
        let outcome = AuctionClearing::new(0.3).unwrap().clear(&participants, bounds());
        assert_eq!(outcome.price, 12.0);
    }

    #[test]
    fn test_price_always_within_bounds() {
        let books = vec![book(), vec![buyer(1.0, 40.0)], vec![seller(-1.0, -3.0)], Vec::new()];
        for regime in [
            PricingRegime::MarketClearing,
            PricingRegime::AverageComplianceCost,
            PricingRegime::AuctionClearing,
        ] {
            let mut config = market(regime);
            config.auction_supply_share = 0.4;
            let engine = ClearingEngine::new(&config).unwrap();
            for participants in &books {
                assert!(engine.bounds().contains(engine.clear(participants).price));
            }
        }
    }
}
