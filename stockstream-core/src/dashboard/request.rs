//! Panel requests: which panel, with which control values.

use serde::{Deserialize, Serialize};

use super::PanelError;
use crate::domain::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PanelKind {
    #[default]
    Comparison,
    RealTime,
    Prediction,
    About,
}

impl PanelKind {
    pub const ALL: [PanelKind; 4] = [
        PanelKind::Comparison,
        PanelKind::RealTime,
        PanelKind::Prediction,
        PanelKind::About,
    ];

    pub fn index(self) -> usize {
        match self {
            PanelKind::Comparison => 0,
            PanelKind::RealTime => 1,
            PanelKind::Prediction => 2,
            PanelKind::About => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            PanelKind::Comparison => "Stocks Performance Comparison",
            PanelKind::RealTime => "Real-Time Stock Price",
            PanelKind::Prediction => "Stock Prediction",
            PanelKind::About => "About",
        }
    }

    pub fn next(self) -> PanelKind {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> PanelKind {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Chart style for the comparison panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartStyle {
    #[default]
    Line,
    Area,
    Bar,
}

impl ChartStyle {
    pub fn label(self) -> &'static str {
        match self {
            ChartStyle::Line => "Line Chart",
            ChartStyle::Area => "Area Chart",
            ChartStyle::Bar => "Bar Chart",
        }
    }

    pub fn next(self) -> ChartStyle {
        match self {
            ChartStyle::Line => ChartStyle::Area,
            ChartStyle::Area => ChartStyle::Bar,
            ChartStyle::Bar => ChartStyle::Line,
        }
    }
}

/// Chart style for a single company's prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceChartStyle {
    #[default]
    Candlestick,
    Line,
}

impl PriceChartStyle {
    pub fn label(self) -> &'static str {
        match self {
            PriceChartStyle::Candlestick => "Candle Stick",
            PriceChartStyle::Line => "Line Chart",
        }
    }

    pub fn next(self) -> PriceChartStyle {
        match self {
            PriceChartStyle::Candlestick => PriceChartStyle::Line,
            PriceChartStyle::Line => PriceChartStyle::Candlestick,
        }
    }
}

/// Forecast horizon, 1 to 4 years inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HorizonYears(u8);

impl HorizonYears {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(years: u8) -> Result<Self, PanelError> {
        if (Self::MIN..=Self::MAX).contains(&years) {
            Ok(Self(years))
        } else {
            Err(PanelError::HorizonOutOfRange(years))
        }
    }

    pub fn years(self) -> u8 {
        self.0
    }

    /// Forecast periods in calendar days (365 per year).
    pub fn days(self) -> u32 {
        u32::from(self.0) * 365
    }

    pub fn increment(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX))
    }

    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN))
    }
}

impl Default for HorizonYears {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for HorizonYears {
    type Error = PanelError;

    fn try_from(years: u8) -> Result<Self, Self::Error> {
        Self::new(years)
    }
}

impl From<HorizonYears> for u8 {
    fn from(h: HorizonYears) -> u8 {
        h.0
    }
}

/// One interaction's worth of control values for one panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelRequest {
    Comparison {
        companies: Vec<String>,
        range: DateRange,
        style: ChartStyle,
    },
    RealTime {
        company: Option<String>,
        range: DateRange,
        style: PriceChartStyle,
        /// The search control was activated during this interaction.
        search_clicked: bool,
    },
    Prediction {
        company: Option<String>,
        range: DateRange,
        horizon: HorizonYears,
    },
    About,
}

impl PanelRequest {
    pub fn kind(&self) -> PanelKind {
        match self {
            PanelRequest::Comparison { .. } => PanelKind::Comparison,
            PanelRequest::RealTime { .. } => PanelKind::RealTime,
            PanelRequest::Prediction { .. } => PanelKind::Prediction,
            PanelRequest::About => PanelKind::About,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_cycle_wraps() {
        assert_eq!(PanelKind::About.next(), PanelKind::Comparison);
        assert_eq!(PanelKind::Comparison.prev(), PanelKind::About);
        for kind in PanelKind::ALL {
            assert_eq!(PanelKind::from_index(kind.index()), Some(kind));
        }
        assert_eq!(PanelKind::from_index(4), None);
    }

    #[test]
    fn horizon_bounds() {
        assert!(HorizonYears::new(0).is_err());
        assert!(HorizonYears::new(5).is_err());
        assert_eq!(HorizonYears::new(4).unwrap().days(), 1460);
        assert_eq!(HorizonYears::new(1).unwrap().days(), 365);
        assert_eq!(HorizonYears::new(4).unwrap().increment().years(), 4);
        assert_eq!(HorizonYears::default().decrement().years(), 1);
    }

    #[test]
    fn horizon_deserialization_is_checked() {
        let ok: HorizonYears = serde_json::from_str("3").unwrap();
        assert_eq!(ok.years(), 3);
        assert!(serde_json::from_str::<HorizonYears>("9").is_err());
    }

    #[test]
    fn style_cycles() {
        assert_eq!(ChartStyle::Bar.next(), ChartStyle::Line);
        assert_eq!(PriceChartStyle::default(), PriceChartStyle::Candlestick);
        assert_eq!(PriceChartStyle::Line.next(), PriceChartStyle::Candlestick);
    }
}
