use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::motion::{AnimatableTarget, RowIdentity, WeightedItem};
use crate::Error;

/// Colour for a bar whose subscription carries none
pub const BAR_FALLBACK_COLOR: &str = "#94a3b8";

/// Colour for a category stored without one
pub const CATEGORY_FALLBACK_COLOR: &str = "#6b7280";

fn default_currency_symbol() -> String {
    "$".to_string()
}

/// Reporting period for normalised spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Week, Period::Month, Period::Quarter, Period::Year];

    /// Next period in the footer's fixed rotation, wrapping after year
    pub fn cycle(self) -> Self {
        match self {
            Period::Week => Period::Month,
            Period::Month => Period::Quarter,
            Period::Quarter => Period::Year,
            Period::Year => Period::Week,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        }
    }

    /// Footer caption
    pub fn label(self) -> &'static str {
        match self {
            Period::Week => "WEEKLY",
            Period::Month => "MONTHLY",
            Period::Quarter => "QUARTERLY",
            Period::Year => "YEARLY",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(Period::Week),
            "month" | "monthly" => Ok(Period::Month),
            "quarter" | "quarterly" => Ok(Period::Quarter),
            "year" | "yearly" => Ok(Period::Year),
            other => Err(Error::Other(format!("Unknown period: {}", other))),
        }
    }
}

/// Category scope of a summary request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Id(i64),
}

impl CategoryFilter {
    pub fn id(self) -> Option<i64> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Id(id) => Some(id),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Id(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse::<i64>()
            .map(CategoryFilter::Id)
            .map_err(|_| Error::Other(format!("Invalid category id: {}", s)))
    }
}

/// One subscription's share of the period total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub value: f64,
}

/// Response of `GET /api/stats/summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default)]
    pub currency: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub breakdown: Vec<BreakdownItem>,
}

impl Default for StatsSummary {
    fn default() -> Self {
        Self {
            currency: String::new(),
            currency_symbol: default_currency_symbol(),
            period: Period::default(),
            total: 0.0,
            breakdown: Vec::new(),
        }
    }
}

impl StatsSummary {
    /// Footer amount, e.g. `$12.50`
    pub fn formatted_total(&self) -> String {
        format!("{}{:.2}", self.currency_symbol, self.total)
    }

    pub fn chart_items(&self) -> Vec<ChartItem> {
        self.breakdown.iter().map(ChartItem::from).collect()
    }
}

/// Aggregated spend of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryItem {
    /// `0` for uncategorised spend
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub value: f64,
}

/// Entry of `GET /api/categories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Response of `GET /api/stats/by-category`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    #[serde(default)]
    pub currency: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub items: Vec<CategoryItem>,
}

impl Default for CategoryStats {
    fn default() -> Self {
        Self {
            currency: String::new(),
            currency_symbol: default_currency_symbol(),
            period: Period::default(),
            items: Vec::new(),
        }
    }
}

impl CategoryStats {
    pub fn chart_items(&self) -> Vec<ChartItem> {
        self.items.iter().map(ChartItem::from).collect()
    }
}

/// List-row view of a subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub price: f64,
    /// Price converted to the display currency, when the server did so
    #[serde(default)]
    pub display_price: Option<f64>,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub period_label: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub disabled: bool,
}

impl SubscriptionRow {
    pub fn formatted_price(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_symbol,
            self.display_price.unwrap_or(self.price)
        )
    }

    /// Attributes the swipe engine watches for changes
    pub fn identity(&self) -> RowIdentity {
        RowIdentity {
            id: self.id,
            disabled: self.disabled,
            category_id: self.category_id,
        }
    }
}

/// Active rows first, then disabled ones, each group in server order
pub fn order_active_first(rows: &mut Vec<SubscriptionRow>) {
    let (active, disabled): (Vec<_>, Vec<_>) = rows.drain(..).partition(|row| !row.disabled);
    rows.extend(active);
    rows.extend(disabled);
}

/// Neutral chart input, independent of which endpoint produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ChartItem {
    /// Stable identity across reloads
    pub key: String,
    pub label: String,
    pub value: f64,
    pub color: String,
}

impl From<&BreakdownItem> for ChartItem {
    fn from(item: &BreakdownItem) -> Self {
        Self {
            key: format!("sub-{}", item.id),
            label: item.name.clone(),
            value: item.value,
            color: non_blank(item.color.as_deref(), BAR_FALLBACK_COLOR),
        }
    }
}

impl From<&CategoryItem> for ChartItem {
    fn from(item: &CategoryItem) -> Self {
        Self {
            key: format!("cat-{}", item.category_id),
            label: item.name.clone(),
            value: item.value,
            color: non_blank(item.color.as_deref(), CATEGORY_FALLBACK_COLOR),
        }
    }
}

fn non_blank(color: Option<&str>, fallback: &str) -> String {
    color
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Bar target for the keyed tweener
pub fn chart_target(items: &[ChartItem]) -> AnimatableTarget {
    items
        .iter()
        .map(|item| (item.key.clone(), item.value))
        .collect()
}

/// Donut input for the segment projector
pub fn weighted_items(items: &[ChartItem]) -> Vec<WeightedItem> {
    items
        .iter()
        .map(|item| WeightedItem::new(item.key.clone(), item.color.clone(), item.value))
        .collect()
}
