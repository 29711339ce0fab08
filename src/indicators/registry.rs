use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use crate::error::{DashboardError, DashboardResult};

// ============================================================================
// ENUMS
// ============================================================================

/// Sampling frequency of an indicator. Governs YoY lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Periods in one year, or `None` for daily data which uses a calendar
    /// lookback instead of a period count.
    pub fn periods_per_year(&self) -> Option<usize> {
        match self {
            Frequency::Daily => None,
            Frequency::Weekly => Some(52),
            Frequency::Monthly => Some(12),
            Frequency::Quarterly => Some(4),
        }
    }
}

/// Transformation applied to raw values before display.
///
/// Serialized as `NONE`, `YOY_PERCENT`, `MOM_PERCENT`, `QOQ_PERCENT`,
/// `MOM_CHANGE`. Anything else loads as [`Calculation::Unrecognized`] so a
/// typo in a catalog file is reported instead of rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Calculation {
    None,
    YoyPercent,
    MomPercent,
    QoqPercent,
    MomChange,
    Unrecognized(String),
}

impl Calculation {
    pub fn as_str(&self) -> &str {
        match self {
            Calculation::None => "NONE",
            Calculation::YoyPercent => "YOY_PERCENT",
            Calculation::MomPercent => "MOM_PERCENT",
            Calculation::QoqPercent => "QOQ_PERCENT",
            Calculation::MomChange => "MOM_CHANGE",
            Calculation::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Calculation {
    fn from(raw: String) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "NONE" | "" => Calculation::None,
            "YOY_PERCENT" => Calculation::YoyPercent,
            "MOM_PERCENT" => Calculation::MomPercent,
            "QOQ_PERCENT" => Calculation::QoqPercent,
            "MOM_CHANGE" => Calculation::MomChange,
            _ => Calculation::Unrecognized(raw),
        }
    }
}

impl From<Calculation> for String {
    fn from(calc: Calculation) -> Self {
        calc.as_str().to_string()
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation hint only; nothing here depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartShape {
    Line,
    Bar,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Growth,
    Inflation,
    Labor,
    Rates,
    Liquidity,
    Housing,
    Markets,
}

// ============================================================================
// METADATA STRUCT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorDescriptor {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub frequency: Frequency,
    pub calculation: Calculation,
    pub preferred_chart_shape: ChartShape,
    pub category: Category,
    /// Provider that publishes the series, e.g. "FRED".
    pub source: String,
    /// Upstream series id when it differs from `id`.
    #[serde(default)]
    pub source_symbol: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl IndicatorDescriptor {
    /// Identifier to request from the upstream provider.
    pub fn upstream_symbol(&self) -> &str {
        self.source_symbol.as_deref().unwrap_or(&self.id)
    }
}

// Helper macro to reduce boilerplate
macro_rules! ind {
    ($id:expr, $name:expr, $unit:expr, $freq:expr, $calc:expr, $shape:expr, $cat:expr, $sym:expr, $desc:expr) => {
        IndicatorDescriptor {
            id: $id.to_string(),
            name: $name.to_string(),
            unit: $unit.to_string(),
            frequency: $freq,
            calculation: $calc,
            preferred_chart_shape: $shape,
            category: $cat,
            source: "FRED".to_string(),
            source_symbol: $sym.map(|s: &str| s.to_string()),
            description: Some($desc.to_string()),
        }
    };
    // Series id doubles as the upstream symbol
    ($id:expr, $name:expr, $unit:expr, $freq:expr, $calc:expr, $shape:expr, $cat:expr, $desc:expr) => {
        ind!($id, $name, $unit, $freq, $calc, $shape, $cat, None, $desc)
    };
}

// ============================================================================
// BUILT-IN CATALOG (Lazy initialization)
// ============================================================================

static BUILTIN_INDICATORS: Lazy<Vec<IndicatorDescriptor>> = Lazy::new(|| {
    use Calculation as C;
    use Category as Cat;
    use ChartShape as Shape;
    use Frequency as F;

    vec![
        // =====================================================================
        // GROWTH
        // =====================================================================
        ind!("GDP", "Gross Domestic Product (YoY)", "%", F::Quarterly, C::YoyPercent, Shape::Bar, Cat::Growth,
             "Nominal US output, year-over-year growth"),
        ind!("GDPC1", "Real GDP (QoQ)", "%", F::Quarterly, C::QoqPercent, Shape::Bar, Cat::Growth,
             "Inflation-adjusted output, quarter-over-quarter growth"),
        ind!("INDPRO", "Industrial Production (YoY)", "%", F::Monthly, C::YoyPercent, Shape::Line, Cat::Growth,
             "Manufacturing, mining and utilities output"),
        ind!("RSXFS", "Retail Sales (MoM)", "%", F::Monthly, C::MomPercent, Shape::Bar, Cat::Growth,
             "Retail sales excluding food services"),
        ind!("UMCSENT", "Consumer Sentiment", "Index", F::Monthly, C::None, Shape::Line, Cat::Growth,
             "University of Michigan consumer sentiment survey"),

        // =====================================================================
        // INFLATION
        // =====================================================================
        ind!("CPIAUCSL", "Consumer Price Index (YoY)", "%", F::Monthly, C::YoyPercent, Shape::Line, Cat::Inflation,
             "Headline inflation"),
        ind!("CPILFESL", "Core CPI (YoY)", "%", F::Monthly, C::YoyPercent, Shape::Line, Cat::Inflation,
             "Inflation excluding food and energy"),
        ind!("PCEPI", "PCE Price Index (YoY)", "%", F::Monthly, C::YoyPercent, Shape::Line, Cat::Inflation,
             "The Fed's preferred inflation gauge"),
        ind!("PPIACO", "Producer Price Index (MoM)", "%", F::Monthly, C::MomPercent, Shape::Bar, Cat::Inflation,
             "Wholesale prices, month-over-month"),

        // =====================================================================
        // LABOR
        // =====================================================================
        ind!("UNRATE", "Unemployment Rate", "%", F::Monthly, C::None, Shape::Line, Cat::Labor,
             "Civilian unemployment rate"),
        ind!("PAYEMS", "Nonfarm Payrolls (Change)", "Thousands of Persons", F::Monthly, C::MomChange, Shape::Bar, Cat::Labor,
             "Monthly change in total nonfarm employment"),
        ind!("ICSA", "Initial Jobless Claims", "Number", F::Weekly, C::None, Shape::Line, Cat::Labor,
             "Weekly initial unemployment insurance claims"),

        // =====================================================================
        // RATES
        // =====================================================================
        ind!("FEDFUNDS", "Federal Funds Rate", "%", F::Monthly, C::None, Shape::Line, Cat::Rates,
             "Effective federal funds rate"),
        ind!("DGS10", "10-Year Treasury Yield", "%", F::Daily, C::None, Shape::Line, Cat::Rates,
             "Market yield on 10-year Treasuries"),
        ind!("T10Y2Y", "10Y-2Y Treasury Spread", "%", F::Daily, C::None, Shape::Area, Cat::Rates,
             "Negative values signal an inverted curve"),
        ind!("MORTGAGE30US", "30-Year Mortgage Rate", "%", F::Weekly, C::None, Shape::Line, Cat::Housing,
             "Average 30-year fixed mortgage rate"),

        // =====================================================================
        // LIQUIDITY
        // =====================================================================
        ind!("M2SL", "M2 Money Supply (YoY)", "%", F::Monthly, C::YoyPercent, Shape::Area, Cat::Liquidity,
             "Broad money growth"),
        ind!("WALCL", "Fed Balance Sheet (YoY)", "%", F::Weekly, C::YoyPercent, Shape::Area, Cat::Liquidity,
             "Total Federal Reserve assets, year-over-year"),

        // =====================================================================
        // HOUSING
        // =====================================================================
        ind!("HOUST", "Housing Starts", "Thousands of Units", F::Monthly, C::None, Shape::Bar, Cat::Housing,
             "New privately-owned housing units started"),
        ind!("CSUSHPINSA", "Case-Shiller Home Prices (YoY)", "%", F::Monthly, C::YoyPercent, Shape::Line, Cat::Housing,
             "US national home price index"),

        // =====================================================================
        // MARKETS
        // =====================================================================
        ind!("SP500", "S&P 500", "Index", F::Daily, C::None, Shape::Area, Cat::Markets,
             "US large-cap equity benchmark"),
        ind!("VIXCLS", "VIX Volatility Index", "Index", F::Daily, C::None, Shape::Line, Cat::Markets,
             "Implied volatility of S&P 500 options"),
        ind!("OIL_YOY", "WTI Crude Oil (YoY)", "%", F::Daily, C::YoyPercent, Shape::Line, Cat::Markets,
             Some("DCOILWTICO"), "West Texas Intermediate spot price, year-over-year"),
    ]
});

// ============================================================================
// CATALOG
// ============================================================================

/// A problem found by [`Catalog::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    DuplicateId(String),
    UnrecognizedCalculation { id: String, calculation: String },
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::DuplicateId(id) => write!(f, "duplicate indicator id '{}'", id),
            CatalogIssue::UnrecognizedCalculation { id, calculation } => {
                write!(f, "indicator '{}' uses unrecognized calculation '{}'", id, calculation)
            }
        }
    }
}

/// Immutable table of indicator descriptors, built once at startup and shared
/// by reference.
#[derive(Debug, Clone)]
pub struct Catalog {
    indicators: Vec<IndicatorDescriptor>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog. On duplicate ids the first entry wins for lookups;
    /// [`Catalog::validate`] reports the duplicate.
    pub fn new(indicators: Vec<IndicatorDescriptor>) -> Self {
        let mut index = HashMap::with_capacity(indicators.len());
        for (i, ind) in indicators.iter().enumerate() {
            index.entry(ind.id.clone()).or_insert(i);
        }
        Self { indicators, index }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_INDICATORS.clone())
    }

    /// Parses a JSON array of descriptors.
    pub fn from_json(json: &str) -> DashboardResult<Self> {
        let indicators: Vec<IndicatorDescriptor> = serde_json::from_str(json)?;
        Ok(Self::new(indicators))
    }

    pub fn from_path(path: &Path) -> DashboardResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn get(&self, id: &str) -> Option<&IndicatorDescriptor> {
        self.index.get(id).map(|&i| &self.indicators[i])
    }

    pub fn all(&self) -> &[IndicatorDescriptor] {
        &self.indicators
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Configuration-time check for problems that would otherwise only show up
    /// as runtime warnings.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for ind in &self.indicators {
            if !seen.insert(ind.id.as_str()) {
                issues.push(CatalogIssue::DuplicateId(ind.id.clone()));
            }
            if let Calculation::Unrecognized(raw) = &ind.calculation {
                issues.push(CatalogIssue::UnrecognizedCalculation {
                    id: ind.id.clone(),
                    calculation: raw.clone(),
                });
            }
        }

        issues
    }

    /// Fails when [`Catalog::validate`] finds anything.
    pub fn ensure_valid(&self) -> DashboardResult<()> {
        let issues = self.validate();
        if issues.is_empty() {
            return Ok(());
        }
        let joined: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
        Err(DashboardError::Config(joined.join("; ")))
    }

    /// Get count statistics
    pub fn stats(&self) -> CatalogStats {
        let by_calc = |c: Calculation| self.indicators.iter().filter(|i| i.calculation == c).count();
        let by_freq = |f: Frequency| self.indicators.iter().filter(|i| i.frequency == f).count();

        CatalogStats {
            total: self.indicators.len(),
            raw: by_calc(Calculation::None),
            transformed: self.indicators.len() - by_calc(Calculation::None),
            daily: by_freq(Frequency::Daily),
            weekly: by_freq(Frequency::Weekly),
            monthly: by_freq(Frequency::Monthly),
            quarterly: by_freq(Frequency::Quarterly),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub raw: usize,
    pub transformed: usize,
    pub daily: usize,
    pub weekly: usize,
    pub monthly: usize,
    pub quarterly: usize,
}
