// CAPAG (payment capacity) indicators and rating
pub mod current_savings;
pub mod debt;
pub mod liquidity;

pub use current_savings::CurrentSavingsIndicator;
pub use debt::DebtIndicator;
pub use liquidity::LiquidityIndicator;

use budget_shared::{CapagGrade, CapagRecord};
use serde::Serialize;

// Common trait for the three rating indicators
pub trait CapagIndicator {
    fn name(&self) -> &str;
    fn formula(&self) -> &str;
    /// Band of an indicator value, in percent.
    fn grade(&self, value: f64) -> CapagGrade;
}

/// All A gives A, any C gives C, anything else is B.
pub fn consolidated_grade(grades: &[CapagGrade]) -> Option<CapagGrade> {
    if grades.is_empty() {
        None
    } else if grades.iter().all(|g| *g == CapagGrade::A) {
        Some(CapagGrade::A)
    } else if grades.contains(&CapagGrade::C) {
        Some(CapagGrade::C)
    } else {
        Some(CapagGrade::B)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndicatorGrade {
    pub name: String,
    pub formula: String,
    pub value: f64,
    pub grade: CapagGrade,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CapagAssessment {
    pub indicators: Vec<IndicatorGrade>,
    pub overall: CapagGrade,
}

/// Grades the three indicator values; `None` unless all three are present.
pub fn assess(debt: Option<f64>, savings: Option<f64>, liquidity: Option<f64>) -> Option<CapagAssessment> {
    let calculators: [(&dyn CapagIndicator, Option<f64>); 3] = [
        (&DebtIndicator, debt),
        (&CurrentSavingsIndicator, savings),
        (&LiquidityIndicator, liquidity),
    ];

    let indicators = calculators
        .iter()
        .map(|(indicator, value)| {
            value.filter(|v| v.is_finite()).map(|v| IndicatorGrade {
                name: indicator.name().to_string(),
                formula: indicator.formula().to_string(),
                value: v,
                grade: indicator.grade(v),
            })
        })
        .collect::<Option<Vec<_>>>()?;

    let grades: Vec<CapagGrade> = indicators.iter().map(|i| i.grade).collect();
    let overall = consolidated_grade(&grades)?;
    Some(CapagAssessment { indicators, overall })
}

pub fn assess_record(record: &CapagRecord) -> Option<CapagAssessment> {
    assess(record.debt_indicator, record.savings_indicator, record.liquidity_indicator)
}
