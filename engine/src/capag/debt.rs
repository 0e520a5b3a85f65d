// Indicador 1 - Endividamento
use super::CapagIndicator;
use budget_shared::CapagGrade;

pub struct DebtIndicator;

impl CapagIndicator for DebtIndicator {
    fn name(&self) -> &str {
        "Endividamento"
    }

    fn formula(&self) -> &str {
        "(Dívida Consolidada Líquida / Receita Corrente Líquida) * 100"
    }

    // Lower is better: up to 60% of RCL is A, up to 120% is B.
    fn grade(&self, value: f64) -> CapagGrade {
        if value <= 60.0 {
            CapagGrade::A
        } else if value <= 120.0 {
            CapagGrade::B
        } else {
            CapagGrade::C
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debt_bands() {
        assert_eq!(DebtIndicator.grade(0.0), CapagGrade::A);
        assert_eq!(DebtIndicator.grade(60.0), CapagGrade::A);
        assert_eq!(DebtIndicator.grade(60.01), CapagGrade::B);
        assert_eq!(DebtIndicator.grade(120.0), CapagGrade::B);
        assert_eq!(DebtIndicator.grade(120.5), CapagGrade::C);
    }
}
