// Indicador 2 - Poupança Corrente
use super::CapagIndicator;
use budget_shared::CapagGrade;

pub struct CurrentSavingsIndicator;

impl CapagIndicator for CurrentSavingsIndicator {
    fn name(&self) -> &str {
        "Poupança Corrente"
    }

    fn formula(&self) -> &str {
        "(Receita Corrente Líquida - Despesa Corrente) / Receita Corrente Líquida * 100"
    }

    fn grade(&self, value: f64) -> CapagGrade {
        if value >= 5.0 {
            CapagGrade::A
        } else if value >= 0.0 {
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
    fn test_savings_bands() {
        let indicator = CurrentSavingsIndicator;
        assert_eq!(indicator.grade(5.0), CapagGrade::A);
        assert_eq!(indicator.grade(12.0), CapagGrade::A);
        assert_eq!(indicator.grade(4.99), CapagGrade::B);
        assert_eq!(indicator.grade(0.0), CapagGrade::B);
        assert_eq!(indicator.grade(-0.1), CapagGrade::C);
    }
}
