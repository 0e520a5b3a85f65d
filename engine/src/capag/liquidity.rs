// Indicador 3 - Liquidez
use super::CapagIndicator;
use budget_shared::CapagGrade;

pub struct LiquidityIndicator;

impl CapagIndicator for LiquidityIndicator {
    fn name(&self) -> &str {
        "Liquidez"
    }

    fn formula(&self) -> &str {
        "(Disponibilidade de Caixa Bruta / Restos a Pagar Processados) * 100"
    }

    fn grade(&self, value: f64) -> CapagGrade {
        if value > 100.0 {
            CapagGrade::A
        } else if value >= 50.0 {
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
    fn test_liquidity_bands() {
        let indicator = LiquidityIndicator;
        assert_eq!(indicator.grade(100.01), CapagGrade::A);
        assert_eq!(indicator.grade(100.0), CapagGrade::B);
        assert_eq!(indicator.grade(50.0), CapagGrade::B);
        assert_eq!(indicator.grade(49.9), CapagGrade::C);
    }
}
