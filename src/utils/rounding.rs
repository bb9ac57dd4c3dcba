//! Redondeo de valores monetarios y cantidades
//!
//! Los importes se almacenan con 2 decimales y las cantidades con 3.
//! Ambos factores se redondean ANTES de multiplicar para evitar
//! deriva de punto flotante en multiplicaciones repetidas.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimales para importes monetarios
pub const CURRENCY_DP: u32 = 2;

/// Decimales para cantidades de stock
pub const QUANTITY_DP: u32 = 3;

/// Redondear un importe monetario a 2 decimales (mitad hacia arriba)
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Redondear una cantidad a 3 decimales (mitad hacia arriba)
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Total de una línea: cantidad × costo unitario, con ambos factores
/// ya redondeados a su precisión fija
pub fn line_total(quantity: Decimal, unit_cost: Decimal) -> Decimal {
    round_currency(round_quantity(quantity) * round_currency(unit_cost))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(Decimal::new(10005, 3)), Decimal::new(1001, 2));
        assert_eq!(round_currency(Decimal::new(50, 0)), Decimal::new(50, 0));
    }

    #[test]
    fn test_line_total_simple() {
        // 5 x 10.00 = 50.00
        let total = line_total(Decimal::new(5, 0), Decimal::new(1000, 2));
        assert_eq!(total, Decimal::new(5000, 2));
    }

    #[test]
    fn test_line_total_rounds_factors_first() {
        // 2.0005 se redondea a 2.001 antes de multiplicar
        let total = line_total(Decimal::new(20005, 4), Decimal::new(333333, 4));
        let expected = round_currency(Decimal::new(2001, 3) * Decimal::new(3333, 2));
        assert_eq!(total, expected);
    }
}
