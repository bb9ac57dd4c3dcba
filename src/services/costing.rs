//! Cálculo de tiempo y costo de órdenes de mantenimiento
//!
//! Funciones puras, sin I/O. El tiempo transcurrido se deriva plegando la
//! línea de tiempo de eventos de izquierda a derecha; nunca se almacena
//! como campo mutable. El costo total distingue explícitamente entre el
//! valor congelado al completar la orden y la estimación en vivo.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::maintenance_order::TimelineEvent;
use crate::utils::rounding::{line_total, round_currency};

/// Minutos transcurridos según la secuencia ordenada de eventos.
///
/// Mantiene un puntero de inicio de sesión y un flag de pausa:
/// - STARTED/RESUMED abre una sesión nueva (volcando la anterior si
///   quedó abierta sin pausar).
/// - PAUSED vuelca el tramo activo y marca la pausa.
/// - COMPLETED/CANCELLED vuelca el tramo activo y cierra la sesión.
///
/// Si al final queda una sesión abierta sin pausar, se suma `now - inicio`:
/// para una orden en curso el valor crece en vivo. Los tramos se truncan
/// a minutos enteros.
pub fn elapsed_minutes(events: &[(TimelineEvent, DateTime<Utc>)], now: DateTime<Utc>) -> i64 {
    let mut total: i64 = 0;
    let mut session_start: Option<DateTime<Utc>> = None;
    let mut paused = false;

    for (event, at) in events {
        match event {
            TimelineEvent::Started | TimelineEvent::Resumed => {
                if let Some(start) = session_start {
                    if !paused {
                        total += (*at - start).num_minutes();
                    }
                }
                session_start = Some(*at);
                paused = false;
            }
            TimelineEvent::Paused => {
                if let Some(start) = session_start {
                    if !paused {
                        total += (*at - start).num_minutes();
                        paused = true;
                    }
                }
            }
            TimelineEvent::Completed | TimelineEvent::Cancelled => {
                if let Some(start) = session_start {
                    if !paused {
                        total += (*at - start).num_minutes();
                    }
                }
                session_start = None;
                paused = false;
            }
        }
    }

    if let Some(start) = session_start {
        if !paused {
            total += (now - start).num_minutes();
        }
    }

    total
}

/// Costo total de una orden: congelado o estimado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputedCost {
    /// Valor fijado al completar la orden; es autoritativo
    Frozen(Decimal),
    /// Estimación en vivo: servicios + cantidad × precio de lista
    Estimated(Decimal),
}

impl ComputedCost {
    pub fn amount(&self) -> Decimal {
        match self {
            ComputedCost::Frozen(v) | ComputedCost::Estimated(v) => *v,
        }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, ComputedCost::Frozen(_))
    }
}

/// Costo total de la orden.
///
/// Si la orden ya tiene un costo almacenado mayor que cero, ese valor
/// quedó congelado al completarla y se devuelve sin recalcular. En caso
/// contrario se estima: suma de servicios más, por cada material,
/// cantidad × precio de lista del producto (los materiales previos a la
/// finalización pueden no estar valorados contra el stock todavía).
pub fn total_cost(
    stored_total: Option<Decimal>,
    service_costs: &[Decimal],
    material_estimates: &[(Decimal, Decimal)],
) -> ComputedCost {
    if let Some(stored) = stored_total {
        if stored > Decimal::ZERO {
            return ComputedCost::Frozen(stored);
        }
    }

    let services: Decimal = service_costs.iter().copied().sum();
    let materials: Decimal = material_estimates
        .iter()
        .map(|(quantity, unit_price)| line_total(*quantity, *unit_price))
        .sum();

    ComputedCost::Estimated(round_currency(services + materials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn test_sin_eventos_es_cero() {
        assert_eq!(elapsed_minutes(&[], at(120)), 0);
    }

    #[test]
    fn test_sesion_abierta_crece_en_vivo() {
        let events = vec![(TimelineEvent::Started, at(0))];
        assert_eq!(elapsed_minutes(&events, at(30)), 30);
        assert_eq!(elapsed_minutes(&events, at(45)), 45);
    }

    #[test]
    fn test_pausa_excluye_el_intervalo_pausado() {
        // start -> pause -> resume -> complete con 10 minutos entre eventos
        let events = vec![
            (TimelineEvent::Started, at(0)),
            (TimelineEvent::Paused, at(10)),
            (TimelineEvent::Resumed, at(20)),
            (TimelineEvent::Completed, at(30)),
        ];
        assert_eq!(elapsed_minutes(&events, at(120)), 20);
    }

    #[test]
    fn test_pausada_al_final_no_crece() {
        let events = vec![
            (TimelineEvent::Started, at(0)),
            (TimelineEvent::Paused, at(10)),
        ];
        assert_eq!(elapsed_minutes(&events, at(60)), 10);
        assert_eq!(elapsed_minutes(&events, at(600)), 10);
    }

    #[test]
    fn test_doble_start_vuelca_el_tramo_anterior() {
        // No debería ocurrir, pero el tramo abierto no se pierde
        let events = vec![
            (TimelineEvent::Started, at(0)),
            (TimelineEvent::Started, at(15)),
            (TimelineEvent::Completed, at(20)),
        ];
        assert_eq!(elapsed_minutes(&events, at(120)), 20);
    }

    #[test]
    fn test_trunca_a_minutos_enteros() {
        let events = vec![
            (TimelineEvent::Started, at(0)),
            (TimelineEvent::Completed, at(0) + Duration::seconds(90)),
        ];
        assert_eq!(elapsed_minutes(&events, at(120)), 1);
    }

    #[test]
    fn test_monotono_al_agregar_eventos() {
        // Evaluado en el instante de cada evento: el total nunca retrocede
        let mut events = vec![(TimelineEvent::Started, at(0))];
        let mut previous = elapsed_minutes(&events, at(0));
        for (event, minute) in [
            (TimelineEvent::Paused, 10),
            (TimelineEvent::Resumed, 20),
            (TimelineEvent::Paused, 35),
            (TimelineEvent::Resumed, 50),
            (TimelineEvent::Completed, 80),
        ] {
            events.push((event, at(minute)));
            let current = elapsed_minutes(&events, at(minute));
            assert!(current >= previous, "el total retrocedió: {} < {}", current, previous);
            previous = current;
        }
        assert_eq!(previous, 55);
    }

    #[test]
    fn test_costo_congelado_gana() {
        let frozen = total_cost(
            Some(Decimal::new(15000, 2)),
            &[Decimal::new(99900, 2)],
            &[(Decimal::new(10, 0), Decimal::new(500, 2))],
        );
        assert!(frozen.is_frozen());
        assert_eq!(frozen.amount(), Decimal::new(15000, 2));
    }

    #[test]
    fn test_costo_almacenado_cero_no_congela() {
        let cost = total_cost(Some(Decimal::ZERO), &[Decimal::new(2500, 2)], &[]);
        assert!(!cost.is_frozen());
        assert_eq!(cost.amount(), Decimal::new(2500, 2));
    }

    #[test]
    fn test_estimacion_servicios_mas_materiales() {
        // 2 servicios (30.00 + 20.00) + 5 x 10.00 = 100.00
        let cost = total_cost(
            None,
            &[Decimal::new(3000, 2), Decimal::new(2000, 2)],
            &[(Decimal::new(5, 0), Decimal::new(1000, 2))],
        );
        assert!(!cost.is_frozen());
        assert_eq!(cost.amount(), Decimal::new(10000, 2));
    }

    #[test]
    fn test_orden_sin_costos_estima_cero() {
        let cost = total_cost(None, &[], &[]);
        assert_eq!(cost.amount(), Decimal::ZERO);
        assert!(!cost.is_frozen());
    }
}
