//! Combined power and energy across lines.

use crate::model::DeviceModel;
use crate::telemetry::{FixedPoint, LineReading};

/// Combined power and energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Totals {
    /// Total active power (W)
    pub power: FixedPoint,
    /// Total accumulated energy (kWh)
    pub energy: FixedPoint,
}

/// Sum power and energy over the lines the latched model has.
///
/// A dual-line model with no line 2 reading yet counts line 2 as zero.
pub fn compute_totals(model: DeviceModel, line1: &LineReading, line2: Option<&LineReading>) -> Totals {
    let mut totals = Totals {
        power: line1.power,
        energy: line1.energy,
    };
    if model == DeviceModel::DualLine {
        if let Some(l2) = line2 {
            totals.power = totals.power + l2.power;
            totals.energy = totals.energy + l2.energy;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(power: f64, energy: f64) -> LineReading {
        LineReading {
            power: FixedPoint::from_f64(power),
            energy: FixedPoint::from_f64(energy),
            ..LineReading::default()
        }
    }

    #[test]
    fn test_single_line_ignores_line2() {
        let totals = compute_totals(DeviceModel::SingleLine, &line(1475.0, 3.402), Some(&line(9.0, 9.0)));
        assert_eq!(totals.power, FixedPoint::from_f64(1475.0));
        assert_eq!(totals.energy, FixedPoint::from_f64(3.402));
    }

    #[test]
    fn test_dual_line_sums() {
        let totals = compute_totals(DeviceModel::DualLine, &line(700.0, 1.0), Some(&line(650.0, 0.8)));
        assert_eq!(totals.power, FixedPoint::from_f64(1350.0));
        assert_eq!(totals.energy, FixedPoint::from_f64(1.8));
    }

    #[test]
    fn test_dual_line_without_line2() {
        let totals = compute_totals(DeviceModel::DualLine, &line(700.0, 1.0), None);
        assert_eq!(totals.power, FixedPoint::from_f64(700.0));
        assert_eq!(totals.energy, FixedPoint::from_f64(1.0));
    }
}
