use crate::{
    aggregate::{ReductionKind, Reduced, Rule},
    observation::Observation,
};

/// Resultants shorter than this are treated as cancelled out.
const DEGENERATE_EPS: f64 = 1e-9;

/// Running state for one field of one region, finalized once.
#[derive(Debug, Clone, Copy)]
pub(super) enum Accumulator {
    Mean { sum: f64, count: usize },
    Circular { east: f64, north: f64, count: usize },
    Vector { east: f64, north: f64, count: usize },
}

impl Accumulator {
    pub(super) fn new(kind: &ReductionKind) -> Self {
        match kind {
            ReductionKind::MeanSkipMissing | ReductionKind::MagnitudeMean => Self::Mean { sum: 0.0, count: 0 },
            ReductionKind::CircularMean => Self::Circular { east: 0.0, north: 0.0, count: 0 },
            ReductionKind::VectorMean { .. } => Self::Vector { east: 0.0, north: 0.0, count: 0 },
        }
    }

    /// Fold one observation's contribution for `rule` into the running state.
    pub(super) fn push(&mut self, rule: &Rule, observation: &Observation) {
        match (self, rule.kind()) {
            (Self::Mean { sum, count }, ReductionKind::MeanSkipMissing) => {
                if let Some(value) = observation.field(rule.field()) {
                    *sum += value;
                    *count += 1;
                }
            }
            (Self::Mean { sum, count }, ReductionKind::MagnitudeMean) => {
                if let Some(value) = observation.field(rule.field()).filter(|v| *v >= 0.0) {
                    *sum += value;
                    *count += 1;
                }
            }
            (Self::Circular { east, north, count }, ReductionKind::CircularMean) => {
                if let Some(degrees) = observation.field(rule.field()) {
                    let (sin, cos) = degrees.rem_euclid(360.0).to_radians().sin_cos();
                    *east += sin;
                    *north += cos;
                    *count += 1;
                }
            }
            (Self::Vector { east, north, count }, ReductionKind::VectorMean { direction, speed }) => {
                let pair = observation.field(direction)
                    .zip(observation.field(speed).filter(|v| *v >= 0.0));
                if let Some((degrees, magnitude)) = pair {
                    let (sin, cos) = degrees.rem_euclid(360.0).to_radians().sin_cos();
                    *east += magnitude * sin;
                    *north += magnitude * cos;
                    *count += 1;
                }
            }
            _ => unreachable!("accumulator built for a different reduction kind"),
        }
    }

    /// Produce the reduced value and the number of contributing observations.
    pub(super) fn finish(self) -> (Reduced, usize) {
        match self {
            Self::Mean { count: 0, .. }
            | Self::Circular { count: 0, .. }
            | Self::Vector { count: 0, .. } => (Reduced::NoData, 0),

            Self::Mean { sum, count } => (Reduced::Scalar { value: sum / count as f64 }, count),

            Self::Circular { east, north, count } => {
                let (east, north) = (east / count as f64, north / count as f64);
                match bearing(east, north) {
                    Some(degrees) => (Reduced::Angle { degrees }, count),
                    None => (Reduced::NoData, count),
                }
            }

            Self::Vector { east, north, count } => {
                let (u, v) = (east / count as f64, north / count as f64);
                let speed = u.hypot(v);
                (Reduced::Vector { u, v, speed, direction: bearing(u, v) }, count)
            }
        }
    }
}

/// Bearing in [0, 360) of the vector (east, north), clockwise from north.
/// `None` when the vector is too short to have a direction.
fn bearing(east: f64, north: f64) -> Option<f64> {
    if east.hypot(north) < DEGENERATE_EPS { return None }
    let degrees = east.atan2(north).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0
    Some(if degrees >= 360.0 { 0.0 } else { degrees })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce(rule: &Rule, observations: &[Observation]) -> (Reduced, usize) {
        let mut acc = Accumulator::new(rule.kind());
        for observation in observations { acc.push(rule, observation) }
        acc.finish()
    }

    fn obs(field: &str, value: Option<f64>) -> Observation {
        Observation::new("s", Some(0.0), Some(0.0)).with_field(field, value)
    }

    fn angular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn mean_skips_absent_values() {
        let rule = Rule::mean("TEMP");
        let observations = [obs("TEMP", Some(10.0)), obs("TEMP", None), obs("TEMP", Some(20.0))];
        assert_eq!(reduce(&rule, &observations), (Reduced::Scalar { value: 15.0 }, 2));
    }

    #[test]
    fn all_absent_is_no_data_not_zero() {
        let rule = Rule::mean("TEMP");
        assert_eq!(reduce(&rule, &[obs("TEMP", None), obs("HUMD", Some(0.5))]), (Reduced::NoData, 0));
        assert_eq!(reduce(&rule, &[]), (Reduced::NoData, 0));
    }

    #[test]
    fn mean_keeps_genuine_zero() {
        let rule = Rule::mean("H_24R");
        assert_eq!(reduce(&rule, &[obs("H_24R", Some(0.0))]), (Reduced::Scalar { value: 0.0 }, 1));
    }

    #[test]
    fn magnitude_mean_skips_negative_readings() {
        let rule = Rule::magnitude("WDSD");
        let observations = [obs("WDSD", Some(2.0)), obs("WDSD", Some(-99.0)), obs("WDSD", Some(4.0))];
        assert_eq!(reduce(&rule, &observations), (Reduced::Scalar { value: 3.0 }, 2));
    }

    #[test]
    fn circular_mean_wraps_through_north() {
        let rule = Rule::circular("WDIR");
        let (value, count) = reduce(&rule, &[obs("WDIR", Some(350.0)), obs("WDIR", Some(10.0))]);
        assert_eq!(count, 2);
        match value {
            Reduced::Angle { degrees } => {
                assert!((0.0..360.0).contains(&degrees));
                assert!(angular_distance(degrees, 0.0) < 1e-9, "got {degrees}");
            }
            other => panic!("expected an angle, got {other:?}"),
        }
    }

    #[test]
    fn circular_mean_of_opposites_is_no_data() {
        let rule = Rule::circular("WDIR");
        assert_eq!(reduce(&rule, &[obs("WDIR", Some(0.0)), obs("WDIR", Some(180.0))]), (Reduced::NoData, 2));
    }

    #[test]
    fn circular_mean_of_quadrant() {
        let rule = Rule::circular("WDIR");
        let (value, _) = reduce(&rule, &[obs("WDIR", Some(80.0)), obs("WDIR", Some(100.0)), obs("WDIR", Some(450.0))]);
        let Reduced::Angle { degrees } = value else { panic!("expected an angle") };
        assert!(angular_distance(degrees, 90.0) < 1e-9, "got {degrees}");
    }

    #[test]
    fn vector_mean_weights_by_speed() {
        let rule = Rule::vector("WIND", "WDIR", "WDSD");
        let observations = [
            Observation::new("a", Some(0.0), Some(0.0)).with_field("WDIR", Some(90.0)).with_field("WDSD", Some(3.0)),
            Observation::new("b", Some(0.0), Some(0.0)).with_field("WDIR", Some(270.0)).with_field("WDSD", Some(1.0)),
            Observation::new("c", Some(0.0), Some(0.0)).with_field("WDIR", Some(0.0)),
        ];
        let (value, count) = reduce(&rule, &observations);
        assert_eq!(count, 2);
        let Reduced::Vector { u, v, speed, direction } = value else { panic!("expected a vector") };
        assert!((u - 1.0).abs() < 1e-12);
        assert!(v.abs() < 1e-12);
        assert!((speed - 1.0).abs() < 1e-12);
        assert!(angular_distance(direction.unwrap(), 90.0) < 1e-9);
    }

    #[test]
    fn calm_vector_has_no_direction() {
        let rule = Rule::vector("WIND", "WDIR", "WDSD");
        let calm = Observation::new("a", Some(0.0), Some(0.0)).with_field("WDIR", Some(0.0)).with_field("WDSD", Some(0.0));
        let (value, count) = reduce(&rule, &[calm]);
        assert_eq!(count, 1);
        assert_eq!(value, Reduced::Vector { u: 0.0, v: 0.0, speed: 0.0, direction: None });
    }
}
