use crate::circle::Circle;
use crate::error::{Error, Result};
use crate::geom::Interval;
use crate::options::PackOptions;
use serde::{Deserialize, Serialize};

/// Factors applied by [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Normalization {
    /// `width / max_target`; multiplies every target.
    pub scale: f64,
    /// Multiplies every radius together with the padding.
    pub radius_scale: f64,
    /// Observed `[min, max]` of the targets before scaling.
    pub target_range: Interval,
}

/// Packing order: ascending target, larger radius first among equal targets. Returns indices into
/// `circles`; the slice itself is left untouched.
pub fn visit_order(circles: &[Circle]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..circles.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&circles[a], &circles[b]);
        a.target
            .total_cmp(&b.target)
            .then_with(|| b.radius.total_cmp(&a.radius))
    });
    order
}

/// Median of `values`, averaging the two middle entries for even counts.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

pub(crate) fn check_finite(circles: &[Circle]) -> Result<()> {
    match circles
        .iter()
        .position(|c| !(c.target.is_finite() && c.radius.is_finite()))
    {
        Some(index) => Err(Error::NonFiniteInput { index }),
        None => Ok(()),
    }
}

/// Computes the scale factors without touching the circles.
pub fn measure(circles: &[Circle], order: &[usize], opts: &PackOptions) -> Result<Normalization> {
    opts.validate()?;
    check_finite(circles)?;
    let (Some(&first), Some(&last)) = (order.first(), order.last()) else {
        return Err(Error::DegenerateInput {
            reason: "no circles to pack",
        });
    };
    let target_range = Interval::new(circles[first].target, circles[last].target);
    let max_target = target_range.max;
    if max_target <= 0.0 {
        return Err(Error::DegenerateInput {
            reason: "largest target must be positive",
        });
    }
    let scale = opts.width / max_target;

    let radius_scale = match opts.radius_scale {
        Some(radius_scale) => radius_scale,
        None => {
            let mut radii: Vec<f64> = circles.iter().map(|c| c.radius).collect();
            match median(&mut radii) {
                Some(m) if m > 0.0 => scale / m,
                _ => {
                    return Err(Error::DegenerateInput {
                        reason: "median radius must be positive to derive a radius scale",
                    });
                }
            }
        }
    };

    Ok(Normalization {
        scale,
        radius_scale,
        target_range,
    })
}

/// Rescales targets and radii in place. One-shot: callers must not apply it twice to the same data.
pub fn normalize(
    circles: &mut [Circle],
    order: &[usize],
    opts: &PackOptions,
) -> Result<Normalization> {
    let norm = measure(circles, order, opts)?;
    let radius_factor = opts.padding * norm.radius_scale;
    for circle in circles.iter_mut() {
        circle.target *= norm.scale;
        circle.radius *= radius_factor;
    }
    tracing::debug!(
        scale = norm.scale,
        radius_scale = norm.radius_scale,
        min_target = norm.target_range.min,
        max_target = norm.target_range.max,
        "normalized circles"
    );
    Ok(norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circles(input: &[(f64, f64)]) -> Vec<Circle> {
        input.iter().map(|&(t, r)| Circle::new(t, r)).collect()
    }

    #[test]
    fn visit_order_sorts_by_target_then_descending_radius() {
        let cs = circles(&[(5.0, 1.0), (1.0, 1.0), (5.0, 3.0), (2.0, 0.5)]);
        assert_eq!(visit_order(&cs), vec![1, 3, 2, 0]);
    }

    #[test]
    fn visit_order_tolerates_nan_targets() {
        let mut cs: Vec<Circle> = (0..40).map(|i| Circle::new(i as f64, 1.0)).collect();
        for i in (3..40).step_by(7) {
            cs[i].target = f64::NAN;
        }
        let mut order = visit_order(&cs);
        assert_eq!(order.len(), 40);
        order.sort_unstable();
        assert_eq!(order, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn median_handles_odd_and_even_counts() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn normalize_scales_targets_once() {
        let mut cs = circles(&[(0.0, 1.0), (5.0, 1.0), (10.0, 1.0)]);
        let order = visit_order(&cs);
        let opts = PackOptions {
            padding: 1.0,
            width: 100.0,
            ..Default::default()
        };
        let norm = normalize(&mut cs, &order, &opts).unwrap();
        assert_eq!(norm.scale, 10.0);
        assert_eq!(norm.radius_scale, 10.0);
        assert_eq!(norm.target_range, Interval::new(0.0, 10.0));
        let targets: Vec<f64> = cs.iter().map(|c| c.target).collect();
        assert_eq!(targets, vec![0.0, 50.0, 100.0]);
        assert!(cs.iter().all(|c| c.radius == 10.0));
    }

    #[test]
    fn explicit_radius_scale_skips_the_median() {
        let mut cs = circles(&[(1.0, 0.0), (2.0, 0.0), (4.0, 3.0)]);
        let order = visit_order(&cs);
        let opts = PackOptions {
            padding: 2.0,
            width: 8.0,
            radius_scale: Some(0.5),
            ..Default::default()
        };
        let norm = normalize(&mut cs, &order, &opts).unwrap();
        assert_eq!(norm.radius_scale, 0.5);
        assert_eq!(cs[2].radius, 3.0);
        assert_eq!(cs[2].target, 8.0);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let opts = PackOptions::default();
        assert!(matches!(
            measure(&[], &[], &opts),
            Err(Error::DegenerateInput { .. })
        ));

        let cs = circles(&[(0.0, 1.0), (0.0, 2.0)]);
        assert!(matches!(
            measure(&cs, &visit_order(&cs), &opts),
            Err(Error::DegenerateInput { .. })
        ));

        let cs = circles(&[(1.0, 0.0), (2.0, 0.0), (3.0, 1.0)]);
        assert!(matches!(
            measure(&cs, &visit_order(&cs), &opts),
            Err(Error::DegenerateInput { .. })
        ));
    }

    #[test]
    fn non_finite_input_is_reported_by_index() {
        let cs = circles(&[(1.0, 1.0), (f64::NAN, 1.0)]);
        assert_eq!(
            measure(&cs, &visit_order(&cs), &PackOptions::default()),
            Err(Error::NonFiniteInput { index: 1 })
        );
    }
}
