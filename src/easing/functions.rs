/// Trait for easing functions applied to tween progress
pub trait EasingFunction {
    /// Get the name of this easing function
    fn name(&self) -> &str;

    /// Map normalized progress `t` in [0, 1] to an eased factor.
    /// Spring curves may overshoot 1.0 before settling.
    fn ease(&self, t: f64) -> f64;
}

impl std::fmt::Debug for dyn EasingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EasingFunction")
            .field("name", &self.name())
            .finish()
    }
}

/// Identity easing
#[derive(Debug, Clone)]
pub struct LinearEase;

impl EasingFunction for LinearEase {
    fn name(&self) -> &str {
        "linear"
    }

    fn ease(&self, t: f64) -> f64 {
        t
    }
}

/// Quadratic acceleration
#[derive(Debug, Clone)]
pub struct EaseIn;

impl EasingFunction for EaseIn {
    fn name(&self) -> &str {
        "ease_in"
    }

    fn ease(&self, t: f64) -> f64 {
        t * t
    }
}

/// Quadratic deceleration
#[derive(Debug, Clone)]
pub struct EaseOut;

impl EasingFunction for EaseOut {
    fn name(&self) -> &str {
        "ease_out"
    }

    fn ease(&self, t: f64) -> f64 {
        1.0 - (1.0 - t) * (1.0 - t)
    }
}

/// Quadratic acceleration then deceleration
#[derive(Debug, Clone)]
pub struct EaseInOut;

impl EasingFunction for EaseInOut {
    fn name(&self) -> &str {
        "ease_in_out"
    }

    fn ease(&self, t: f64) -> f64 {
        if t < 0.5 {
            2.0 * t * t
        } else {
            1.0 - 2.0 * (1.0 - t) * (1.0 - t)
        }
    }
}

/// Smoothstep curve
#[derive(Debug, Clone)]
pub struct CubicEase;

impl EasingFunction for CubicEase {
    fn name(&self) -> &str {
        "cubic"
    }

    fn ease(&self, t: f64) -> f64 {
        t * t * (3.0 - 2.0 * t)
    }
}

/// Snap from 0 to 1 at a threshold point
#[derive(Debug, Clone)]
pub struct StepEase {
    point: f64,
}

impl StepEase {
    pub fn new() -> Self {
        Self { point: 1.0 }
    }

    pub fn with_point(point: f64) -> Self {
        Self {
            point: point.clamp(0.0, 1.0),
        }
    }
}

impl Default for StepEase {
    fn default() -> Self {
        Self::new()
    }
}

impl EasingFunction for StepEase {
    fn name(&self) -> &str {
        "step"
    }

    fn ease(&self, t: f64) -> f64 {
        if t >= self.point {
            1.0
        } else {
            0.0
        }
    }
}

/// Cubic Bézier curve
#[derive(Debug, Clone)]
pub struct BezierEase {
    control_points: [f64; 4], // x1, y1, x2, y2
}

impl BezierEase {
    pub fn new() -> Self {
        Self {
            control_points: [0.25, 0.1, 0.25, 1.0], // CSS "ease"
        }
    }

    pub fn with_control_points(p1: (f64, f64), p2: (f64, f64)) -> Self {
        Self {
            control_points: [p1.0, p1.1, p2.0, p2.1],
        }
    }
}

impl Default for BezierEase {
    fn default() -> Self {
        Self::new()
    }
}

impl EasingFunction for BezierEase {
    fn name(&self) -> &str {
        "bezier"
    }

    fn ease(&self, t: f64) -> f64 {
        cubic_bezier(t.clamp(0.0, 1.0), &self.control_points)
    }
}

pub(crate) fn cubic_bezier(t: f64, control_points: &[f64; 4]) -> f64 {
    let [x1, y1, x2, y2] = *control_points;

    // Binary search for the parameter whose x lands on t
    let mut lower = 0.0;
    let mut upper = 1.0;
    let mut current_t = t;

    for _ in 0..10 {
        let current_x = cubic_bezier_value(current_t, 0.0, x1, x2, 1.0);

        if (current_x - t).abs() < 0.001 {
            break;
        }

        if current_x < t {
            lower = current_t;
        } else {
            upper = current_t;
        }

        current_t = (lower + upper) / 2.0;
    }

    cubic_bezier_value(current_t, 0.0, y1, y2, 1.0)
}

fn cubic_bezier_value(t: f64, p0: f64, p1: f64, p2: f64, p3: f64) -> f64 {
    let one_minus_t = 1.0 - t;
    let one_minus_t_squared = one_minus_t * one_minus_t;
    let one_minus_t_cubed = one_minus_t_squared * one_minus_t;
    let t_squared = t * t;
    let t_cubed = t_squared * t;

    one_minus_t_cubed * p0
        + 3.0 * one_minus_t_squared * t * p1
        + 3.0 * one_minus_t * t_squared * p2
        + t_cubed * p3
}

/// Damped spring oscillation
#[derive(Debug, Clone)]
pub struct SpringEase {
    damping: f64,
    stiffness: f64,
}

impl SpringEase {
    pub fn new() -> Self {
        Self {
            damping: 20.0,
            stiffness: 100.0,
        }
    }

    pub fn with_params(damping: f64, stiffness: f64) -> Self {
        Self { damping, stiffness }
    }
}

impl Default for SpringEase {
    fn default() -> Self {
        Self::new()
    }
}

impl EasingFunction for SpringEase {
    fn name(&self) -> &str {
        "spring"
    }

    fn ease(&self, t: f64) -> f64 {
        spring_ease(t.clamp(0.0, 1.0), self.damping, self.stiffness)
    }
}

fn spring_ease(t: f64, damping: f64, stiffness: f64) -> f64 {
    if t == 0.0 || t == 1.0 {
        return t;
    }

    let m = 1.0; // mass
    let c = damping;
    let k = stiffness;

    let w0 = (k / m).sqrt();
    let zeta = c / (2.0 * (k * m).sqrt());

    if zeta < 1.0 {
        // Underdamped
        let wd = w0 * (1.0 - zeta * zeta).sqrt();
        1.0 - ((-zeta * w0 * t).exp() * (wd * t).cos())
    } else if zeta == 1.0 {
        // Critically damped
        1.0 - ((-w0 * t).exp() * (1.0 + w0 * t))
    } else {
        // Overdamped
        let r1 = w0 * (-zeta + (zeta * zeta - 1.0).sqrt());
        let r2 = w0 * (-zeta - (zeta * zeta - 1.0).sqrt());
        let c1 = 1.0;
        let c2 = -1.0;
        1.0 - (c1 * (r1 * t).exp() + c2 * (r2 * t).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn builtin_curves() -> Vec<Box<dyn EasingFunction>> {
        vec![
            Box::new(LinearEase),
            Box::new(EaseIn),
            Box::new(EaseOut),
            Box::new(EaseInOut),
            Box::new(CubicEase),
            Box::new(BezierEase::new()),
            Box::new(SpringEase::new()),
        ]
    }

    #[test]
    fn test_endpoints() {
        for curve in builtin_curves() {
            assert_relative_eq!(curve.ease(0.0), 0.0, epsilon = 1e-9);
            assert_relative_eq!(curve.ease(1.0), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_quadratic_shapes() {
        assert_relative_eq!(EaseIn.ease(0.5), 0.25);
        assert_relative_eq!(EaseOut.ease(0.5), 0.75);
        assert_relative_eq!(EaseInOut.ease(0.5), 0.5);
        assert_relative_eq!(CubicEase.ease(0.5), 0.5);
        // Accelerating start, decelerating end
        assert!(EaseInOut.ease(0.25) < 0.25);
        assert!(EaseInOut.ease(0.75) > 0.75);
    }

    #[test]
    fn test_monotonic_quadratics() {
        for curve in [&EaseIn as &dyn EasingFunction, &EaseOut, &EaseInOut] {
            let mut last = curve.ease(0.0);
            for i in 1..=20 {
                let next = curve.ease(i as f64 / 20.0);
                assert!(next >= last, "{} not monotonic", curve.name());
                last = next;
            }
        }
    }

    #[test]
    fn test_step_threshold() {
        let snap_late = StepEase::new();
        assert_eq!(snap_late.ease(0.99), 0.0);
        assert_eq!(snap_late.ease(1.0), 1.0);

        let snap_mid = StepEase::with_point(0.5);
        assert_eq!(snap_mid.ease(0.49), 0.0);
        assert_eq!(snap_mid.ease(0.5), 1.0);
    }

    #[test]
    fn test_bezier_identity_controls() {
        let identity = BezierEase::with_control_points((0.0, 0.0), (1.0, 1.0));
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert_relative_eq!(identity.ease(t), t, epsilon = 0.01);
        }
    }

    #[test]
    fn test_spring_settles() {
        let spring = SpringEase::new();
        // Near the end the response hovers around the target
        assert!((spring.ease(0.95) - 1.0).abs() < 0.25);
    }
}
