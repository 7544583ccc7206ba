//! Explicit one-step ODE integrators over any [`Arith`] backend.
//!
//! A system is anything that maps `(t, x)` to `dx/dt`; the state is a flat
//! slice of values. The step size is a plain `f64` and the caller advances
//! `t` itself.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::sim::arith::Arith;

/// `dx/dt = f(t, x)`.
pub trait OdeSystem<A: Arith> {
    fn derivative(&mut self, arith: &mut A, t: &A::Value, x: &[A::Value]) -> Vec<A::Value>;
}

impl<A, F> OdeSystem<A> for F
where
    A: Arith,
    F: FnMut(&mut A, &A::Value, &[A::Value]) -> Vec<A::Value>,
{
    fn derivative(&mut self, arith: &mut A, t: &A::Value, x: &[A::Value]) -> Vec<A::Value> {
        self(arith, t, x)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stepper {
    /// Forward Euler, `x + h k0`.
    #[default]
    Euler,
    /// Heun's second-order method (explicit trapezoidal rule):
    /// `x + h/2 (k0 + k1)` with `k1 = f(t + h, x + h k0)`.
    Rk2,
}

impl Stepper {
    /// Derivative evaluations per step.
    pub fn stages(self) -> usize {
        match self {
            Stepper::Euler => 1,
            Stepper::Rk2 => 2,
        }
    }

    /// State at `t + h`.
    pub fn step<A, S>(
        self,
        arith: &mut A,
        system: &mut S,
        t: &A::Value,
        x: &[A::Value],
        h: f64,
    ) -> Vec<A::Value>
    where
        A: Arith,
        S: OdeSystem<A> + ?Sized,
    {
        let k0 = system.derivative(arith, t, x);
        let predicted: Vec<A::Value> = x
            .iter()
            .zip(&k0)
            .map(|(xi, ki)| {
                let hk = arith.scale(ki, h);
                arith.add(xi, &hk)
            })
            .collect();
        match self {
            Stepper::Euler => predicted,
            Stepper::Rk2 => {
                let t1 = arith.add_scalar(t, h);
                let k1 = system.derivative(arith, &t1, &predicted);
                x.iter()
                    .zip(k0.iter().zip(&k1))
                    .map(|(xi, (a, b))| {
                        let ha = arith.scale(a, 0.5 * h);
                        let hb = arith.scale(b, 0.5 * h);
                        let partial = arith.add(xi, &ha);
                        arith.add(&partial, &hb)
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arith::{AffineArith, FloatArith, IntervalArith, Reduction};
    use approx::assert_abs_diff_eq;

    /// `dx/dt = -x`, exact solution `x0 e^{-t}`.
    fn decay<A: Arith>(arith: &mut A, _t: &A::Value, x: &[A::Value]) -> Vec<A::Value> {
        vec![arith.neg(&x[0])]
    }

    fn integrate(stepper: Stepper, h: f64, steps: usize) -> f64 {
        let mut arith = FloatArith;
        let mut t = 0.0;
        let mut x = vec![1.0];
        for _ in 0..steps {
            x = stepper.step(&mut arith, &mut decay::<FloatArith>, &t, &x, h);
            t += h;
        }
        x[0]
    }

    #[test]
    fn euler_matches_hand_iteration() {
        assert_abs_diff_eq!(integrate(Stepper::Euler, 0.1, 3), 0.9f64.powi(3), epsilon = 1e-15);
    }

    #[test]
    fn rk2_is_second_order() {
        let exact = (-1.0f64).exp();
        let coarse = (integrate(Stepper::Rk2, 0.1, 10) - exact).abs();
        let fine = (integrate(Stepper::Rk2, 0.05, 20) - exact).abs();
        // Halving h cuts a second-order error by about four.
        assert!(coarse / fine > 3.5 && coarse / fine < 4.5, "ratio {}", coarse / fine);
        assert!(coarse < (integrate(Stepper::Euler, 0.1, 10) - exact).abs());
    }

    #[test]
    fn rk2_sees_time_at_the_end_of_the_step() {
        // dx/dt = t from x = 0: Heun is exact for linear t.
        let mut arith = FloatArith;
        let mut ramp = |_: &mut FloatArith, t: &f64, _: &[f64]| vec![*t];
        let x = Stepper::Rk2.step(&mut arith, &mut ramp, &0.0, &[0.0], 2.0);
        assert_abs_diff_eq!(x[0], 2.0);
    }

    #[test]
    fn enclosures_contain_the_float_step() {
        let f = Stepper::Rk2.step(&mut FloatArith, &mut decay::<FloatArith>, &0.0, &[1.0], 0.1);
        let mut ia = IntervalArith;
        let x0 = ia.uncertain(1.0, 1e-3);
        let t0 = ia.constant(0.0);
        let i = Stepper::Rk2.step(&mut ia, &mut decay::<IntervalArith>, &t0, &[x0], 0.1);
        assert!(i[0].contains(f[0]));

        let mut aa = AffineArith::new(Reduction::default());
        let x0 = aa.uncertain(1.0, 1e-3);
        let t0 = aa.constant(0.0);
        let a = Stepper::Rk2.step(&mut aa, &mut decay::<AffineArith>, &t0, &[x0], 0.1);
        assert!(a[0].bounds().contains(f[0]));
        // Linear dynamics keep the single input symbol exactly.
        assert!(a[0].radius() <= i[0].radius() + 1e-15);
    }
}
