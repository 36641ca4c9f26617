use rollsim_core::{BallDynamics, Regime, StateVector};

/// State after one committed step and the regime of its final stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub state: StateVector,
    pub regime: Regime,
}

/// Advance `state` by `dt` with the classic fourth-order Runge-Kutta method.
///
/// The reported regime is the one returned by the last stage evaluation, so
/// intermediate stages never leak into the record.
pub fn rk4_step(dynamics: &BallDynamics, state: &StateVector, dt: f64) -> Step {
    let k1 = dynamics.evaluate(state);
    let k2 = dynamics.evaluate(&(*state + k1.derivative * (dt / 2.0)));
    let k3 = dynamics.evaluate(&(*state + k2.derivative * (dt / 2.0)));
    let k4 = dynamics.evaluate(&(*state + k3.derivative * dt));

    let slope = k1.derivative + k2.derivative * 2.0 + k3.derivative * 2.0 + k4.derivative;
    Step {
        state: *state + slope * (dt / 6.0),
        regime: k4.regime,
    }
}
