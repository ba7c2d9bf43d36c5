//! Critically-damped spring primitive used for Follow and Pan motion.
//!
//! Uses the closed-form analytical solution for all three damping regimes
//! rather than iterative Euler integration: the spring stays stable
//! regardless of the caller's sampling step, which matters because cursor
//! samples arrive at a different cadence than export frames.

use grabme_project_model::timeline::SpringConfig;

const REST_DISPLACEMENT_THRESHOLD: f64 = 1e-5;
const REST_VELOCITY_THRESHOLD: f64 = 1e-4;
const CRITICAL_EPSILON: f64 = 0.01;

/// A 1D (per-axis) spring state: current value, velocity, and target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringState {
    pub value: f64,
    pub velocity: f64,
    pub target: f64,
}

impl SpringState {
    pub fn at_rest(value: f64) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
        }
    }

    /// Retarget the spring mid-motion without discontinuity: the current
    /// value and velocity are kept, only `target` changes.
    pub fn retarget(&mut self, target: f64) {
        self.target = target;
    }

    pub fn is_settled(&self, eps_pos: f64, eps_vel: f64) -> bool {
        (self.value - self.target).abs() < eps_pos && self.velocity.abs() < eps_vel
    }

    /// Advance by `dt` seconds under `config`, returning the new value.
    pub fn step(&mut self, config: &SpringConfig, dt: f64) -> f64 {
        if dt <= 0.0 {
            return self.value;
        }

        let mass = config.mass.max(0.001);
        let omega0 = (config.tension / mass).sqrt();
        let zeta = config.friction / (2.0 * (config.tension * mass).sqrt());

        let displacement = self.value - self.target;
        let (new_disp, new_vel) = solve_spring_1d(displacement, self.velocity, dt, omega0, zeta);

        self.value = self.target + new_disp;
        self.velocity = new_vel;

        if self.is_settled(REST_DISPLACEMENT_THRESHOLD, REST_VELOCITY_THRESHOLD) {
            self.value = self.target;
            self.velocity = 0.0;
        }

        self.value
    }
}

/// Two independent spring axes, for center-point tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringState2D {
    pub x: SpringState,
    pub y: SpringState,
}

impl SpringState2D {
    pub fn at_rest(value: (f64, f64)) -> Self {
        Self {
            x: SpringState::at_rest(value.0),
            y: SpringState::at_rest(value.1),
        }
    }

    pub fn retarget(&mut self, target: (f64, f64)) {
        self.x.retarget(target.0);
        self.y.retarget(target.1);
    }

    pub fn step(&mut self, config: &SpringConfig, dt: f64) -> (f64, f64) {
        (self.x.step(config, dt), self.y.step(config, dt))
    }

    pub fn is_settled(&self, eps_pos: f64, eps_vel: f64) -> bool {
        self.x.is_settled(eps_pos, eps_vel) && self.y.is_settled(eps_pos, eps_vel)
    }

    pub fn value(&self) -> (f64, f64) {
        (self.x.value, self.y.value)
    }
}

/// Analytical 1D spring solver. Returns `(new_displacement, new_velocity)`.
fn solve_spring_1d(displacement: f64, velocity: f64, t: f64, omega0: f64, zeta: f64) -> (f64, f64) {
    if zeta < 1.0 - CRITICAL_EPSILON {
        // Underdamped — oscillatory decay toward the target.
        let omega_d = omega0 * (1.0 - zeta * zeta).sqrt();
        let decay = (-zeta * omega0 * t).exp();
        let cos_term = (omega_d * t).cos();
        let sin_term = (omega_d * t).sin();

        let a = displacement;
        let b = (velocity + displacement * zeta * omega0) / omega_d.max(1e-4);

        let new_disp = decay * (a * cos_term + b * sin_term);
        let new_vel = decay
            * ((b * omega_d - a * zeta * omega0) * cos_term
                - (a * omega_d + b * zeta * omega0) * sin_term);

        (new_disp, new_vel)
    } else if zeta > 1.0 + CRITICAL_EPSILON {
        // Overdamped — pure exponential decay, no oscillation.
        let sqrt_term = (zeta * zeta - 1.0).sqrt();
        let s1 = -omega0 * (zeta - sqrt_term);
        let s2 = -omega0 * (zeta + sqrt_term);
        let denom = s1 - s2;

        if denom.abs() < 1e-10 {
            let s_avg = 0.5 * (s1 + s2);
            let decay = (s_avg * t).exp();
            let new_disp = decay * (displacement + (velocity - displacement * s_avg) * t);
            let new_vel = decay
                * ((velocity - displacement * s_avg)
                    + s_avg * (displacement + (velocity - displacement * s_avg) * t));
            (new_disp, new_vel)
        } else {
            let c1 = (velocity - displacement * s2) / denom;
            let c2 = displacement - c1;

            let e1 = (s1 * t).exp();
            let e2 = (s2 * t).exp();

            (c1 * e1 + c2 * e2, c1 * s1 * e1 + c2 * s2 * e2)
        }
    } else {
        // Critically damped — fastest response with no overshoot.
        let decay = (-omega0 * t).exp();
        let a = displacement;
        let b = velocity + displacement * omega0;

        let new_disp = decay * (a + b * t);
        let new_vel = decay * (b - omega0 * (a + b * t));

        (new_disp, new_vel)
    }
}
