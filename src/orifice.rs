use std::f64::consts::FRAC_PI_4;

use crate::error::FlowError;

pub const BETA_MIN: f64 = 0.2;
pub const BETA_MAX: f64 = 0.75;
pub const SAMPLE_COUNT: usize = 1000;

/// Fixed meter and fluid conditions, in SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowParameters {
    /// Pipe internal diameter [m]
    pub pipe_diameter: f64,
    /// Discharge coefficient [-]
    pub discharge_coefficient: f64,
    /// Differential pressure across the plate [Pa]
    pub pressure_differential: f64,
    /// Fluid density [kg/m3]
    pub fluid_density: f64,
}

impl FlowParameters {
    pub fn new(
        pipe_diameter: f64,
        discharge_coefficient: f64,
        pressure_differential: f64,
        fluid_density: f64,
    ) -> Result<Self, FlowError> {
        positive("pipe diameter", pipe_diameter)?;
        positive("discharge coefficient", discharge_coefficient)?;
        positive("fluid density", fluid_density)?;
        if !pressure_differential.is_finite() {
            return Err(FlowError::InvalidParameter {
                name: "pressure differential",
                value: pressure_differential,
            });
        }

        Ok(Self {
            pipe_diameter,
            discharge_coefficient,
            pressure_differential,
            fluid_density,
        })
    }

    /// Orifice bore area for the given diameter ratio [m2].
    pub fn bore_area(&self, beta: f64) -> f64 {
        FRAC_PI_4 * (beta * self.pipe_diameter).powi(2)
    }

    pub fn radicand(&self, beta: f64) -> f64 {
        (2.0 * self.pressure_differential) / (self.fluid_density * (1.0 - beta.powi(4)))
    }

    /// Volumetric flow [m3/s]. Unguarded: outside the domain this is NaN or infinite.
    pub fn flow(&self, beta: f64) -> f64 {
        self.discharge_coefficient * self.bore_area(beta) * self.radicand(beta).sqrt()
    }

    /// Checked flow: `beta` must lie in (0, 1) and the radicand must be a non-negative real.
    pub fn try_flow(&self, beta: f64) -> Result<f64, FlowError> {
        let radicand = self.radicand(beta);
        if !(beta > 0.0 && beta < 1.0 && radicand.is_finite() && radicand >= 0.0) {
            return Err(FlowError::DomainAnomaly { beta, radicand });
        }

        Ok(self.discharge_coefficient * self.bore_area(beta) * radicand.sqrt())
    }
}

/// Velocity of approach factor, 1 / (1 - beta^4).
pub fn velocity_of_approach(beta: f64) -> f64 {
    1.0 / (1.0 - beta.powi(4))
}

pub fn flow(beta: f64, params: &FlowParameters) -> f64 {
    params.flow(beta)
}

fn positive(name: &'static str, value: f64) -> Result<(), FlowError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FlowError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn water() -> FlowParameters {
        FlowParameters::new(0.1, 0.6, 5000.0, 1000.0).unwrap()
    }

    #[test]
    fn matches_hand_calculation() {
        // A2 = pi/4 * 0.05^2, sqrt(10 / (1 - 0.0625))
        let a2 = FRAC_PI_4 * 0.05_f64.powi(2);
        let expected = 0.6 * a2 * (10.0_f64 / 0.9375).sqrt();
        assert_relative_eq!(water().flow(0.5), expected, max_relative = 1e-12);
        assert_relative_eq!(water().flow(0.5), 0.003_847_649_5, epsilon = 1e-10);
    }

    #[test]
    fn radicand_uses_velocity_of_approach() {
        let p = water();
        for beta in [0.2, 0.45, 0.7] {
            assert_relative_eq!(
                p.radicand(beta),
                2.0 * 5000.0 / 1000.0 * velocity_of_approach(beta),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn free_function_delegates() {
        let p = water();
        assert_eq!(flow(0.3, &p), p.flow(0.3));
    }

    #[test]
    fn zero_differential_gives_zero_flow() {
        let p = FlowParameters::new(0.1, 0.6, 0.0, 1000.0).unwrap();
        assert_eq!(p.flow(0.5), 0.0);
        assert_eq!(p.try_flow(0.5), Ok(0.0));
    }

    #[test]
    fn negative_differential_is_nan_unguarded() {
        let p = FlowParameters::new(0.1, 0.6, -5000.0, 1000.0).unwrap();
        assert!(p.flow(0.5).is_nan());
        assert!(matches!(
            p.try_flow(0.5),
            Err(FlowError::DomainAnomaly { beta, .. }) if beta == 0.5
        ));
    }

    #[test]
    fn beta_at_or_beyond_one_is_a_domain_anomaly() {
        let p = water();
        assert!(!p.flow(1.0).is_finite());
        assert!(p.flow(1.2).is_nan());
        assert!(p.try_flow(1.0).is_err());
        assert!(p.try_flow(1.2).is_err());
    }

    #[test]
    fn try_flow_rejects_non_positive_beta() {
        let p = water();
        assert!(p.flow(-0.5).is_finite());
        assert!(matches!(
            p.try_flow(-0.5),
            Err(FlowError::DomainAnomaly { beta, .. }) if beta == -0.5
        ));
        assert!(p.try_flow(0.0).is_err());
        assert!(p.try_flow(f64::NAN).is_err());
        assert!(p.try_flow(0.2).is_ok());
    }

    #[test]
    fn rejects_non_positive_parameters() {
        assert_eq!(
            FlowParameters::new(0.0, 0.6, 5000.0, 1000.0),
            Err(FlowError::InvalidParameter {
                name: "pipe diameter",
                value: 0.0
            })
        );
        assert!(FlowParameters::new(0.1, -0.6, 5000.0, 1000.0).is_err());
        assert!(FlowParameters::new(0.1, 0.6, 5000.0, 0.0).is_err());
        assert!(FlowParameters::new(0.1, 0.6, f64::NAN, 1000.0).is_err());
        assert!(FlowParameters::new(f64::INFINITY, 0.6, 5000.0, 1000.0).is_err());
    }
}
