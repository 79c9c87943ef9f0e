use crate::error::InputError;
use crate::orifice::FlowParameters;
use crate::search::SearchRequest;

/// The six raw text fields a user fills in before a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchForm {
    pub pipe_diameter: String,
    pub discharge_coefficient: String,
    pub pressure_differential: String,
    pub fluid_density: String,
    pub desired_flow: String,
    pub tolerance: String,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            pipe_diameter: "0.1".into(),
            discharge_coefficient: "0.6".into(),
            pressure_differential: "5000".into(),
            fluid_density: "1000".into(),
            desired_flow: "0.002".into(),
            tolerance: "1e-6".into(),
        }
    }
}

impl SearchForm {
    /// Parses every field, then validates the assembled request.
    ///
    /// Fields are read in form order and the first bad one is reported.
    pub fn parse(&self) -> Result<SearchRequest, InputError> {
        let pipe_diameter = parse_field("pipe diameter", &self.pipe_diameter)?;
        let discharge_coefficient =
            parse_field("discharge coefficient", &self.discharge_coefficient)?;
        let pressure_differential =
            parse_field("pressure differential", &self.pressure_differential)?;
        let fluid_density = parse_field("fluid density", &self.fluid_density)?;
        let desired_flow = parse_field("desired flow", &self.desired_flow)?;
        let tolerance = parse_field("tolerance", &self.tolerance)?;

        let parameters = FlowParameters::new(
            pipe_diameter,
            discharge_coefficient,
            pressure_differential,
            fluid_density,
        )?;

        Ok(SearchRequest::new(parameters, desired_flow, tolerance)?)
    }
}

fn parse_field(field: &'static str, raw: &str) -> Result<f64, InputError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(InputError::Missing { field });
    }

    text.parse::<f64>().map_err(|_| InputError::NotNumeric {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FlowError, SearchError};

    #[test]
    fn default_form_parses() {
        let request = SearchForm::default().parse().unwrap();
        assert_eq!(request.parameters.pipe_diameter, 0.1);
        assert_eq!(request.parameters.pressure_differential, 5000.0);
        assert_eq!(request.desired_flow, 0.002);
        assert_eq!(request.tolerance, 1e-6);
        assert_eq!(request.sample_count, 1000);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let form = SearchForm {
            fluid_density: "  998.2 ".into(),
            ..SearchForm::default()
        };
        assert_eq!(form.parse().unwrap().parameters.fluid_density, 998.2);
    }

    #[test]
    fn blank_field_is_missing() {
        let form = SearchForm {
            tolerance: "   ".into(),
            ..SearchForm::default()
        };
        assert_eq!(
            form.parse(),
            Err(InputError::Missing { field: "tolerance" })
        );
    }

    #[test]
    fn text_field_is_not_numeric() {
        let form = SearchForm {
            discharge_coefficient: "0,6".into(),
            ..SearchForm::default()
        };
        assert_eq!(
            form.parse(),
            Err(InputError::NotNumeric {
                field: "discharge coefficient",
                value: "0,6".into()
            })
        );
    }

    #[test]
    fn first_bad_field_is_reported() {
        let form = SearchForm {
            pipe_diameter: "abc".into(),
            desired_flow: "".into(),
            ..SearchForm::default()
        };
        assert!(matches!(
            form.parse(),
            Err(InputError::NotNumeric { field: "pipe diameter", .. })
        ));
    }

    #[test]
    fn out_of_domain_values_are_rejected() {
        let form = SearchForm {
            fluid_density: "-1".into(),
            ..SearchForm::default()
        };
        assert_eq!(
            form.parse(),
            Err(InputError::Rejected(SearchError::Parameters(
                FlowError::InvalidParameter {
                    name: "fluid density",
                    value: -1.0
                }
            )))
        );

        let form = SearchForm {
            tolerance: "0".into(),
            ..SearchForm::default()
        };
        assert_eq!(
            form.parse(),
            Err(InputError::Rejected(SearchError::InvalidTolerance(0.0)))
        );
    }

    #[test]
    fn nan_text_is_rejected_after_parsing() {
        let form = SearchForm {
            desired_flow: "NaN".into(),
            ..SearchForm::default()
        };
        assert!(matches!(
            form.parse(),
            Err(InputError::Rejected(SearchError::InvalidDesiredFlow(_)))
        ));
    }

    #[test]
    fn negative_differential_is_accepted() {
        let form = SearchForm {
            pressure_differential: "-5000".into(),
            ..SearchForm::default()
        };
        assert!(form.parse().is_ok());
    }
}
