use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Parses a model label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
        }
    }
}

/// Label plus confidence in `[0, 1]` for one face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub gender: Gender,
    pub confidence: f64,
}

impl Classification {
    pub fn new(gender: Gender, confidence: f64) -> Self {
        Self {
            gender,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Returned when there is nothing to base a guess on.
    pub fn neutral() -> Self {
        Self::new(Gender::Female, 0.5)
    }

    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Male", Some(Gender::Male))]
    #[case("female", Some(Gender::Female))]
    #[case(" MALE ", Some(Gender::Male))]
    #[case("unknown", None)]
    fn test_from_label(#[case] label: &str, #[case] expected: Option<Gender>) {
        assert_eq!(Gender::from_label(label), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(Gender::Male.to_string(), "Male");
        assert_eq!(Gender::Female.to_string(), "Female");
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_relative_eq!(Classification::new(Gender::Male, 1.7).confidence, 1.0);
        assert_relative_eq!(Classification::new(Gender::Male, -0.2).confidence, 0.0);
    }

    #[test]
    fn test_neutral_is_half_female() {
        let c = Classification::neutral();
        assert_eq!(c.gender, Gender::Female);
        assert_relative_eq!(c.confidence, 0.5);
        assert_relative_eq!(c.confidence_percent(), 50.0);
    }
}
