use serde::{Deserialize, Serialize};

use super::InferenceError;

/// Maps the classifier's integer codes back to the textual labels it was trained on.
/// Code `i` is `classes[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self, InferenceError> {
        if classes.is_empty() {
            return Err(InferenceError::schema("label encoder has no classes"));
        }
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn inverse_transform(&self, codes: &[usize]) -> Result<Vec<String>, InferenceError> {
        codes
            .iter()
            .map(|&code| {
                self.classes
                    .get(code)
                    .cloned()
                    .ok_or(InferenceError::UnknownClass(code))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn encoder() -> LabelEncoder {
        LabelEncoder::new(vec!["No".to_string(), "Yes".to_string()]).unwrap()
    }

    #[test]
    fn test_inverse_transform() {
        let encoder = encoder();
        assert_eq!(encoder.inverse_transform(&[1, 0]).unwrap(), ["Yes", "No"]);
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        assert_matches!(
            encoder().inverse_transform(&[2]),
            Err(InferenceError::UnknownClass(2))
        );
    }

    #[test]
    fn test_empty_encoder_is_rejected() {
        assert!(LabelEncoder::new(vec![]).is_err());
    }
}
