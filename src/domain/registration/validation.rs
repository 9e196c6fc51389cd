//! Registration validation utilities

use thiserror::Error;

/// Maximum length for service type identifiers
pub const MAX_SERVICE_TYPE_ID_LENGTH: usize = 64;

/// Maximum length for trial keys
pub const MAX_TRIAL_KEY_LENGTH: usize = 64;

/// Validation errors for registrations and trials
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    #[error("Service type ID cannot be empty")]
    EmptyServiceTypeId,

    #[error("Service type ID exceeds maximum length of {0} characters")]
    ServiceTypeIdTooLong(usize),

    #[error("Service type ID must start and end with a letter or number")]
    InvalidServiceTypeIdBoundary,

    #[error("Service type ID contains invalid character: '{0}'")]
    InvalidServiceTypeIdCharacter(char),

    #[error("Trial key cannot be empty")]
    EmptyTrialKey,

    #[error("Trial key exceeds maximum length of {0} characters")]
    TrialKeyTooLong(usize),

    #[error("Trial key must start and end with a letter or number")]
    InvalidTrialKeyBoundary,

    #[error("Trial key contains invalid character: '{0}'")]
    InvalidTrialKeyCharacter(char),

    #[error("Registration must declare at least one trial")]
    NoTrials,

    #[error("Duplicate trial key: '{0}'")]
    DuplicateTrialKey(String),

    #[error("Registration has no default trial key")]
    MissingDefaultKey,

    #[error("Default trial key '{0}' is not a declared trial")]
    UnknownDefaultKey(String),

    #[error("Registration end time precedes start time")]
    InvertedTimeWindow,

    #[error("Sticky routing requires at least one trial key")]
    NoTrialKeysForSticky,
}

/// Validate a service type identifier
pub fn validate_service_type_id(id: &str) -> Result<(), RegistrationValidationError> {
    if id.is_empty() {
        return Err(RegistrationValidationError::EmptyServiceTypeId);
    }

    if id.len() > MAX_SERVICE_TYPE_ID_LENGTH {
        return Err(RegistrationValidationError::ServiceTypeIdTooLong(
            MAX_SERVICE_TYPE_ID_LENGTH,
        ));
    }

    let first_char = id.chars().next().unwrap();
    let last_char = id.chars().last().unwrap();

    if !first_char.is_ascii_alphanumeric() || !last_char.is_ascii_alphanumeric() {
        return Err(RegistrationValidationError::InvalidServiceTypeIdBoundary);
    }

    for ch in id.chars() {
        if !ch.is_ascii_alphanumeric() && !matches!(ch, '-' | '_' | '.') {
            return Err(RegistrationValidationError::InvalidServiceTypeIdCharacter(
                ch,
            ));
        }
    }

    Ok(())
}

/// Validate a trial key
pub fn validate_trial_key(key: &str) -> Result<(), RegistrationValidationError> {
    if key.is_empty() {
        return Err(RegistrationValidationError::EmptyTrialKey);
    }

    if key.len() > MAX_TRIAL_KEY_LENGTH {
        return Err(RegistrationValidationError::TrialKeyTooLong(
            MAX_TRIAL_KEY_LENGTH,
        ));
    }

    let first_char = key.chars().next().unwrap();
    let last_char = key.chars().last().unwrap();

    if !first_char.is_ascii_alphanumeric() || !last_char.is_ascii_alphanumeric() {
        return Err(RegistrationValidationError::InvalidTrialKeyBoundary);
    }

    for ch in key.chars() {
        if !ch.is_ascii_alphanumeric() && !matches!(ch, '-' | '_' | '.') {
            return Err(RegistrationValidationError::InvalidTrialKeyCharacter(ch));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod service_type_id_validation {
        use super::*;

        #[test]
        fn test_valid_service_type_ids() {
            assert!(validate_service_type_id("pricing-service").is_ok());
            assert!(validate_service_type_id("search.ranker").is_ok());
            assert!(validate_service_type_id("recommender_v2").is_ok());
            assert!(validate_service_type_id("a").is_ok());
        }

        #[test]
        fn test_empty_id() {
            assert_eq!(
                validate_service_type_id(""),
                Err(RegistrationValidationError::EmptyServiceTypeId)
            );
        }

        #[test]
        fn test_id_too_long() {
            let long_id = "a".repeat(65);
            assert_eq!(
                validate_service_type_id(&long_id),
                Err(RegistrationValidationError::ServiceTypeIdTooLong(64))
            );
        }

        #[test]
        fn test_invalid_boundaries() {
            assert_eq!(
                validate_service_type_id("-pricing"),
                Err(RegistrationValidationError::InvalidServiceTypeIdBoundary)
            );
            assert_eq!(
                validate_service_type_id("pricing-"),
                Err(RegistrationValidationError::InvalidServiceTypeIdBoundary)
            );
        }

        #[test]
        fn test_invalid_character() {
            assert_eq!(
                validate_service_type_id("pricing service"),
                Err(RegistrationValidationError::InvalidServiceTypeIdCharacter(
                    ' '
                ))
            );
            assert_eq!(
                validate_service_type_id("pricing/v2"),
                Err(RegistrationValidationError::InvalidServiceTypeIdCharacter(
                    '/'
                ))
            );
        }
    }

    mod trial_key_validation {
        use super::*;

        #[test]
        fn test_valid_trial_keys() {
            assert!(validate_trial_key("control").is_ok());
            assert!(validate_trial_key("true").is_ok());
            assert!(validate_trial_key("false").is_ok());
            assert!(validate_trial_key("variant-a").is_ok());
            assert!(validate_trial_key("v2.1").is_ok());
        }

        #[test]
        fn test_empty_trial_key() {
            assert_eq!(
                validate_trial_key(""),
                Err(RegistrationValidationError::EmptyTrialKey)
            );
        }

        #[test]
        fn test_trial_key_too_long() {
            let long_key = "k".repeat(65);
            assert_eq!(
                validate_trial_key(&long_key),
                Err(RegistrationValidationError::TrialKeyTooLong(64))
            );
        }

        #[test]
        fn test_invalid_boundary() {
            assert_eq!(
                validate_trial_key("_variant"),
                Err(RegistrationValidationError::InvalidTrialKeyBoundary)
            );
        }

        #[test]
        fn test_invalid_character() {
            assert_eq!(
                validate_trial_key("variant a"),
                Err(RegistrationValidationError::InvalidTrialKeyCharacter(' '))
            );
        }
    }
}
