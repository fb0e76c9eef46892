//! Request extractors that reject with the JSON error body.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::{self, DeserializeOwned, Deserializer, Unexpected};
use serde::Deserialize;
use tally_shared::AppError;
use validator::Validate;

use crate::error::ApiError;

/// JSON body that is deserialized and then validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path parameter extractor.
#[derive(Debug, Clone, Copy)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

fn parse_bool<E: de::Error>(raw: &str) -> Result<bool, E> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(E::invalid_value(Unexpected::Str(other), &"true, false, 1 or 0")),
    }
}

/// Deserializes `true`/`false`/`1`/`0` from a query string.
///
/// # Errors
///
/// Returns an error for any other value.
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_bool(&raw)
}

/// Optional variant of [`flexible_bool`]; use with `#[serde(default)]`.
///
/// # Errors
///
/// Returns an error for any value other than `true`, `false`, `1` or `0`.
pub fn flexible_bool_option<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_bool(&raw))
        .transpose()
}

/// Deserializes a string with surrounding whitespace removed.
///
/// Runs before validation, so a blank value fails `length(min = 1)`.
///
/// # Errors
///
/// Returns an error if the value is not a string.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

/// Optional variant of [`trimmed`]; use with `#[serde(default)]`.
///
/// # Errors
///
/// Returns an error if the value is neither a string nor `null`.
pub fn trimmed_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|raw| raw.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Deserialize)]
    struct Flags {
        #[serde(default, deserialize_with = "flexible_bool")]
        include: bool,
        #[serde(default, deserialize_with = "flexible_bool_option")]
        active: Option<bool>,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[serde(deserialize_with = "trimmed")]
        #[validate(length(min = 1))]
        code: String,
        #[serde(default, deserialize_with = "trimmed_option")]
        #[validate(length(min = 1))]
        name: Option<String>,
    }

    fn parse(query: &str) -> Result<Flags, axum::extract::rejection::QueryRejection> {
        let uri: axum::http::Uri = format!("/trial-balance?{query}").parse().unwrap();
        Query::<Flags>::try_from_uri(&uri).map(|Query(flags)| flags)
    }

    #[rstest]
    #[case("include=true", true)]
    #[case("include=1", true)]
    #[case("include=TRUE", true)]
    #[case("include=false", false)]
    #[case("include=0", false)]
    #[case("", false)]
    fn test_flexible_bool(#[case] query: &str, #[case] expected: bool) {
        assert_eq!(parse(query).unwrap().include, expected);
    }

    #[test]
    fn test_flexible_bool_rejects_other_values() {
        assert!(parse("include=maybe").is_err());
    }

    #[rstest]
    #[case("active=1", Some(true))]
    #[case("active=false", Some(false))]
    #[case("", None)]
    fn test_flexible_bool_option(#[case] query: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse(query).unwrap().active, expected);
    }

    #[test]
    fn test_trimmed_strips_whitespace() {
        let named: Named = serde_json::from_str(r#"{"code": "  1001 ", "name": " Cash "}"#).unwrap();

        assert_eq!(named.code, "1001");
        assert_eq!(named.name.as_deref(), Some("Cash"));
        assert!(named.validate().is_ok());
    }

    #[test]
    fn test_blank_values_fail_validation() {
        let named: Named = serde_json::from_str(r#"{"code": "   ", "name": "\t"}"#).unwrap();

        let errors = named.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("code"));
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_missing_optional_is_none() {
        let named: Named = serde_json::from_str(r#"{"code": "1001"}"#).unwrap();
        assert!(named.name.is_none());
    }
}
