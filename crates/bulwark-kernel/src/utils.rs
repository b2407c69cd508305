//! Small serde helpers shared by configuration types.

/// (De)serialize a [`Duration`](std::time::Duration) as fractional seconds.
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct Cfg {
///     #[serde(with = "bulwark_kernel::utils::duration_secs")]
///     recovery_timeout: Duration,
/// }
/// // recovery_timeout = 2.5
/// ```
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

/// Like [`duration_secs`] but for `Option<Duration>`; absent or null means `None`.
pub mod option_duration_secs {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Timeouts {
        #[serde(with = "super::duration_secs")]
        recovery: Duration,
        #[serde(default, with = "super::option_duration_secs")]
        deadline: Option<Duration>,
    }

    #[test]
    fn test_fractional_seconds_roundtrip() {
        let parsed: Timeouts =
            serde_json::from_str(r#"{ "recovery": 2.5, "deadline": 0.25 }"#).unwrap();
        assert_eq!(parsed.recovery, Duration::from_millis(2500));
        assert_eq!(parsed.deadline, Some(Duration::from_millis(250)));

        let json = serde_json::to_string(&parsed).unwrap();
        assert_eq!(json, r#"{"recovery":2.5,"deadline":0.25}"#);
    }

    #[test]
    fn test_missing_optional_deadline() {
        let parsed: Timeouts = serde_json::from_str(r#"{ "recovery": 10 }"#).unwrap();
        assert_eq!(parsed.recovery, Duration::from_secs(10));
        assert_eq!(parsed.deadline, None);
    }

    #[test]
    fn test_negative_seconds_rejected() {
        let parsed = serde_json::from_str::<Timeouts>(r#"{ "recovery": -1.0 }"#);
        assert!(parsed.is_err());
    }
}
