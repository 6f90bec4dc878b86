use serde::{Deserialize, Deserializer};

/// Ids come back as JSON numbers from most methods and as strings from a few.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Unsigned(n) => n.to_string(),
        Id::Signed(n) => n.to_string(),
    })
}

/// Optional integer settings come back as numbers, as numeric strings, as `""` or as `null`.
/// Anything blank reads as zero, the value the API uses for "not set".
pub(crate) fn int_or_blank<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Setting {
        Number(i64),
        Text(String),
    }

    let value = match Option::<Setting>::deserialize(deserializer)? {
        None => return Ok(0),
        Some(Setting::Number(n)) => n,
        Some(Setting::Text(s)) if s.trim().is_empty() => return Ok(0),
        Some(Setting::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("not an integer: {s:?}")))?,
    };
    i32::try_from(value).map_err(|_| serde::de::Error::custom(format!("out of range: {value}")))
}
