pub mod duration {
    use crate::time::timeunit::parse_duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse_duration(&value).map_err(|err| D::Error::custom(err.to_string()))
    }

    pub mod option {
        use crate::time::timeunit::parse_duration;
        use serde::de::Error;
        use serde::{Deserialize, Deserializer};
        use std::time::Duration;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|v| parse_duration(&v).map_err(|err| D::Error::custom(err.to_string())))
                .transpose()
        }
    }
}
