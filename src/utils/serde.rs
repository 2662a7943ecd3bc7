use serde::{Deserializer, de};
use std::{fmt, path::PathBuf};

/// Deserializes a list of paths from either a sequence or a single string
/// (like an environment variable) separated by commas or newlines.
pub fn deserialize_path_list<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PathListVisitor;

    impl<'de> de::Visitor<'de> for PathListVisitor {
        type Value = Vec<PathBuf>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a sequence of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value
                .split([',', '\n'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut paths = Vec::new();
            while let Some(element) = seq.next_element::<String>()? {
                paths.push(PathBuf::from(element));
            }
            Ok(paths)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![])
        }
    }

    deserializer.deserialize_any(PathListVisitor)
}
