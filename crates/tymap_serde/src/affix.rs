use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;

use tymap_registry::Type;

use crate::{FailurePolicy, KeyCodec, PolyMapError, TypeLoader};

// -----------------------------------------------------------------------------
// AffixCodec

/// A [`KeyCodec`] stripping a prefix and a suffix shared by every type path.
///
/// Every serialized type must start with the prefix and end with the suffix,
/// otherwise encoding fails with [`PolyMapError::AffixMismatch`].
///
/// The default failure policy is [`FailurePolicy::Strict`].
///
/// # Examples
///
/// ```
/// use core::any::Any;
/// use serde::{Deserialize, Serialize};
/// use tymap_registry::{impl_type_path, Type, TypeRegistry};
/// use tymap_serde::{AffixCodec, KeyCodec};
///
/// #[derive(Serialize, Deserialize)]
/// struct NetworkConfig;
/// impl_type_path!(NetworkConfig as "pkg::model::NetworkConfig");
///
/// let mut registry = TypeRegistry::<dyn Any>::new();
/// registry.register::<NetworkConfig>();
///
/// let codec = AffixCodec::new("pkg::model::", "Config");
/// let ty = Type::of::<NetworkConfig>();
///
/// assert_eq!(codec.encode(&ty).unwrap(), "Network");
/// assert_eq!(codec.decode("Network", &registry).unwrap(), ty);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AffixCodec {
    prefix: String,
    suffix: String,
}

impl AffixCodec {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[inline]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl KeyCodec for AffixCodec {
    fn encode(&self, ty: &Type) -> Result<Cow<'_, str>, PolyMapError> {
        let path = ty.path();
        match path
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_suffix(self.suffix.as_str()))
        {
            Some(key) => Ok(Cow::Borrowed(key)),
            None => Err(PolyMapError::AffixMismatch {
                name: path.into(),
                prefix: self.prefix.clone(),
                suffix: self.suffix.clone(),
            }),
        }
    }

    fn decode(&self, key: &str, loader: &dyn TypeLoader) -> Result<Type, PolyMapError> {
        let path = format!("{}{key}{}", self.prefix, self.suffix);
        loader.load_type_by_name(&path).map_err(|e| {
            log::debug!("AffixCodec::decode -> {e}");
            PolyMapError::UnresolvedKey(key.into())
        })
    }

    #[inline]
    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Strict
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::Any;

    use serde::{Deserialize, Serialize};
    use tymap_registry::{Type, TypeRegistry};

    use super::AffixCodec;
    use crate::{FailurePolicy, KeyCodec, PolyMapError};

    #[derive(Serialize, Deserialize)]
    struct NetworkConfig;
    tymap_registry::impl_type_path!(NetworkConfig as "pkg::model::NetworkConfig");

    #[derive(Serialize, Deserialize)]
    struct Network;
    tymap_registry::impl_type_path!(Network as "pkg::model::Network");

    #[derive(Serialize, Deserialize)]
    struct Config;
    tymap_registry::impl_type_path!(Config as "pkg::model::Config");

    #[test]
    fn strips_and_restores() {
        let mut registry = TypeRegistry::<dyn Any>::new();
        registry.register::<NetworkConfig>();
        registry.register::<Config>();

        let codec = AffixCodec::new("pkg::model::", "Config");
        assert_eq!(codec.prefix(), "pkg::model::");
        assert_eq!(codec.suffix(), "Config");
        assert_eq!(codec.failure_policy(), FailurePolicy::Strict);

        assert_eq!(codec.encode(&Type::of::<NetworkConfig>()).unwrap(), "Network");
        assert_eq!(codec.encode(&Type::of::<Config>()).unwrap(), "");
        assert!(codec.decode("", &registry).unwrap().is::<Config>());
        assert!(codec.decode("Network", &registry).unwrap().is::<NetworkConfig>());
        assert_eq!(
            codec.decode("Storage", &registry),
            Err(PolyMapError::UnresolvedKey("Storage".into()))
        );
    }

    #[test]
    fn rejects_foreign_paths() {
        let codec = AffixCodec::new("pkg::model::", "Config");
        assert_eq!(
            codec.encode(&Type::of::<Network>()).unwrap_err(),
            PolyMapError::AffixMismatch {
                name: "pkg::model::Network".into(),
                prefix: "pkg::model::".into(),
                suffix: "Config".into(),
            }
        );

        let codec = AffixCodec::new("app::", "");
        assert!(codec.encode(&Type::of::<NetworkConfig>()).is_err());
    }

    #[test]
    fn empty_affixes_keep_the_path() {
        let codec = AffixCodec::default();
        assert_eq!(
            codec.encode(&Type::of::<Network>()).unwrap(),
            "pkg::model::Network"
        );
    }
}
