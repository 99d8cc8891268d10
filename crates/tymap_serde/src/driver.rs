use core::fmt;
use core::marker::PhantomData;

use tymap_registry::{Bound, Type, TypeMap, TypeRegistry};
use tymap_section::{Section, SectionMap, SectionOptions};

use crate::{FailurePolicy, KeyCodec, PolyMapError, SerializerFactory, TypeLoader};

// -----------------------------------------------------------------------------
// PolyMapSerializer

/// The serialized form of a [`TypeMap`]: one section per entry, under the
/// key produced by a [`KeyCodec`], in the order of the entries.
pub type SerializedForm = SectionMap;

/// Converts a [`TypeMap`] to its [`SerializedForm`] and back.
///
/// - The [`KeyCodec`] turns each type tag into a key, and each key back
///   into a type tag.
/// - The factory, [`TypeRegistry`] by default, provides the serializer of
///   each type tag. Values are always serialized with the serializer of the
///   tag they are stored under.
/// - The [`FailurePolicy`] decides what happens to entries that cannot be
///   deserialized. It defaults to the policy of the codec.
///
/// # Examples
///
/// ```
/// use core::any::Any;
/// use serde::{Deserialize, Serialize};
/// use tymap_registry::{impl_type_path, TypeMap, TypeRegistry};
/// use tymap_serde::{AffixCodec, PolyMapSerializer};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct NetworkConfig {
///     port: u16,
/// }
/// impl_type_path!(NetworkConfig as "pkg::model::NetworkConfig");
///
/// let mut registry = TypeRegistry::<dyn Any>::new();
/// registry.register::<NetworkConfig>();
///
/// let driver = PolyMapSerializer::new(&registry, AffixCodec::new("pkg::model::", "Config"));
///
/// let mut map = TypeMap::<dyn Any>::new();
/// map.insert(NetworkConfig { port: 8080 });
///
/// let form = driver.serialize(Some(&map)).unwrap().unwrap();
/// assert_eq!(form.get("Network").unwrap().get("port").unwrap().as_i64(), Some(8080));
///
/// let back = driver.deserialize(Some(form)).unwrap().unwrap();
/// assert_eq!(back.get::<NetworkConfig>(), Some(&NetworkConfig { port: 8080 }));
///
/// assert!(driver.serialize(None).unwrap().is_none());
/// ```
pub struct PolyMapSerializer<'f, B: ?Sized, C, F: ?Sized = TypeRegistry<B>> {
    factory: &'f F,
    codec: C,
    options: SectionOptions,
    policy: FailurePolicy,
    _marker: PhantomData<fn(&B)>,
}

impl<'f, B, C, F> PolyMapSerializer<'f, B, C, F>
where
    B: ?Sized + Bound,
    C: KeyCodec,
    F: ?Sized + SerializerFactory<B> + TypeLoader,
{
    /// Creates a driver with default [`SectionOptions`] and the failure policy of `codec`.
    pub fn new(factory: &'f F, codec: C) -> Self {
        let policy = codec.failure_policy();
        Self {
            factory,
            codec,
            options: SectionOptions::default(),
            policy,
            _marker: PhantomData,
        }
    }

    /// Sets the options handed to every per-type serializer.
    pub fn with_options(mut self, options: SectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Overrides the failure policy of the codec.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    #[inline]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    #[inline]
    pub fn options(&self) -> &SectionOptions {
        &self.options
    }

    /// Serializes every entry of `map`, in order. `None` gives `None`.
    ///
    /// Any error aborts the call, no partial form is returned.
    /// Entries whose keys collide overwrite each other: the key keeps the
    /// position of its first entry and holds the section of the last one.
    pub fn serialize(&self, map: Option<&TypeMap<B>>) -> Result<Option<SerializedForm>, PolyMapError> {
        let Some(map) = map else {
            return Ok(None);
        };

        let mut form = SerializedForm::with_capacity(map.len());
        for (ty, value) in map.iter() {
            let key = self.codec.encode(&ty)?;
            let section = self
                .factory
                .serializer_for(&ty, &self.options)?
                .serialize(value)?;

            log::trace!("serialized `{ty}` under `{key}`");
            if form.insert(key.as_ref(), section).is_some() {
                log::debug!("key `{key}` of `{ty}` overwrites an earlier entry");
            }
        }
        Ok(Some(form))
    }

    /// Deserializes every entry of `form`, in order. `None` gives `None`.
    ///
    /// With [`FailurePolicy::Lossy`], entries that fail are dropped with a
    /// warning. With [`FailurePolicy::Strict`], the first failing entry
    /// aborts the call.
    pub fn deserialize(&self, form: Option<SerializedForm>) -> Result<Option<TypeMap<B>>, PolyMapError> {
        let Some(form) = form else {
            return Ok(None);
        };

        let mut map = TypeMap::new();
        for (key, section) in form {
            match self.deserialize_entry(&mut map, &key, section) {
                Ok(ty) => log::trace!("deserialized `{ty}` from `{key}`"),
                Err(e) if self.policy.is_lossy() => {
                    log::warn!("dropping serialized entry `{key}`: {e}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Some(map))
    }

    fn deserialize_entry(
        &self,
        map: &mut TypeMap<B>,
        key: &str,
        section: Section,
    ) -> Result<Type, PolyMapError> {
        let ty = self.codec.decode(key, &self.factory)?;
        let value = self
            .factory
            .serializer_for(&ty, &self.options)?
            .deserialize(section)?;
        map.insert_dyn(ty, value)?;
        Ok(ty)
    }
}

impl<B: ?Sized, C: fmt::Debug, F: ?Sized> fmt::Debug for PolyMapSerializer<'_, B, C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolyMapSerializer")
            .field("codec", &self.codec)
            .field("options", &self.options)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::any::Any;

    use serde::{Deserialize, Serialize};
    use tymap_registry::{RegistryError, Type, TypeMap, TypeRegistry, Upcast};
    use tymap_section::{Section, SectionOptions, to_section};

    use super::{PolyMapSerializer, SerializedForm};
    use crate::{
        AffixCodec, AliasCodec, AliasTable, FailurePolicy, PolyMapError, SerializerFactory,
        TypeLoader, TypeSerializer,
    };

    pub trait Settings: Any {}
    tymap_registry::impl_bound!(dyn Settings);

    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    struct NetworkConfig {
        host: String,
        port: u16,
    }
    tymap_registry::impl_type_path!(NetworkConfig as "pkg::model::NetworkConfig");

    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    struct StorageConfig {
        path: String,
        quota: Option<u64>,
    }
    tymap_registry::impl_type_path!(StorageConfig as "pkg::model::StorageConfig");

    #[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
    struct DisplayConfig {
        width: u32,
        height: u32,
    }
    tymap_registry::impl_type_path!(DisplayConfig as "pkg::model::DisplayConfig");

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Telemetry {
        enabled: bool,
    }
    tymap_registry::impl_type_path!(Telemetry as "pkg::extra::Telemetry");

    // Its type path is the alias of `NetworkConfig`.
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Legacy {
        level: u8,
    }
    tymap_registry::impl_type_path!(Legacy as "network");

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Marker;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Flags {
        level: u8,
        marker: Marker,
    }
    tymap_registry::impl_type_path!(Flags as "pkg::model::Flags");

    tymap_registry::impl_upcast!(
        dyn Settings => NetworkConfig, StorageConfig, DisplayConfig, Telemetry, Legacy, Flags
    );
    impl Settings for NetworkConfig {}
    impl Settings for StorageConfig {}
    impl Settings for DisplayConfig {}
    impl Settings for Telemetry {}
    impl Settings for Legacy {}
    impl Settings for Flags {}

    fn network() -> NetworkConfig {
        NetworkConfig {
            host: "localhost".into(),
            port: 8080,
        }
    }

    fn storage() -> StorageConfig {
        StorageConfig {
            path: "/var/data".into(),
            quota: None,
        }
    }

    fn display() -> DisplayConfig {
        DisplayConfig {
            width: 1920,
            height: 1080,
        }
    }

    fn registry() -> TypeRegistry<dyn Settings> {
        let mut registry = TypeRegistry::new();
        registry.register::<NetworkConfig>();
        registry.register::<StorageConfig>();
        registry.register::<DisplayConfig>();
        registry.register::<Telemetry>();
        registry.register::<Legacy>();
        registry.register::<Flags>();
        registry
    }

    fn aliases() -> AliasCodec {
        AliasCodec::with_provider(
            AliasTable::new()
                .with::<NetworkConfig>("network")
                .with::<DisplayConfig>("display"),
        )
    }

    fn affixes() -> AffixCodec {
        AffixCodec::new("pkg::model::", "Config")
    }

    fn section_of<T: Serialize>(value: &T) -> Section {
        to_section(value, &SectionOptions::default()).unwrap()
    }

    fn keys(form: &SerializedForm) -> Vec<&str> {
        form.keys().collect()
    }

    #[test]
    fn none_gives_none() {
        let registry = registry();

        let alias = PolyMapSerializer::new(&registry, aliases());
        assert_eq!(alias.serialize(None), Ok(None));
        assert!(alias.deserialize(None).unwrap().is_none());

        let affix = PolyMapSerializer::new(&registry, affixes());
        assert_eq!(affix.serialize(None), Ok(None));
        assert!(affix.deserialize(None).unwrap().is_none());
    }

    #[test]
    fn alias_round_trip() {
        let registry = registry();
        let driver = PolyMapSerializer::new(&registry, aliases());
        assert_eq!(driver.policy(), FailurePolicy::Lossy);

        let mut map = TypeMap::<dyn Settings>::new();
        map.insert(storage());
        map.insert(network());
        map.insert(display());

        let form = driver.serialize(Some(&map)).unwrap().unwrap();
        assert_eq!(keys(&form), ["pkg::model::StorageConfig", "network", "display"]);
        assert!(form.get("network").unwrap().get("port").is_some());

        let back = driver.deserialize(Some(form)).unwrap().unwrap();
        assert_eq!(back.types().collect::<Vec<Type>>(), map.types().collect::<Vec<Type>>());
        assert_eq!(back.get::<StorageConfig>(), Some(&storage()));
        assert_eq!(back.get::<NetworkConfig>(), Some(&network()));
        assert_eq!(back.get::<DisplayConfig>(), Some(&display()));
    }

    #[test]
    fn affix_keys_follow_entry_order() {
        let registry = registry();
        let driver = PolyMapSerializer::new(&registry, affixes());
        assert_eq!(driver.policy(), FailurePolicy::Strict);
        assert_eq!(driver.codec().prefix(), "pkg::model::");

        let mut map = TypeMap::<dyn Settings>::new();
        map.insert(display());
        map.insert(network());
        map.insert(storage());

        let form = driver.serialize(Some(&map)).unwrap().unwrap();
        assert_eq!(keys(&form), ["Display", "Network", "Storage"]);

        let back = driver.deserialize(Some(form)).unwrap().unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.get::<NetworkConfig>(), Some(&network()));
    }

    #[test]
    fn affix_mismatch_fails_serialize() {
        let registry = registry();
        let driver = PolyMapSerializer::new(&registry, affixes());

        let mut map = TypeMap::<dyn Settings>::new();
        map.insert(network());
        map.insert(Telemetry { enabled: true });

        assert_eq!(
            driver.serialize(Some(&map)),
            Err(PolyMapError::AffixMismatch {
                name: "pkg::extra::Telemetry".into(),
                prefix: "pkg::model::".into(),
                suffix: "Config".into(),
            })
        );
    }

    #[test]
    fn lossy_drops_failed_entries() {
        let registry = registry();
        let driver = PolyMapSerializer::new(&registry, aliases());

        let form: SerializedForm = [
            ("network", section_of(&network())),
            ("pkg::model::Unknown", Section::Null),
            ("display", Section::from("not a display")),
            ("pkg::model::StorageConfig", section_of(&storage())),
        ]
        .into_iter()
        .collect();

        let map = driver.deserialize(Some(form)).unwrap().unwrap();
        let names: Vec<&str> = map.types().map(|ty| ty.name()).collect();
        assert_eq!(names, ["NetworkConfig", "StorageConfig"]);
    }

    #[test]
    fn strict_fails_on_first_error() {
        let registry = registry();
        let driver = PolyMapSerializer::new(&registry, affixes());

        let form: SerializedForm = [
            ("Network", section_of(&network())),
            ("Missing", Section::Null),
            ("Display", section_of(&display())),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            driver.deserialize(Some(form.clone())).unwrap_err(),
            PolyMapError::UnresolvedKey("Missing".into())
        );

        let strict_alias = PolyMapSerializer::new(&registry, aliases())
            .with_policy(FailurePolicy::Strict);
        assert!(matches!(
            strict_alias.deserialize(Some(form)),
            Err(PolyMapError::UnresolvedKey(_))
        ));
    }

    #[test]
    fn lossy_override_on_affix() {
        let registry = registry();
        let driver =
            PolyMapSerializer::new(&registry, affixes()).with_policy(FailurePolicy::Lossy);
        assert!(driver.policy().is_lossy());

        let form: SerializedForm = [
            ("Network", section_of(&network())),
            ("Missing", Section::Null),
            ("Display", section_of(&display())),
        ]
        .into_iter()
        .collect();

        let map = driver.deserialize(Some(form)).unwrap().unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains::<NetworkConfig>());
        assert!(map.contains::<DisplayConfig>());
    }

    #[test]
    fn alias_collision_keeps_last_write() {
        let registry = registry();
        let driver = PolyMapSerializer::new(&registry, aliases());

        let mut map = TypeMap::<dyn Settings>::new();
        map.insert(network());
        map.insert(storage());
        map.insert(Legacy { level: 2 });

        let form = driver.serialize(Some(&map)).unwrap().unwrap();
        assert_eq!(keys(&form), ["network", "pkg::model::StorageConfig"]);
        assert_eq!(form.get("network"), Some(&section_of(&Legacy { level: 2 })));

        // The alias wins over the type path when reading back.
        let back = driver.deserialize(Some(form)).unwrap().unwrap();
        assert!(back.get::<NetworkConfig>().is_none());
        assert!(back.get::<Legacy>().is_none());
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn keys_of_the_same_type_keep_the_last_value() {
        let registry = registry();
        let driver = PolyMapSerializer::new(&registry, aliases());

        let early = NetworkConfig {
            host: "early".into(),
            port: 1,
        };
        let form: SerializedForm = [
            ("pkg::model::NetworkConfig", section_of(&early)),
            ("pkg::model::StorageConfig", section_of(&storage())),
            ("network", section_of(&network())),
        ]
        .into_iter()
        .collect();

        let back = driver.deserialize(Some(form)).unwrap().unwrap();
        let names: Vec<&str> = back.types().map(|ty| ty.name()).collect();
        assert_eq!(names, ["NetworkConfig", "StorageConfig"]);
        assert_eq!(back.get::<NetworkConfig>(), Some(&network()));
    }

    #[test]
    fn unit_fields_round_trip() {
        let registry = registry();
        let driver = PolyMapSerializer::new(&registry, AliasCodec::new());

        let mut map = TypeMap::<dyn Settings>::new();
        map.insert(Flags {
            level: 1,
            marker: Marker,
        });

        let form = driver.serialize(Some(&map)).unwrap().unwrap();
        let flags = form.get("pkg::model::Flags").unwrap();
        assert_eq!(flags.get("marker"), Some(&Section::Null));

        let back = driver.deserialize(Some(form)).unwrap().unwrap();
        assert_eq!(
            back.get::<Flags>(),
            Some(&Flags {
                level: 1,
                marker: Marker,
            })
        );
    }

    // Deserializes every type as a `Legacy`.
    struct Forged;

    impl TypeSerializer<dyn Settings> for Forged {
        fn serialize(&self, _: &dyn Settings) -> Result<Section, PolyMapError> {
            Ok(Section::Null)
        }

        fn deserialize(&self, _: Section) -> Result<Box<dyn Settings>, PolyMapError> {
            Ok(<Legacy as Upcast<dyn Settings>>::upcast(Box::new(Legacy { level: 0 })))
        }
    }

    struct ForgingFactory(TypeRegistry<dyn Settings>);

    impl SerializerFactory<dyn Settings> for ForgingFactory {
        fn serializer_for(
            &self,
            _: &Type,
            _: &SectionOptions,
        ) -> Result<Box<dyn TypeSerializer<dyn Settings> + '_>, PolyMapError> {
            Ok(Box::new(Forged))
        }
    }

    impl TypeLoader for ForgingFactory {
        fn load_type_by_name(&self, type_path: &str) -> Result<Type, RegistryError> {
            self.0.load_type_by_name(type_path)
        }
    }

    #[test]
    fn values_of_another_type_are_rejected() {
        let factory = ForgingFactory(registry());
        let form: SerializedForm = [("Network", Section::Null), ("Display", Section::Null)]
            .into_iter()
            .collect();

        let strict = PolyMapSerializer::new(&factory, affixes());
        assert_eq!(
            strict.deserialize(Some(form.clone())).unwrap_err(),
            PolyMapError::Registry(RegistryError::TypeMismatch {
                expected: "pkg::model::NetworkConfig",
            })
        );

        let lossy = strict.with_policy(FailurePolicy::Lossy);
        assert!(lossy.deserialize(Some(form)).unwrap().unwrap().is_empty());
    }

    #[test]
    fn options_reach_the_serializer() {
        let registry = registry();
        let driver = PolyMapSerializer::new(&registry, affixes())
            .with_options(SectionOptions::new().with_output_nulls(true));
        assert!(driver.options().output_nulls);

        let mut map = TypeMap::<dyn Settings>::new();
        map.insert(storage());

        let form = driver.serialize(Some(&map)).unwrap().unwrap();
        assert_eq!(form.get("Storage").unwrap().get("quota"), Some(&Section::Null));

        let plain = PolyMapSerializer::new(&registry, affixes());
        let form = plain.serialize(Some(&map)).unwrap().unwrap();
        assert_eq!(form.get("Storage").unwrap().get("quota"), None);
    }

    #[test]
    fn form_survives_json() {
        let registry = registry();
        let driver = PolyMapSerializer::new(&registry, aliases());

        let mut map = TypeMap::<dyn Settings>::new();
        map.insert(display());
        map.insert(storage());
        map.insert(network());

        let form = driver.serialize(Some(&map)).unwrap().unwrap();
        let text = serde_json::to_string(&form).unwrap();
        let parsed: SerializedForm = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, form);
        assert_eq!(keys(&parsed), ["display", "pkg::model::StorageConfig", "network"]);

        let back = driver.deserialize(Some(parsed)).unwrap().unwrap();
        assert_eq!(back.get::<StorageConfig>(), Some(&storage()));
    }

    #[test]
    fn unregistered_types_fail_serialize() {
        let mut registry = TypeRegistry::<dyn Settings>::new();
        registry.register::<NetworkConfig>();
        let driver = PolyMapSerializer::new(&registry, AliasCodec::new());

        let mut map = TypeMap::<dyn Settings>::new();
        map.insert(network());
        map.insert(display());

        assert_eq!(
            driver.serialize(Some(&map)),
            Err(PolyMapError::UnregisteredType("pkg::model::DisplayConfig".into()))
        );
    }

    #[test]
    fn debug_shows_configuration() {
        let registry = TypeRegistry::<dyn Any>::new();
        let driver = PolyMapSerializer::new(&registry, affixes());
        let text = alloc::format!("{driver:?}");
        assert!(text.contains("Strict"));
        assert!(text.contains("Config"));
    }
}
