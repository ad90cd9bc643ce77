//! Static field descriptors for configuration records.

use thiserror::Error;

use super::naming::resolve_tag;
use super::value::{FieldKind, FieldValue, ValueError};

/// A field list that does not describe a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error("field {position} has an empty identifier")]
    EmptyIdentifier { position: usize },
}

/// A struct whose fields can be filled from a [`ConfigMap`](super::ConfigMap).
///
/// Usually implemented with [`config_record!`](crate::config_record), but a
/// manual implementation only has to list its fields in declaration order:
///
/// ```
/// use flatconf::{FieldDescriptor, Record};
///
/// #[derive(Default)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// impl Record for Server {
///     fn fields(&mut self) -> Vec<FieldDescriptor<'_>> {
///         vec![
///             FieldDescriptor::new("host", None, &mut self.host),
///             FieldDescriptor::new("port", Some("listen_port,optional"), &mut self.port),
///         ]
///     }
/// }
/// ```
pub trait Record {
    fn fields(&mut self) -> Vec<FieldDescriptor<'_>>;
}

/// One field of a record, borrowed mutably for the duration of a bind.
pub struct FieldDescriptor<'a> {
    identifier: &'static str,
    tag: Option<&'static str>,
    slot: Slot<'a>,
}

enum Slot<'a> {
    Value(&'a mut dyn FieldValue),
    Unsupported(&'static str),
}

impl<'a> FieldDescriptor<'a> {
    /// Describes a field named `identifier`, optionally tagged with
    /// `"rename"`, `"optional"` or `"rename,optional"`.
    pub fn new(
        identifier: &'static str,
        tag: Option<&'static str>,
        value: &'a mut dyn FieldValue,
    ) -> Self {
        Self {
            identifier: strip_raw(identifier),
            tag,
            slot: Slot::Value(value),
        }
    }

    /// Describes a field whose type has no string conversion.
    ///
    /// Binding fails with [`ValueError::Unsupported`] if the field's key is
    /// present in the map.
    pub fn unsupported<T: ?Sized>(identifier: &'static str, tag: Option<&'static str>) -> Self {
        Self {
            identifier: strip_raw(identifier),
            tag,
            slot: Slot::Unsupported(std::any::type_name::<T>()),
        }
    }

    pub fn identifier(&self) -> &'static str {
        self.identifier
    }

    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    pub fn kind(&self) -> FieldKind {
        match &self.slot {
            Slot::Value(value) => (**value).kind(),
            Slot::Unsupported(_) => FieldKind::Unsupported,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.slot {
            Slot::Value(value) => (**value).type_name(),
            Slot::Unsupported(name) => *name,
        }
    }

    /// Resolves the external name and optional flag from the tag.
    pub fn resolve(&self) -> FieldSpec {
        let name = resolve_tag(self.identifier, self.tag);
        FieldSpec {
            identifier: self.identifier,
            external_name: name.external_name,
            optional: name.optional,
            kind: self.kind(),
        }
    }

    pub(crate) fn assign(&mut self, raw: &str) -> Result<(), ValueError> {
        match &mut self.slot {
            Slot::Value(value) => (**value).assign(raw),
            Slot::Unsupported(name) => Err(ValueError::Unsupported(*name)),
        }
    }
}

impl std::fmt::Debug for FieldDescriptor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("identifier", &self.identifier)
            .field("tag", &self.tag)
            .field("kind", &self.kind())
            .field("type_name", &self.type_name())
            .finish()
    }
}

/// The resolved description of a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub identifier: &'static str,
    /// The key looked up in the parsed map.
    pub external_name: String,
    pub optional: bool,
    pub kind: FieldKind,
}

/// Lists the resolved fields of `record` in declaration order.
pub fn describe<R: Record + ?Sized>(record: &mut R) -> Result<Vec<FieldSpec>, RecordError> {
    resolve_fields(&record.fields())
}

/// Resolves every descriptor, rejecting lists that name no real field.
pub(crate) fn resolve_fields(fields: &[FieldDescriptor<'_>]) -> Result<Vec<FieldSpec>, RecordError> {
    fields
        .iter()
        .enumerate()
        .map(|(position, field)| {
            if field.identifier.is_empty() {
                return Err(RecordError::EmptyIdentifier { position });
            }
            Ok(field.resolve())
        })
        .collect()
}

fn strip_raw(identifier: &'static str) -> &'static str {
    identifier.strip_prefix("r#").unwrap_or(identifier)
}

/// Declares a struct and implements [`Record`] for it.
///
/// Each field may carry a tag after its type, in the form `= "rename"`,
/// `= "optional"` or `= "rename,optional"`. Untagged fields are required and
/// looked up under the snake_case form of their name. Every field is
/// registered, whatever its visibility.
///
/// ```
/// flatconf::config_record! {
///     #[derive(Debug, Default)]
///     pub struct AppConfig {
///         pub name: String,
///         /// Port to listen on.
///         pub port: u16 = "listen_port",
///         pub debug: bool = "optional",
///     }
/// }
///
/// let mut config = AppConfig::default();
/// flatconf::read("app.conf", "name = demo\nlisten_port = 8080\n".as_bytes(), &mut config)?;
/// assert_eq!(config.port, 8080);
/// assert!(!config.debug);
/// # Ok::<(), flatconf::ConfigError>(())
/// ```
#[macro_export]
macro_rules! config_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(= $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            fn fields(&mut self) -> ::std::vec::Vec<$crate::FieldDescriptor<'_>> {
                ::std::vec![
                    $(
                        $crate::FieldDescriptor::new(
                            ::std::stringify!($field),
                            $crate::__config_tag!($($tag)?),
                            &mut self.$field,
                        ),
                    )*
                ]
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __config_tag {
    () => {
        ::std::option::Option::None
    };
    ($tag:literal) => {
        ::std::option::Option::Some($tag)
    };
}
