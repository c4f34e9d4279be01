//! The typed operation/property/event/response registry (spec §3/§4.4).
//!
//! A single source of truth mapping operation, response, property, event,
//! and datatype codes to names and (for operations/properties) their data
//! direction and codec. Immutable after construction; vendor registries are
//! produced by shallow-merging vendor tables over the generic ones, vendor
//! entries winning on code collision.
//!
//! Builds on the same code-constant/`format_name`/`property_name`
//! reverse-lookup idea as `StandardResponseCode`/
//! `StandardCommandCode::name()` (`a1ien-libptp`), generalized into
//! data-driven tables instead of `match` arms per code family, so vendor
//! overlays can extend/override by code rather than needing a new `match`
//! arm per vendor.

pub mod canon;
pub mod nikon;
pub mod sony;
pub mod standard;

use std::collections::HashMap;

use crate::codec::{properties, Codec, Endian, Value, VariableValueCodec};
use crate::errors::CodecError;

/// Whether an operation's data phase (if any) flows host→device or
/// device→host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDirection {
    None,
    In,
    Out,
}

/// Which composite codec decodes an operation's data phase, when it has
/// one (spec §3 "OperationDef.data_codec").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCodec {
    VariableValue,
    DeviceInfo,
    ObjectInfo,
    StorageInfo,
    DevicePropDesc,
    U32Array,
    Raw,
}

/// The wire datatype of a single operation/response parameter. Command and
/// response parameters are always one 32-bit slot on the wire regardless of
/// this logical width (spec §4.4); `codec` documents the value's true range
/// rather than changing how many bytes are read off the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamCodec {
    U8,
    U16,
    U32,
}

/// One named, described parameter slot in an operation's command or
/// response phase (spec §3 `{ name, description, codec, required? }`).
#[derive(Debug, Clone)]
pub struct OperationParam {
    pub name: &'static str,
    pub description: &'static str,
    pub codec: ParamCodec,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct OperationDef {
    pub code: u16,
    pub name: &'static str,
    pub description: &'static str,
    pub data_direction: DataDirection,
    pub data_codec: Option<DataCodec>,
    pub operation_params: Vec<OperationParam>,
    pub response_params: Vec<OperationParam>,
}

#[derive(Debug, Clone)]
pub struct ResponseDef {
    pub code: u16,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct EventDef {
    pub code: u16,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAccess {
    Get,
    GetSet,
}

/// The display codec a property's raw value is run through before being
/// handed back to a caller (spec §3 "PropertyDef.codec": "converts the raw
/// primitive value to a user-visible form"). Bridges the byte-oriented
/// [`Codec<String>`] property codecs onto an already-decoded [`Value`] by
/// re-encoding through [`VariableValueCodec`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyCodec {
    Aperture,
    ShutterSpeed,
    Iso,
}

impl PropertyCodec {
    /// Converts a raw decoded property value into its display form, e.g.
    /// `Value::U16(350)` → `Value::Str("f/3.5")`.
    pub fn display(&self, raw: &Value, endian: Endian) -> Result<Value, CodecError> {
        let bytes = VariableValueCodec.encode(raw, endian)?;
        let (formatted, _) = match self {
            PropertyCodec::Aperture => properties::ApertureCodec.decode(&bytes, endian)?,
            PropertyCodec::ShutterSpeed => properties::ShutterSpeedCodec.decode(&bytes, endian)?,
            PropertyCodec::Iso => properties::IsoCodec.decode(&bytes, endian)?,
        };
        Ok(Value::Str(formatted))
    }
}

#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub code: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub datatype: u16,
    pub access: PropertyAccess,
    pub codec: Option<PropertyCodec>,
}

#[derive(Debug, Clone)]
pub struct FormatDef {
    pub code: u16,
    pub name: &'static str,
}

/// A base datatype's reverse-lookup entry (spec §3 "Registry.datatypes").
#[derive(Debug, Clone)]
pub struct DatatypeDef {
    pub code: u16,
    pub name: &'static str,
}

/// A named table indexed both by code and by name.
#[derive(Debug, Clone, Default)]
pub struct CodeTable<T> {
    by_code: HashMap<u32, T>,
    by_name: HashMap<&'static str, u32>,
}

impl<T: Clone> CodeTable<T> {
    pub fn new() -> Self {
        Self {
            by_code: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn insert(&mut self, code: u32, name: &'static str, value: T) {
        self.by_code.insert(code, value);
        self.by_name.insert(name, code);
    }

    pub fn by_code(&self, code: u32) -> Option<&T> {
        self.by_code.get(&code)
    }

    pub fn by_name(&self, name: &str) -> Option<&T> {
        self.by_name.get(name).and_then(|code| self.by_code.get(code))
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Shallow-merges `overlay` over `self`: overlay entries win on code
    /// collision, disjoint overlay codes are added as extensions.
    fn merged_with(&self, overlay: &Self) -> Self
    where
        T: 'static,
    {
        let mut merged = self.clone();
        for (code, value) in &overlay.by_code {
            merged.by_code.insert(*code, value.clone());
        }
        for (name, code) in &overlay.by_name {
            merged.by_name.insert(name, *code);
        }
        merged
    }
}

/// The immutable, per-endianness bundle of codecs/datatypes/operations/
/// responses/properties/events/formats (spec §3 "Registry").
#[derive(Debug, Clone)]
pub struct Registry {
    pub little_endian: bool,
    pub codecs: VariableValueCodec,
    pub datatypes: CodeTable<DatatypeDef>,
    pub operations: CodeTable<OperationDef>,
    pub responses: CodeTable<ResponseDef>,
    pub events: CodeTable<EventDef>,
    pub properties: CodeTable<PropertyDef>,
    pub formats: CodeTable<FormatDef>,
}

impl Registry {
    pub fn datatype_name(&self, code: u16) -> Option<&'static str> {
        self.datatypes.by_code(code as u32).map(|d| d.name)
    }

    pub fn endian(&self) -> Endian {
        if self.little_endian {
            Endian::Little
        } else {
            Endian::Big
        }
    }

    pub fn operation_name(&self, code: u16) -> Option<&'static str> {
        self.operations.by_code(code as u32).map(|o| o.name)
    }

    pub fn response_name(&self, code: u16) -> Option<&'static str> {
        self.responses.by_code(code as u32).map(|r| r.name)
    }

    pub fn event_name(&self, code: u16) -> Option<&'static str> {
        self.events.by_code(code as u32).map(|e| e.name)
    }

    pub fn property_by_code(&self, code: u32) -> Option<&PropertyDef> {
        self.properties.by_code(code)
    }

    pub fn property_by_name(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.by_name(name)
    }

    /// Produces the standard, vendor-free registry, little-endian (the
    /// USB transport's endianness per spec §4.1).
    pub fn standard() -> Self {
        standard::build()
    }

    /// Shallow-merges a vendor overlay over this registry per spec §3/§4.4:
    /// vendor entries win on code collision; disjoint vendor codes extend
    /// the table.
    pub fn merge(&self, overlay: &VendorOverlay) -> Self {
        Self {
            little_endian: self.little_endian,
            codecs: self.codecs,
            datatypes: self.datatypes.clone(),
            operations: self.operations.merged_with(&overlay.operations),
            responses: self.responses.merged_with(&overlay.responses),
            events: self.events.merged_with(&overlay.events),
            properties: self.properties.merged_with(&overlay.properties),
            formats: self.formats.merged_with(&overlay.formats),
        }
    }
}

/// A vendor's additions/overrides, mergeable onto the standard [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct VendorOverlay {
    pub operations: CodeTable<OperationDef>,
    pub responses: CodeTable<ResponseDef>,
    pub events: CodeTable<EventDef>,
    pub properties: CodeTable<PropertyDef>,
    pub formats: CodeTable<FormatDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_resolves_open_session() {
        let registry = Registry::standard();
        assert_eq!(registry.operation_name(0x1002), Some("OpenSession"));
        assert_eq!(registry.response_name(0x2001), Some("Ok"));
    }

    #[test]
    fn vendor_overlay_overrides_on_collision_and_extends_disjoint_codes() {
        let base = Registry::standard();
        let sony = sony::overlay();
        let merged = base.merge(&sony);

        // extension: a Sony-only op code not present in the base table.
        assert!(merged.operation_name(0x9201).is_some());
        // the base table's OpenSession is untouched (no collision here).
        assert_eq!(merged.operation_name(0x1002), Some("OpenSession"));
    }
}
