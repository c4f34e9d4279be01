//! Standard PIMA 15740 operation/response/event/property/format tables.
//!
//! Values follow the PTP operation/event/format code constants and
//! `StandardResponseCode`/`StandardCommandCode::name()` (`a1ien-libptp`),
//! merged into one data-driven table builder instead of a separate
//! `match`-based `format_name`/`property_name` function per code family.

use crate::codec::datatype;
use crate::registry::{
    CodeTable, DataCodec, DataDirection, DatatypeDef, EventDef, FormatDef, OperationDef,
    OperationParam, ParamCodec, PropertyAccess, PropertyCodec, PropertyDef, Registry, ResponseDef,
};

pub fn build() -> Registry {
    Registry {
        little_endian: true,
        codecs: crate::codec::VariableValueCodec,
        datatypes: datatypes(),
        operations: operations(),
        responses: responses(),
        events: events(),
        properties: properties(),
        formats: formats(),
    }
}

fn dt(table: &mut CodeTable<DatatypeDef>, code: u16, name: &'static str) {
    table.insert(code as u32, name, DatatypeDef { code, name });
}

fn datatypes() -> CodeTable<DatatypeDef> {
    let mut t = CodeTable::new();
    dt(&mut t, datatype::UNDEFINED, "Undefined");
    dt(&mut t, datatype::INT8, "Int8");
    dt(&mut t, datatype::UINT8, "Uint8");
    dt(&mut t, datatype::INT16, "Int16");
    dt(&mut t, datatype::UINT16, "Uint16");
    dt(&mut t, datatype::INT32, "Int32");
    dt(&mut t, datatype::UINT32, "Uint32");
    dt(&mut t, datatype::INT64, "Int64");
    dt(&mut t, datatype::UINT64, "Uint64");
    dt(&mut t, datatype::INT128, "Int128");
    dt(&mut t, datatype::UINT128, "Uint128");
    dt(&mut t, datatype::ARRAY_INT8, "ArrayInt8");
    dt(&mut t, datatype::ARRAY_UINT8, "ArrayUint8");
    dt(&mut t, datatype::ARRAY_INT16, "ArrayInt16");
    dt(&mut t, datatype::ARRAY_UINT16, "ArrayUint16");
    dt(&mut t, datatype::ARRAY_INT32, "ArrayInt32");
    dt(&mut t, datatype::ARRAY_UINT32, "ArrayUint32");
    dt(&mut t, datatype::ARRAY_INT64, "ArrayInt64");
    dt(&mut t, datatype::ARRAY_UINT64, "ArrayUint64");
    dt(&mut t, datatype::ARRAY_INT128, "ArrayInt128");
    dt(&mut t, datatype::ARRAY_UINT128, "ArrayUint128");
    dt(&mut t, datatype::STRING, "String");
    t
}

/// Builds an [`OperationParam`] list from `(name, description, codec,
/// required)` tuples; kept as a free function so call sites read as a
/// plain table rather than a wall of struct literals.
fn params(entries: &[(&'static str, &'static str, ParamCodec, bool)]) -> Vec<OperationParam> {
    entries
        .iter()
        .map(|&(name, description, codec, required)| OperationParam {
            name,
            description,
            codec,
            required,
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn op(
    table: &mut CodeTable<OperationDef>,
    code: u16,
    name: &'static str,
    description: &'static str,
    direction: DataDirection,
    data_codec: Option<DataCodec>,
    operation_params: &[(&'static str, &'static str, ParamCodec, bool)],
    response_params: &[(&'static str, &'static str, ParamCodec, bool)],
) {
    table.insert(
        code as u32,
        name,
        OperationDef {
            code,
            name,
            description,
            data_direction: direction,
            data_codec,
            operation_params: params(operation_params),
            response_params: params(response_params),
        },
    );
}

fn operations() -> CodeTable<OperationDef> {
    let mut t = CodeTable::new();
    use DataCodec::{DeviceInfo, ObjectInfo, StorageInfo, U32Array, VariableValue};
    use DataDirection::{In, None as NoData, Out};
    use ParamCodec::U32;

    op(
        &mut t,
        0x1001,
        "GetDeviceInfo",
        "Reads the device's static capability/identity descriptor.",
        Out,
        Some(DeviceInfo),
        &[],
        &[],
    );
    op(
        &mut t,
        0x1002,
        "OpenSession",
        "Opens a session; resets the transaction counter.",
        NoData,
        None,
        &[("session_id", "Session ID to open.", U32, true)],
        &[],
    );
    op(
        &mut t,
        0x1003,
        "CloseSession",
        "Closes the currently open session.",
        NoData,
        None,
        &[],
        &[],
    );
    op(
        &mut t,
        0x1004,
        "GetStorageIDs",
        "Lists the device's storage IDs.",
        Out,
        Some(U32Array),
        &[],
        &[],
    );
    op(
        &mut t,
        0x1005,
        "GetStorageInfo",
        "Reads a single storage's capacity/description.",
        Out,
        Some(StorageInfo),
        &[("storage_id", "Storage ID to describe.", U32, true)],
        &[],
    );
    op(
        &mut t,
        0x1006,
        "GetNumObjects",
        "Counts objects matching a storage/format/parent filter.",
        NoData,
        None,
        &[
            ("storage_id", "Storage ID filter, or 0xFFFFFFFF for all.", U32, true),
            ("format_code", "Object format filter, or 0 for any.", U32, false),
            ("parent_handle", "Parent object handle filter, or 0 for root.", U32, false),
        ],
        &[("num_objects", "Matching object count.", U32, true)],
    );
    op(
        &mut t,
        0x1007,
        "GetObjectHandles",
        "Lists object handles matching a storage/format/parent filter.",
        Out,
        Some(U32Array),
        &[
            ("storage_id", "Storage ID filter, or 0xFFFFFFFF for all.", U32, true),
            ("format_code", "Object format filter, or 0 for any.", U32, false),
            ("parent_handle", "Parent object handle filter, or 0 for root.", U32, false),
        ],
        &[],
    );
    op(
        &mut t,
        0x1008,
        "GetObjectInfo",
        "Reads an object's metadata (size, format, filename, timestamps).",
        Out,
        Some(ObjectInfo),
        &[("object_handle", "Object handle to describe.", U32, true)],
        &[],
    );
    op(
        &mut t,
        0x1009,
        "GetObject",
        "Reads an object's full bytes in one data phase.",
        Out,
        Some(DataCodec::Raw),
        &[("object_handle", "Object handle to read.", U32, true)],
        &[],
    );
    op(
        &mut t,
        0x100A,
        "GetThumb",
        "Reads an object's thumbnail bytes.",
        Out,
        Some(DataCodec::Raw),
        &[("object_handle", "Object handle whose thumbnail to read.", U32, true)],
        &[],
    );
    op(
        &mut t,
        0x100B,
        "DeleteObject",
        "Deletes an object, or every object matching a format filter.",
        NoData,
        None,
        &[
            ("object_handle", "Object handle to delete, or 0xFFFFFFFF for all.", U32, true),
            ("format_code", "Object format filter when deleting in bulk.", U32, false),
        ],
        &[],
    );
    op(
        &mut t,
        0x100C,
        "SendObjectInfo",
        "Sends a new object's metadata ahead of its bytes.",
        In,
        Some(ObjectInfo),
        &[
            ("storage_id", "Destination storage ID, or 0 for the default.", U32, false),
            ("parent_handle", "Destination parent handle, or 0 for root.", U32, false),
        ],
        &[
            ("storage_id", "Storage ID the object was placed on.", U32, true),
            ("parent_handle", "Parent handle the object was placed under.", U32, true),
            ("object_handle", "Handle assigned to the new object.", U32, true),
        ],
    );
    op(
        &mut t,
        0x100D,
        "SendObject",
        "Sends a new object's bytes following a prior SendObjectInfo.",
        In,
        Some(DataCodec::Raw),
        &[],
        &[],
    );
    op(
        &mut t,
        0x100E,
        "InitiateCapture",
        "Triggers a still-image capture.",
        NoData,
        None,
        &[
            ("storage_id", "Destination storage ID, or 0 for the device default.", U32, false),
            ("format_code", "Object format to capture, or 0 for the device default.", U32, false),
        ],
        &[],
    );
    op(
        &mut t,
        0x100F,
        "FormatStore",
        "Formats a storage, destroying its contents.",
        NoData,
        None,
        &[
            ("storage_id", "Storage ID to format.", U32, true),
            ("filesystem_format", "Filesystem format code, or 0 for the device default.", U32, false),
        ],
        &[],
    );
    op(
        &mut t,
        0x1010,
        "ResetDevice",
        "Resets the device to its power-on state.",
        NoData,
        None,
        &[],
        &[],
    );
    op(
        &mut t,
        0x1011,
        "SelfTest",
        "Runs a device self-test.",
        NoData,
        None,
        &[("test_type", "Self-test type, or 0 for the default suite.", U32, false)],
        &[],
    );
    op(
        &mut t,
        0x1012,
        "SetObjectProtection",
        "Sets or clears an object's write-protection flag.",
        NoData,
        None,
        &[
            ("object_handle", "Object handle to protect/unprotect.", U32, true),
            ("protection_status", "0 = unprotected, 1 = read-only.", U32, true),
        ],
        &[],
    );
    op(
        &mut t,
        0x1013,
        "PowerDown",
        "Powers the device down.",
        NoData,
        None,
        &[],
        &[],
    );
    op(
        &mut t,
        0x1014,
        "GetDevicePropDesc",
        "Reads a property's full descriptor (form, range/enum, current value).",
        Out,
        Some(DataCodec::DevicePropDesc),
        &[("property_code", "Property code to describe.", U32, true)],
        &[],
    );
    op(
        &mut t,
        0x1015,
        "GetDevicePropValue",
        "Reads a property's current value.",
        Out,
        Some(VariableValue),
        &[("property_code", "Property code to read.", U32, true)],
        &[],
    );
    op(
        &mut t,
        0x1016,
        "SetDevicePropValue",
        "Writes a property's value.",
        In,
        Some(VariableValue),
        &[("property_code", "Property code to write.", U32, true)],
        &[],
    );
    op(
        &mut t,
        0x1017,
        "ResetDevicePropValue",
        "Resets a property to its factory default.",
        NoData,
        None,
        &[("property_code", "Property code to reset.", U32, true)],
        &[],
    );
    op(
        &mut t,
        0x1018,
        "TerminateOpenCapture",
        "Terminates an open (multi-shot) capture session.",
        NoData,
        None,
        &[("transaction_id", "Transaction ID that opened the capture.", U32, true)],
        &[],
    );
    op(
        &mut t,
        0x1019,
        "MoveObject",
        "Moves an object to a different storage/parent.",
        NoData,
        None,
        &[
            ("object_handle", "Object handle to move.", U32, true),
            ("storage_id", "Destination storage ID.", U32, true),
            ("parent_handle", "Destination parent handle, or 0 for root.", U32, false),
        ],
        &[],
    );
    op(
        &mut t,
        0x101A,
        "CopyObject",
        "Copies an object to a different storage/parent.",
        NoData,
        None,
        &[
            ("object_handle", "Object handle to copy.", U32, true),
            ("storage_id", "Destination storage ID.", U32, true),
            ("parent_handle", "Destination parent handle, or 0 for root.", U32, false),
        ],
        &[("object_handle", "Handle assigned to the copy.", U32, true)],
    );
    op(
        &mut t,
        0x101B,
        "GetPartialObject",
        "Reads a byte range of an object's data.",
        Out,
        Some(DataCodec::Raw),
        &[
            ("object_handle", "Object handle to read.", U32, true),
            ("offset", "Byte offset to start reading at.", U32, true),
            ("max_length", "Maximum number of bytes to read.", U32, true),
        ],
        &[("bytes_read", "Number of bytes actually returned.", U32, true)],
    );
    op(
        &mut t,
        0x101C,
        "InitiateOpenCapture",
        "Begins an open (multi-shot) capture session.",
        NoData,
        None,
        &[
            ("storage_id", "Destination storage ID, or 0 for the device default.", U32, false),
            ("format_code", "Object format to capture, or 0 for the device default.", U32, false),
        ],
        &[],
    );

    t
}

fn resp(table: &mut CodeTable<ResponseDef>, code: u16, name: &'static str, description: &'static str) {
    table.insert(
        code as u32,
        name,
        ResponseDef {
            code,
            name,
            description,
        },
    );
}

fn responses() -> CodeTable<ResponseDef> {
    let mut t = CodeTable::new();
    resp(&mut t, 0x2000, "Undefined", "Reserved; never sent.");
    resp(&mut t, 0x2001, "Ok", "The operation completed successfully.");
    resp(&mut t, 0x2002, "GeneralError", "Unspecified failure.");
    resp(&mut t, 0x2003, "SessionNotOpen", "No session is currently open.");
    resp(&mut t, 0x2004, "InvalidTransactionId", "The transaction ID did not match the expected value.");
    resp(&mut t, 0x2005, "OperationNotSupported", "The device does not implement this operation.");
    resp(&mut t, 0x2006, "ParameterNotSupported", "One or more operation parameters are not supported.");
    resp(&mut t, 0x2007, "IncompleteTransfer", "The data phase ended before the advertised length was reached.");
    resp(&mut t, 0x2008, "InvalidStorageId", "The storage ID does not exist.");
    resp(&mut t, 0x2009, "InvalidObjectHandle", "The object handle does not exist.");
    resp(&mut t, 0x200A, "DevicePropNotSupported", "The device property code does not exist.");
    resp(&mut t, 0x200B, "InvalidObjectFormatCode", "The object format code is not recognized.");
    resp(&mut t, 0x200C, "StoreFull", "The destination storage has no remaining capacity.");
    resp(&mut t, 0x200D, "ObjectWriteProtected", "The object is write-protected.");
    resp(&mut t, 0x200E, "StoreReadOnly", "The destination storage is read-only.");
    resp(&mut t, 0x200F, "AccessDenied", "The operation is not permitted.");
    resp(&mut t, 0x2010, "NoThumbnailPresent", "The object has no thumbnail.");
    resp(&mut t, 0x2011, "SelfTestFailed", "The device self-test failed.");
    resp(&mut t, 0x2012, "PartialDeletion", "Only some of the requested objects were deleted.");
    resp(&mut t, 0x2013, "StoreNotAvailable", "The storage is not currently accessible.");
    resp(&mut t, 0x2014, "SpecificationByFormatUnsupported", "Filtering by the given format code is not supported.");
    resp(&mut t, 0x2015, "NoValidObjectInfo", "No valid SendObjectInfo preceded SendObject.");
    resp(&mut t, 0x2016, "InvalidCodeFormat", "The code structure is malformed.");
    resp(&mut t, 0x2017, "UnknownVendorCode", "A vendor-specific code was not recognized.");
    resp(&mut t, 0x2018, "CaptureAlreadyTerminated", "No open capture session exists to terminate.");
    resp(&mut t, 0x2019, "DeviceBusy", "The device cannot process the operation right now.");
    resp(&mut t, 0x201A, "InvalidParentObject", "The parent object handle does not exist or cannot hold children.");
    resp(&mut t, 0x201B, "InvalidDevicePropFormat", "The property value's wire format is invalid.");
    resp(&mut t, 0x201C, "InvalidDevicePropValue", "The property value is out of range or not in its enum.");
    resp(&mut t, 0x201D, "InvalidParameter", "One or more operation parameters are invalid.");
    resp(&mut t, 0x201E, "SessionAlreadyOpen", "A session is already open; close it before opening a new one.");
    resp(&mut t, 0x201F, "TransactionCancelled", "The transaction was cancelled by a Cancel Request.");
    resp(&mut t, 0x2020, "SpecificationOfDestinationUnsupported", "The destination storage/parent combination is not supported.");
    t
}

fn evt(table: &mut CodeTable<EventDef>, code: u16, name: &'static str, description: &'static str) {
    table.insert(
        code as u32,
        name,
        EventDef {
            code,
            name,
            description,
        },
    );
}

fn events() -> CodeTable<EventDef> {
    let mut t = CodeTable::new();
    evt(&mut t, 0x4001, "CancelTransaction", "The in-progress transaction was cancelled.");
    evt(&mut t, 0x4002, "ObjectAdded", "A new object was created (e.g. by a capture).");
    evt(&mut t, 0x4003, "ObjectRemoved", "An object was deleted.");
    evt(&mut t, 0x4004, "StoreAdded", "A new storage became available.");
    evt(&mut t, 0x4005, "StoreRemoved", "A storage became unavailable.");
    evt(&mut t, 0x4006, "DevicePropChanged", "A device property's value changed.");
    evt(&mut t, 0x4007, "ObjectInfoChanged", "An object's metadata changed.");
    evt(&mut t, 0x4008, "DeviceInfoChanged", "The device's capability descriptor changed.");
    evt(&mut t, 0x4009, "RequestObjectTransfer", "The device is offering an object for the host to pull.");
    evt(&mut t, 0x400A, "StoreFull", "A storage reached capacity.");
    evt(&mut t, 0x400C, "StorageInfoChanged", "A storage's capacity/description changed.");
    evt(&mut t, 0x400D, "CaptureComplete", "A multi-step capture sequence finished.");
    t
}

#[allow(clippy::too_many_arguments)]
fn prop(
    table: &mut CodeTable<PropertyDef>,
    code: u32,
    name: &'static str,
    description: &'static str,
    dtype: u16,
    access: PropertyAccess,
    codec: Option<PropertyCodec>,
) {
    table.insert(
        code,
        name,
        PropertyDef {
            code,
            name,
            description,
            datatype: dtype,
            access,
            codec,
        },
    );
}

fn properties() -> CodeTable<PropertyDef> {
    let mut t = CodeTable::new();
    use PropertyAccess::{Get, GetSet};

    prop(&mut t, 0x5001, "BatteryLevel", "Remaining battery level.", datatype::UINT8, Get, None);
    prop(&mut t, 0x5002, "FunctionalMode", "The device's current operating mode.", datatype::UINT16, GetSet, None);
    prop(&mut t, 0x5003, "ImageSize", "Captured image resolution, as \"WxH\".", datatype::STRING, GetSet, None);
    prop(
        &mut t,
        0x5004,
        "CompressionSetting",
        "Captured image compression quality level.",
        datatype::UINT8,
        GetSet,
        None,
    );
    prop(&mut t, 0x5005, "WhiteBalance", "White balance mode.", datatype::UINT16, GetSet, None);
    prop(
        &mut t,
        0x5007,
        "FNumber",
        "Lens aperture, displayed as \"f/N\" (spec §8 aperture codec).",
        datatype::UINT16,
        GetSet,
        Some(PropertyCodec::Aperture),
    );
    prop(&mut t, 0x5008, "FocalLength", "Current lens focal length in mm.", datatype::UINT32, Get, None);
    prop(&mut t, 0x500A, "FocusMode", "Autofocus/manual focus mode.", datatype::UINT16, GetSet, None);
    prop(&mut t, 0x500C, "FlashMode", "Flash firing mode.", datatype::UINT16, GetSet, None);
    prop(
        &mut t,
        0x500D,
        "ExposureTime",
        "Shutter speed, displayed as a fraction or \"BULB\" (spec §8 shutter codec).",
        datatype::UINT32,
        GetSet,
        Some(PropertyCodec::ShutterSpeed),
    );
    prop(
        &mut t,
        0x500E,
        "ExposureProgramMode",
        "Exposure program (manual/aperture-priority/shutter-priority/auto).",
        datatype::UINT16,
        GetSet,
        None,
    );
    prop(
        &mut t,
        0x500F,
        "ExposureIndex",
        "ISO sensitivity, displayed as \"ISO N\" or \"ISO AUTO\" (spec §8 ISO codec).",
        datatype::UINT32,
        GetSet,
        Some(PropertyCodec::Iso),
    );
    prop(&mut t, 0x5011, "DateTime", "Device clock, ISO 8601-ish string.", datatype::STRING, GetSet, None);
    t
}

fn fmt(table: &mut CodeTable<FormatDef>, code: u16, name: &'static str) {
    table.insert(code as u32, name, FormatDef { code, name });
}

fn formats() -> CodeTable<FormatDef> {
    let mut t = CodeTable::new();
    fmt(&mut t, 0x3000, "Undefined");
    fmt(&mut t, 0x3001, "Association");
    fmt(&mut t, 0x3004, "Text");
    fmt(&mut t, 0x3801, "ExifJpeg");
    fmt(&mut t, 0x3802, "TiffEp");
    fmt(&mut t, 0x3804, "Bmp");
    fmt(&mut t, 0x3807, "Gif");
    fmt(&mut t, 0x380B, "Png");
    fmt(&mut t, 0x380D, "Tiff");
    fmt(&mut t, 0x3820, "Raw");
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_table_carries_all_named_spec_codes() {
        let t = responses();
        assert_eq!(t.by_code(0x2001).unwrap().name, "Ok");
        assert_eq!(t.by_code(0x2019).unwrap().name, "DeviceBusy");
        assert_eq!(t.by_code(0x2003).unwrap().name, "SessionNotOpen");
        assert_eq!(t.by_code(0x201E).unwrap().name, "SessionAlreadyOpen");
    }

    #[test]
    fn operation_table_has_data_direction_out_for_get_object() {
        let t = operations();
        assert_eq!(
            t.by_code(0x1009).unwrap().data_direction,
            DataDirection::Out
        );
        assert_eq!(
            t.by_code(0x1002).unwrap().data_direction,
            DataDirection::None
        );
    }
}
