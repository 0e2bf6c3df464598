//! Vendor feature-report wire format for the secondary indicator channel.
//!
//! Besides the standard LED output report, the host can push the indicator
//! byte through a vendor-defined feature report on a dedicated HID interface.
//! Some hosts (notably ones that virtualise or filter the boot keyboard LED
//! report) only deliver the signal this way. The payload is a single byte
//! with [`IndicatorFlags`] semantics, preceded by the report ID.

use thiserror::Error;

use crate::protocol::indicators::IndicatorFlags;

/// Report ID of the vendor feature report.
pub const VENDOR_REPORT_ID: u8 = 0x01;

/// HID report descriptor for the vendor indicator interface: one 8-bit
/// feature item on the vendor-defined usage page.
pub const VENDOR_REPORT_DESCRIPTOR: [u8; 21] = [
    0x06, 0x00, 0xFF, // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01, //       Usage (Vendor Usage 1)
    0xA1, 0x01, //       Collection (Application)
    0x85, 0x01, //         Report ID (1)
    0x15, 0x00, //         Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //         Report Size (8)
    0x95, 0x01, //         Report Count (1)
    0xB1, 0x02, //         Feature (Data, Variable, Absolute)
    0xC0, //             End Collection
];

/// Errors produced while decoding a vendor feature report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The buffer is too short to hold a report ID plus payload byte.
    #[error("feature report too short: {len} bytes, need at least 2")]
    TooShort { len: usize },

    /// The report ID does not belong to the vendor indicator report.
    #[error("unexpected report ID 0x{0:02x}")]
    UnknownReportId(u8),
}

/// Decodes a vendor feature report into indicator flags.
///
/// `buf` is the raw report as delivered by the transport: report ID first,
/// indicator byte second. Trailing bytes are tolerated (transports commonly
/// pad to the endpoint size) and ignored.
///
/// # Errors
///
/// Returns [`ReportError::TooShort`] for buffers under two bytes and
/// [`ReportError::UnknownReportId`] when the leading byte is not
/// [`VENDOR_REPORT_ID`].
pub fn decode_feature_report(buf: &[u8]) -> Result<IndicatorFlags, ReportError> {
    if buf.len() < 2 {
        return Err(ReportError::TooShort { len: buf.len() });
    }
    if buf[0] != VENDOR_REPORT_ID {
        return Err(ReportError::UnknownReportId(buf[0]));
    }
    Ok(IndicatorFlags::from_bits(buf[1]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
