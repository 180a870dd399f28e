//! Line parser for the device data file.
//!
//! One device per line: `<id>,<name>,<enabled>,<type-specific fields...>`.
//! The id prefix selects the variant.

use tracing::debug;

use crate::device::Device;
use crate::device::DeviceError;
use crate::device::DeviceKind;
use crate::device::EmbeddedDevice;
use crate::device::PersonalComputer;
use crate::device::Smartwatch;

const ID: usize = 0;
const NAME: usize = 1;
const ENABLED: usize = 2;
const EXTRA: usize = 3;
const NETWORK: usize = 4;

/// Why a line could not be split into a device's fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Corruption {
    #[error("unknown device id prefix")]
    UnknownPrefix,

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: &'static str, found: usize },

    #[error("'{0}' is not a boolean")]
    Boolean(String),

    #[error("'{0}' is not an integer battery level")]
    Integer(String),
}

/// A line that could not be turned into a device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line does not have the shape of any device.
    #[error("line {} is corrupted: {reason}", .line + 1)]
    CorruptedLine {
        line: usize,
        field: Option<usize>,
        reason: Corruption,
    },

    /// The line has the right shape but a value fails the device's own
    /// validation.
    #[error("line {}: {source}", .line + 1)]
    Invalid {
        line: usize,
        field: usize,
        #[source]
        source: DeviceError,
    },
}

impl ParseError {
    /// Zero-based index of the line within its source.
    pub fn line(&self) -> usize {
        match self {
            ParseError::CorruptedLine { line, .. } | ParseError::Invalid { line, .. } => *line,
        }
    }

    /// Zero-based index of the offending field, if one can be singled out.
    pub fn field(&self) -> Option<usize> {
        match self {
            ParseError::CorruptedLine { field, .. } => *field,
            ParseError::Invalid { field, .. } => Some(*field),
        }
    }
}

/// Parse one raw line into a device.
///
/// `line_index` is only used for error reporting.
pub fn parse_line(raw_line: &str, line_index: usize) -> Result<Device, ParseError> {
    let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
    let fields: Vec<&str> = line.split(',').collect();

    let corrupted = |field: Option<usize>, reason: Corruption| ParseError::CorruptedLine {
        line: line_index,
        field,
        reason,
    };
    let invalid = |field: usize, source: DeviceError| ParseError::Invalid {
        line: line_index,
        field,
        source,
    };

    let kind = DeviceKind::from_id(fields[ID])
        .ok_or_else(|| corrupted(Some(ID), Corruption::UnknownPrefix))?;

    let (min, max, expected) = match kind {
        DeviceKind::PersonalComputer => (3, 4, "3 or 4"),
        DeviceKind::Smartwatch => (4, 4, "4"),
        DeviceKind::EmbeddedDevice => (5, 5, "5"),
    };
    if !(min..=max).contains(&fields.len()) {
        return Err(corrupted(
            None,
            Corruption::FieldCount {
                expected,
                found: fields.len(),
            },
        ));
    }

    let (id, name) = (fields[ID], fields[NAME]);
    let enabled = parse_bool(fields[ENABLED])
        .ok_or_else(|| corrupted(Some(ENABLED), Corruption::Boolean(fields[ENABLED].to_string())))?;

    let device: Device = match kind {
        DeviceKind::PersonalComputer => {
            let os = fields.get(EXTRA).map(|os| os.to_string());
            PersonalComputer::new(id, name, enabled, os)
                .map_err(|e| invalid(field_of(&e, EXTRA), e))?
                .into()
        }
        DeviceKind::Smartwatch => {
            let raw = fields[EXTRA];
            let digits = raw.strip_suffix('%').unwrap_or(raw);
            let level: i64 = digits
                .trim()
                .parse()
                .map_err(|_| corrupted(Some(EXTRA), Corruption::Integer(raw.to_string())))?;
            Smartwatch::new(id, name, enabled, level)
                .map_err(|e| invalid(field_of(&e, EXTRA), e))?
                .into()
        }
        DeviceKind::EmbeddedDevice => {
            EmbeddedDevice::new(id, name, enabled, fields[EXTRA], fields[NETWORK])
                .map_err(|e| invalid(field_of(&e, EXTRA), e))?
                .into()
        }
    };

    debug!("Parsed line {}: {} ({})", line_index + 1, device.id(), kind);
    Ok(device)
}

/// Case-insensitive `true` / `false`.
fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Column an error refers to; `value_field` unless the error names another.
fn field_of(error: &DeviceError, value_field: usize) -> usize {
    match error {
        DeviceError::InvalidIdPrefix { .. } | DeviceError::InvalidText { field: "id", .. } => ID,
        DeviceError::InvalidText { field: "name", .. } => NAME,
        DeviceError::InvalidText {
            field: "network name",
            ..
        } => NETWORK,
        _ => value_field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_personal_computer() {
        let device = parse_line("P-1,Box,false,Linux", 0).unwrap();
        let Device::PersonalComputer(pc) = &device else {
            panic!("expected a personal computer, got {device:?}");
        };
        assert_eq!(pc.id(), "P-1");
        assert_eq!(pc.name(), "Box");
        assert!(!pc.is_enabled());
        assert_eq!(pc.operating_system(), Some("Linux"));
    }

    #[test]
    fn test_parse_personal_computer_without_os() {
        let device = parse_line("P-2,Bare,TRUE", 0).unwrap();
        let Device::PersonalComputer(pc) = &device else {
            panic!("expected a personal computer, got {device:?}");
        };
        assert!(pc.is_enabled());
        assert_eq!(pc.operating_system(), None);

        let trailing = parse_line("P-2,Bare,true,", 0).unwrap();
        assert_eq!(trailing, device);

        let blank = parse_line("P-2,Bare,true,  ", 0).unwrap();
        assert_eq!(blank, device);
    }

    #[test]
    fn test_parse_smartwatch_strips_percent() {
        let device = parse_line("SW-1,Watch,True,27%", 3).unwrap();
        let Device::Smartwatch(watch) = &device else {
            panic!("expected a smartwatch, got {device:?}");
        };
        assert_eq!(watch.battery_level(), 27);
        assert!(watch.is_enabled());
    }

    #[test]
    fn test_parse_embedded() {
        let device = parse_line("ED-1,Gate,false,10.0.0.1,MD Ltd. Office\r", 0).unwrap();
        let Device::EmbeddedDevice(ed) = &device else {
            panic!("expected an embedded device, got {device:?}");
        };
        assert_eq!(ed.ip_address().to_string(), "10.0.0.1");
        assert_eq!(ed.network_name(), "MD Ltd. Office");
        assert!(!ed.is_connected());
    }

    #[test]
    fn test_round_trip() {
        let lines = [
            "P-1,Box,false,Linux",
            "P-2,Bare,true",
            "SW-1,Watch,true,15%",
            "SW-2,Dead Watch,false,0%",
            "ED-1,Gate,false,192.168.0.254,MD Ltd. HQ",
            "ED-2,Sensor,true,10.0.0.1,Elsewhere",
        ];
        for line in lines {
            assert_eq!(parse_line(line, 0).unwrap().serialize(), line);
        }
    }

    #[test]
    fn test_unknown_prefix() {
        assert_eq!(
            parse_line("X-1,Thing,true", 4),
            Err(ParseError::CorruptedLine {
                line: 4,
                field: Some(ID),
                reason: Corruption::UnknownPrefix,
            })
        );
        assert!(matches!(
            parse_line("", 0),
            Err(ParseError::CorruptedLine {
                reason: Corruption::UnknownPrefix,
                ..
            })
        ));
    }

    #[test]
    fn test_field_counts() {
        let cases = [
            ("P-1,Box", "3 or 4", 2),
            ("P-1,Box,true,Linux,extra", "3 or 4", 5),
            ("SW-1,Watch,true", "4", 3),
            ("ED-1,Gate,true,10.0.0.1", "5", 4),
        ];
        for (line, expected, found) in cases {
            assert_eq!(
                parse_line(line, 0),
                Err(ParseError::CorruptedLine {
                    line: 0,
                    field: None,
                    reason: Corruption::FieldCount { expected, found },
                }),
                "{line}"
            );
        }
    }

    #[test]
    fn test_bad_boolean() {
        assert_eq!(
            parse_line("SW-1,Watch,yes,50%", 1),
            Err(ParseError::CorruptedLine {
                line: 1,
                field: Some(ENABLED),
                reason: Corruption::Boolean("yes".to_string()),
            })
        );
    }

    #[test]
    fn test_bad_battery_integer() {
        assert_eq!(
            parse_line("SW-1,Watch,true,lots%", 0),
            Err(ParseError::CorruptedLine {
                line: 0,
                field: Some(EXTRA),
                reason: Corruption::Integer("lots%".to_string()),
            })
        );
    }

    #[test]
    fn test_invalid_values_surface_device_errors() {
        assert_eq!(
            parse_line("SW-1,Watch,true,150%", 2),
            Err(ParseError::Invalid {
                line: 2,
                field: EXTRA,
                source: DeviceError::OutOfRange(150),
            })
        );
        assert_eq!(
            parse_line("ED-1,Gate,true,300.1.1.1,MD Ltd.", 2),
            Err(ParseError::Invalid {
                line: 2,
                field: EXTRA,
                source: DeviceError::InvalidFormat("300.1.1.1".to_string()),
            })
        );
        assert_eq!(
            parse_line("P-1,Bo\rx,true", 4),
            Err(ParseError::Invalid {
                line: 4,
                field: NAME,
                source: DeviceError::InvalidText {
                    field: "name",
                    value: "Bo\rx".to_string(),
                },
            })
        );
    }

    #[test]
    fn test_error_messages_are_one_based() {
        let err = parse_line("SW-1,Watch,maybe,50%", 0).unwrap_err();
        assert_eq!(err.to_string(), "line 1 is corrupted: 'maybe' is not a boolean");
        assert_eq!(err.line(), 0);
        assert_eq!(err.field(), Some(ENABLED));
    }
}
