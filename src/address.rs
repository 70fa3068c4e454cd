//! Parsing of instrument address strings.
//!
//! An address is either an IP address or hostname (anything containing a
//! `.`), which maps to a raw SCPI socket on port 5025, or a COM port like
//! `COM3`. Resolution is pure string validation, no I/O happens here.

use std::fmt;
use std::fmt::{Display, Formatter};

use crate::proto::{Error, Result};
use crate::SCPI_PORT;

/// A resolved instrument address. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// LAN connection, raw SCPI socket on port 5025.
    Lan { host: String },
    /// Serial connection over a numbered COM port.
    Com { port: u32 },
}

impl Address {
    /// Create a new `Address` by parsing the given address string.
    ///
    /// - contains a `.` → LAN host (e.g. `192.168.0.2`)
    /// - `COM<digits>` (case-insensitive) → serial port
    ///
    /// Anything else fails with `Err(Error::InvalidAddress)`.
    pub fn parse(addr: &str) -> Result<Self> {
        if addr.contains('.') {
            return Ok(Address::Lan {
                host: addr.to_string(),
            });
        }

        let upper = addr.to_uppercase();
        if let Some(digits) = upper.strip_prefix("COM") {
            let port = digits
                .parse::<u32>()
                .map_err(|_| Error::InvalidAddress(addr.to_string()))?;
            return Ok(Address::Com { port });
        }

        Err(Error::InvalidAddress(addr.to_string()))
    }

    /// Serial device path for COM addresses, e.g. `COM3`.
    pub fn serial_path(&self) -> Option<String> {
        match self {
            Address::Lan { .. } => None,
            Address::Com { port } => Some(format!("COM{}", port)),
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Address::Lan { host } => write!(f, "{}:{}", host, SCPI_PORT),
            Address::Com { port } => write!(f, "COM{}", port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lan() {
        let addr = Address::parse("192.168.0.2").unwrap();
        match addr {
            Address::Lan { host } => assert_eq!(host, "192.168.0.2"),
            _ => panic!(),
        }

        let addr = Address::parse("dmm.lab.local").unwrap();
        match addr {
            Address::Lan { host } => assert_eq!(host, "dmm.lab.local"),
            _ => panic!(),
        }
    }

    #[test]
    fn parse_com() {
        let addr = Address::parse("COM3").unwrap();
        assert_eq!(addr, Address::Com { port: 3 });
        assert_eq!(addr.serial_path().unwrap(), "COM3");

        let addr = Address::parse("com12").unwrap();
        assert_eq!(addr, Address::Com { port: 12 });
    }

    #[test]
    fn parse_invalid() {
        for addr in ["", "COM", "COM3x", "LPT1", "localhost"] {
            assert!(matches!(
                Address::parse(addr),
                Err(Error::InvalidAddress(_))
            ));
        }
    }

    #[test]
    fn display() {
        assert_eq!(
            Address::parse("192.168.0.2").unwrap().to_string(),
            "192.168.0.2:5025"
        );
        assert_eq!(Address::parse("com1").unwrap().to_string(), "COM1");
    }
}
