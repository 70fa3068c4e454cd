//! Measurement function tables.
//!
//! Maps the logical function names used on the command line to their SCPI
//! CONFigure commands and, for functions with a physical range, the SENSe
//! prefix used for standalone range control.

use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::proto::Error;

/// A measurement function of the HMC8012.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// DC voltage
    Dcv,
    /// AC voltage
    Acv,
    /// DC current
    Dci,
    /// AC current
    Aci,
    /// 2-wire resistance
    Res,
    /// 4-wire resistance
    Fres,
    /// Capacitance
    Cap,
    /// Temperature
    Temp,
    /// Frequency
    Freq,
    /// Continuity
    Cont,
    /// Diode test
    Diod,
}

impl Function {
    pub const ALL: [Function; 11] = [
        Function::Dcv,
        Function::Acv,
        Function::Dci,
        Function::Aci,
        Function::Res,
        Function::Fres,
        Function::Cap,
        Function::Temp,
        Function::Freq,
        Function::Cont,
        Function::Diod,
    ];

    /// Logical name as used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Function::Dcv => "dcv",
            Function::Acv => "acv",
            Function::Dci => "dci",
            Function::Aci => "aci",
            Function::Res => "res",
            Function::Fres => "fres",
            Function::Cap => "cap",
            Function::Temp => "temp",
            Function::Freq => "freq",
            Function::Cont => "cont",
            Function::Diod => "diod",
        }
    }

    /// SCPI command selecting this measurement function.
    pub fn configure_command(&self) -> &'static str {
        match self {
            Function::Dcv => "CONF:VOLT:DC",
            Function::Acv => "CONF:VOLT:AC",
            Function::Dci => "CONF:CURR:DC",
            Function::Aci => "CONF:CURR:AC",
            Function::Res => "CONF:RES",
            Function::Fres => "CONF:FRES",
            Function::Cap => "CONF:CAP",
            Function::Temp => "CONF:TEMP",
            Function::Freq => "CONF:FREQ",
            Function::Cont => "CONF:CONT",
            Function::Diod => "CONF:DIOD",
        }
    }

    /// SENSe prefix for range control, `None` for functions without a
    /// physical range (temp, freq, cont, diod).
    pub fn range_prefix(&self) -> Option<&'static str> {
        match self {
            Function::Dcv => Some("VOLT:DC:RANGE"),
            Function::Acv => Some("VOLT:AC:RANGE"),
            Function::Dci => Some("CURR:DC:RANGE"),
            Function::Aci => Some("CURR:AC:RANGE"),
            Function::Res => Some("RES:RANGE"),
            Function::Fres => Some("FRES:RANGE"),
            Function::Cap => Some("CAP:RANGE"),
            Function::Temp | Function::Freq | Function::Cont | Function::Diod => None,
        }
    }

    pub fn has_range(&self) -> bool {
        self.range_prefix().is_some()
    }

    /// All logical names, comma separated, for error messages and CLI help.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Function {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .iter()
            .find(|f| f.name() == lower)
            .copied()
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown function '{}', valid: {}",
                    s,
                    Self::valid_names()
                ))
            })
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!("dcv".parse::<Function>().unwrap(), Function::Dcv);
        assert_eq!("DCV".parse::<Function>().unwrap(), Function::Dcv);
        assert_eq!("fres".parse::<Function>().unwrap(), Function::Fres);
        assert!(matches!(
            "watt".parse::<Function>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn configure_commands() {
        assert_eq!(Function::Dcv.configure_command(), "CONF:VOLT:DC");
        assert_eq!(Function::Aci.configure_command(), "CONF:CURR:AC");
        assert_eq!(Function::Diod.configure_command(), "CONF:DIOD");
    }

    #[test]
    fn range_support() {
        assert_eq!(Function::Dcv.range_prefix(), Some("VOLT:DC:RANGE"));
        assert_eq!(Function::Cap.range_prefix(), Some("CAP:RANGE"));
        assert_eq!(Function::Temp.range_prefix(), None);
        assert!(!Function::Freq.has_range());
        assert!(Function::Res.has_range());
    }
}
