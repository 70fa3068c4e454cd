use std::fmt;
use std::fmt::{Display, Formatter};

use crate::function::Function;

#[derive(Debug, Clone)]
pub enum Command {
    Identify,
    Reset,
    ClearStatus,
    Remote,
    Local,
    OperationComplete,
    Read,
    NextError,
    // Function and range configuration
    Configure(Function),
    RangeAuto { prefix: &'static str, on: bool },
    FixedRange { prefix: &'static str, value: f64 },
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::Identify => f.write_str("*IDN?"),
            Command::Reset => f.write_str("*RST"),
            Command::ClearStatus => f.write_str("*CLS"),
            Command::Remote => f.write_str("SYSTem:REMote"),
            Command::Local => f.write_str("SYSTem:LOCal"),
            Command::OperationComplete => f.write_str("*OPC?"),
            Command::Read => f.write_str("READ?"),
            Command::NextError => f.write_str("SYST:ERR?"),
            Command::Configure(function) => f.write_str(function.configure_command()),
            Command::RangeAuto { prefix, on } => {
                write!(f, "{}:AUTO {}", prefix, if *on { "ON" } else { "OFF" })
            }
            Command::FixedRange { prefix, value } => write!(f, "{} {}", prefix, value),
        }
    }
}
