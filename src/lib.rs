//!
//! This library provides communication with a Rohde & Schwarz HMC8012
//! digital multimeter over SCPI.
//!
//! <br>
//!
//! # Details
//!
//! - The DMM is reachable either over LAN (raw SCPI socket on port 5025)
//!   or over a serial (COM) port.
//!
//! - Basic setup and connection
//!
//!   ```no_run
//!   use hmc8012ctrl::{Address, Device, DEFAULT_TIMEOUT};
//!   #[tokio::main]
//!   async fn main() -> hmc8012ctrl::Result<()> {
//!       let addr = Address::parse("192.168.0.2")?;
//!       let mut device = Device::connect(&addr, DEFAULT_TIMEOUT).await?;
//!       eprintln!("Connected to: {}\n", device.identify().await?);
//!       device.close().await;
//!       Ok(())
//!   }
//!   ```
//!

use std::time::Duration;

pub mod address;
pub mod device;
pub mod function;
pub mod proto;

pub use address::Address;
pub use device::Device;
pub use function::Function;
pub use proto::{Error, Result};

/// Raw SCPI socket port used by the HMC8012 for LAN connections.
pub const SCPI_PORT: u16 = 5025;

/// Default baudrate for the HMC8012 virtual COM port.
pub const DEFAULT_BAUDRATE: u32 = 9600;

/// Default timeout applied to connection open and every command round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
