//! Serial port handling
//!
//! Provides low-level serial port access for displays connected over USB
//! or a bluetooth serial link, and the [`SerialChannel`] transport built
//! on top of it.

use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::collections::HashMap;
#[cfg(target_os = "linux")]
use std::fs;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use super::channel::Transport;
use super::{ProtocolError, BAUD_RATE, DEFAULT_TIMEOUT_MS};

/// Information about an available serial port
#[derive(Debug, Clone)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyUSB0" or "COM3")
    pub name: String,

    /// USB vendor ID (if USB device)
    pub vid: Option<u16>,

    /// USB product ID (if USB device)
    pub pid: Option<u16>,

    /// Manufacturer name (if available)
    pub manufacturer: Option<String>,

    /// Product name (if available)
    pub product: Option<String>,

    /// Serial number (if available)
    pub serial_number: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (vid, pid, manufacturer, product, serial_number) = match info.port_type {
            SerialPortType::UsbPort(usb_info) => (
                Some(usb_info.vid),
                Some(usb_info.pid),
                usb_info.manufacturer,
                usb_info.product,
                usb_info.serial_number,
            ),
            _ => (None, None, None, None, None),
        };

        Self {
            name: info.port_name,
            vid,
            pid,
            manufacturer,
            product,
            serial_number,
        }
    }
}

impl PortInfo {
    /// Whether this port looks like a bluetooth serial link. Bluetooth
    /// displays sometimes reject the first INIT, so the handshake retries
    /// harder there.
    pub fn looks_like_bluetooth(&self) -> bool {
        let name = self.name.to_lowercase();
        if name.contains("rfcomm") || name.contains("bluetooth") {
            return true;
        }
        self.product
            .as_deref()
            .map(|p| p.to_lowercase().contains("bluetooth"))
            .unwrap_or(false)
    }
}

/// Helper used to sort port names so that:
///  - ttyACM* ports come first (sorted numerically by suffix)
///  - then ttyUSB* ports (sorted numerically)
///  - then other ports (sorted by name)
fn port_sort_key(name: &str) -> (u8, usize, String) {
    let basename = name.rsplit('/').next().unwrap_or(name);
    if let Some(rest) = basename.strip_prefix("ttyACM") {
        let num = rest.parse::<usize>().unwrap_or(usize::MAX);
        return (0, num, basename.to_string());
    }
    if let Some(rest) = basename.strip_prefix("ttyUSB") {
        let num = rest.parse::<usize>().unwrap_or(usize::MAX);
        return (1, num, basename.to_string());
    }
    (2, 0, basename.to_string())
}

/// List all available serial ports, with /dev fallbacks and deterministic ordering
pub fn list_ports() -> Vec<PortInfo> {
    // Collect from serialport API
    let mut map: HashMap<String, PortInfo> = HashMap::new();
    for info in serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
    {
        let p = PortInfo::from(info);
        map.entry(p.name.clone()).or_insert(p);
    }

    // Linux-only: Add /dev/ttyACM*, /dev/ttyUSB* and /dev/rfcomm* entries
    // if present but not found by the API
    #[cfg(target_os = "linux")]
    if let Ok(entries) = fs::read_dir("/dev") {
        for entry in entries.flatten() {
            if let Some(fname) = entry.file_name().to_str() {
                if fname.starts_with("ttyACM")
                    || fname.starts_with("ttyUSB")
                    || fname.starts_with("rfcomm")
                {
                    let full = format!("/dev/{}", fname);
                    map.entry(full.clone()).or_insert_with(|| PortInfo {
                        name: full,
                        vid: None,
                        pid: None,
                        manufacturer: None,
                        product: None,
                        serial_number: None,
                    });
                }
            }
        }
    }

    // Collect and sort deterministically
    let mut v: Vec<PortInfo> = map.into_values().collect();
    v.sort_by_key(|p| port_sort_key(&p.name));
    v
}

/// Open a serial port with the display's link settings (115200 baud, 8E1)
pub fn open_port(name: &str) -> Result<SerialChannel, ProtocolError> {
    let port = serialport::new(name, BAUD_RATE)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::Even)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
        .open()
        .map_err(|e| ProtocolError::SerialError(e.to_string()))?;

    Ok(SerialChannel::new(port))
}

/// Serial port transport for the framed protocol
pub struct SerialChannel {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialChannel {
    /// Wrap an already-open serial port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port: Some(port) }
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port closed"))
    }
}

impl Transport for SerialChannel {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let port = self.port()?;
        port.write_all(data)?;
        port.flush()
    }

    fn wait_for_data(&mut self, timeout: Duration) -> io::Result<bool> {
        let port = self.port()?;
        let deadline = Instant::now() + timeout;
        loop {
            let available = port
                .bytes_to_read()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            if available > 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let port = self.port()?;
        let deadline = Instant::now() + Duration::from_millis(DEFAULT_TIMEOUT_MS);
        let mut offset = 0;

        // Poll bytes_to_read() instead of relying on blocking reads, which
        // behave inconsistently across serial drivers.
        while offset < buf.len() {
            if Instant::now() >= deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("read {} of {} bytes", offset, buf.len()),
                ));
            }

            let available = port
                .bytes_to_read()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
                as usize;
            if available == 0 {
                std::thread::sleep(Duration::from_millis(2));
                continue;
            }

            let to_read = available.min(buf.len() - offset);
            match port.read(&mut buf[offset..offset + to_read]) {
                Ok(0) => {
                    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "serial EOF"));
                }
                Ok(n) => offset += n,
                Err(ref e)
                    if e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::WouldBlock =>
                {
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let port = self.port()?;
        let available = port
            .bytes_to_read()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))? as usize;
        if available == 0 {
            return Ok(0);
        }
        let to_read = available.min(buf.len());
        port.read(&mut buf[..to_read])
    }

    fn get_feature_report(&mut self, _report_id: u8) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "feature reports require the HID transport",
        ))
    }

    fn close(&mut self) -> io::Result<()> {
        // Dropping the handle releases the port; safe to call repeatedly.
        self.port = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_ports() {
        // This test just ensures the function doesn't panic
        let ports = list_ports();
        for port in &ports {
            println!("Found port: {} - {:?}", port.name, port.product);
        }
    }

    #[test]
    fn test_port_sorting() {
        let names = vec![
            "/dev/ttyUSB1",
            "/dev/ttyACM1",
            "/dev/ttyUSB0",
            "/dev/ttyACM0",
            "/dev/someport",
            "/dev/ttyACM10",
        ];
        let mut ports: Vec<PortInfo> = names
            .into_iter()
            .map(|n| PortInfo {
                name: n.to_string(),
                vid: None,
                pid: None,
                manufacturer: None,
                product: None,
                serial_number: None,
            })
            .collect();

        ports.sort_by_key(|p| port_sort_key(&p.name));
        let ordered: Vec<String> = ports.into_iter().map(|p| p.name).collect();

        assert_eq!(
            ordered,
            vec![
                "/dev/ttyACM0",
                "/dev/ttyACM1",
                "/dev/ttyACM10",
                "/dev/ttyUSB0",
                "/dev/ttyUSB1",
                "/dev/someport",
            ]
        );
    }

    #[test]
    fn test_bluetooth_detection() {
        let mut port = PortInfo {
            name: "/dev/rfcomm0".to_string(),
            vid: None,
            pid: None,
            manufacturer: None,
            product: None,
            serial_number: None,
        };
        assert!(port.looks_like_bluetooth());

        port.name = "/dev/ttyUSB0".to_string();
        assert!(!port.looks_like_bluetooth());

        port.product = Some("Brailliant Bluetooth Serial".to_string());
        assert!(port.looks_like_bluetooth());
    }
}
