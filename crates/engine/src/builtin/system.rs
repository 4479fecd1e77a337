//! System capabilities
//!
//! OS metrics come from `sysinfo`; every call takes a fresh reading, so these
//! results are not reproducible between runs.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::net::UdpSocket;
use std::path::Path;

use chrono::Local;
use fescall_core::CapabilitiesConfig;
use sysinfo::{Disks, System};

use crate::coercion::single_text;
use crate::function::{ArgKind, FunctionSpec, Value};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const READ_CHUNK: usize = 4096;

/// Limits applied by the file capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemOptions {
    pub read_file_max_chars: usize,
    pub list_files_limit: usize,
}

impl Default for SystemOptions {
    fn default() -> Self {
        Self::from(&CapabilitiesConfig::default())
    }
}

impl From<&CapabilitiesConfig> for SystemOptions {
    fn from(config: &CapabilitiesConfig) -> Self {
        Self { read_file_max_chars: config.read_file_max_chars, list_files_limit: config.list_files_limit }
    }
}

/// System capabilities
pub fn functions(options: SystemOptions) -> Vec<FunctionSpec> {
    let SystemOptions { read_file_max_chars, list_files_limit } = options;

    vec![
        FunctionSpec::new("get_cpu_usage", "1-minute load as a share of CPU capacity", ArgKind::None, |_| {
            cpu_usage().map(Value::Text)
        }),
        FunctionSpec::new("get_memory_usage", "Used and total memory", ArgKind::None, |_| {
            memory_usage().map(Value::Text)
        }),
        FunctionSpec::new("get_disk_usage", "Used and total space of the root filesystem", ArgKind::None, |_| {
            disk_usage().map(Value::Text)
        }),
        FunctionSpec::new("get_uptime", "Time since boot", ArgKind::None, |_| {
            Ok(Value::Text(format_uptime(System::uptime())))
        }),
        FunctionSpec::new("get_ip", "Local IP address of the default route", ArgKind::None, |_| {
            local_ip().map(Value::Text)
        }),
        FunctionSpec::new("get_date", "Current local date and time", ArgKind::None, |_| {
            Ok(Value::Text(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()))
        }),
        FunctionSpec::new("read_file", "Beginning of a text file", ArgKind::String, move |args| {
            read_file(single_text(args)?, read_file_max_chars).map(Value::Text)
        }),
        FunctionSpec::new("list_files", "Entries of a directory", ArgKind::String, move |args| {
            list_files(single_text(args)?, list_files_limit).map(Value::List)
        }),
    ]
}

fn cpu_usage() -> Result<String, String> {
    let mut sys = System::new();
    sys.refresh_cpu();
    let cpus = sys.cpus().len();
    if cpus == 0 {
        return Err("Unable to get CPU usage".to_string());
    }

    let load = System::load_average().one;
    Ok(format!("{:.1}%", load / cpus as f64 * 100.0))
}

fn memory_usage() -> Result<String, String> {
    let mut sys = System::new();
    sys.refresh_memory();
    let total = sys.total_memory();
    if total == 0 {
        return Err("Unable to get memory usage".to_string());
    }

    let used = total.saturating_sub(sys.available_memory());
    Ok(format_usage(used, total))
}

fn disk_usage() -> Result<String, String> {
    let disks = Disks::new_with_refreshed_list();
    let root = disks
        .list()
        .iter()
        .find(|disk| disk.mount_point() == Path::new("/"))
        .ok_or_else(|| "Unable to get disk usage: no filesystem mounted at /".to_string())?;

    let total = root.total_space();
    if total == 0 {
        return Err("Unable to get disk usage".to_string());
    }

    let used = total.saturating_sub(root.available_space());
    Ok(format_usage(used, total))
}

/// `"<used>GB / <total>GB (<pct>%)"` in GiB
pub fn format_usage(used_bytes: u64, total_bytes: u64) -> String {
    let used = used_bytes as f64 / GIB;
    let total = total_bytes as f64 / GIB;
    let percent = if total_bytes == 0 { 0.0 } else { used_bytes as f64 / total_bytes as f64 * 100.0 };
    format!("{:.1}GB / {:.1}GB ({:.0}%)", used, total, percent)
}

pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    format!("{} days, {} hours, {} minutes", days, hours, minutes)
}

/// Address the OS would use for outbound traffic; connecting UDP sends nothing.
fn local_ip() -> Result<String, String> {
    let socket = UdpSocket::bind("0.0.0.0:0").map_err(|e| format!("Unable to get IP address: {}", e))?;
    socket
        .connect("8.8.8.8:80")
        .map_err(|e| format!("Unable to get IP address: {}", e))?;
    let addr = socket.local_addr().map_err(|e| format!("Unable to get IP address: {}", e))?;
    Ok(addr.ip().to_string())
}

/// First `max_chars` characters of a file; only the bytes needed are read
pub fn read_file(path: &str, max_chars: usize) -> Result<String, String> {
    let path = path.trim();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(format!("File not found: {}", path)),
        Err(e) => return Err(e.to_string()),
    };
    read_prefix(BufReader::new(file), max_chars).map_err(|e| e.to_string())
}

/// Decodes UTF-8 from `reader` until `max_chars` characters are collected or input ends
fn read_prefix<R: Read>(mut reader: R, max_chars: usize) -> std::io::Result<String> {
    let mut content = String::new();
    let mut count = 0;
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];

    while count < max_chars {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        pending.extend_from_slice(&chunk[..read]);

        let (valid, invalid) = match std::str::from_utf8(&pending) {
            Ok(text) => (text, false),
            Err(e) => {
                let valid = std::str::from_utf8(&pending[..e.valid_up_to()]).unwrap_or_default();
                (valid, e.error_len().is_some())
            }
        };

        for c in valid.chars().take(max_chars - count) {
            content.push(c);
            count += 1;
        }
        if count >= max_chars {
            break;
        }
        if invalid {
            return Err(invalid_utf8());
        }

        let consumed = valid.len();
        pending.drain(..consumed);
    }

    if count < max_chars && !pending.is_empty() {
        return Err(invalid_utf8());
    }
    Ok(content)
}

fn invalid_utf8() -> std::io::Error {
    std::io::Error::new(ErrorKind::InvalidData, "stream did not contain valid UTF-8")
}

/// Sorted entry names, at most `limit`
pub fn list_files(directory: &str, limit: usize) -> Result<Vec<String>, String> {
    let directory = directory.trim();
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(format!("Directory not found: {}", directory)),
        Err(e) => return Err(e.to_string()),
    };

    let mut names = entries
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().to_string()))
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(|e| format!("Unable to list {}: {}", directory, e))?;
    names.sort();
    names.truncate(limit);
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::Argument;

    fn spec(name: &str, options: SystemOptions) -> FunctionSpec {
        functions(options).into_iter().find(|s| s.name() == name).unwrap()
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0 days, 0 hours, 0 minutes");
        assert_eq!(format_uptime(90_061), "1 days, 1 hours, 1 minutes");
        assert_eq!(format_uptime(3 * 86_400 + 5 * 3_600 + 59 * 60 + 59), "3 days, 5 hours, 59 minutes");
    }

    #[test]
    fn test_format_usage() {
        let gib = 1024 * 1024 * 1024;
        assert_eq!(format_usage(4 * gib, 16 * gib), "4.0GB / 16.0GB (25%)");
        assert_eq!(format_usage(0, 0), "0.0GB / 0.0GB (0%)");
    }

    #[test]
    fn test_read_file_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.txt");
        std::fs::write(&path, "é".repeat(50)).unwrap();

        let content = read_file(path.to_str().unwrap(), 10).unwrap();
        assert_eq!(content.chars().count(), 10);
    }

    #[test]
    fn test_read_file_capability() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();

        let read = spec("read_file", SystemOptions::default());
        let result = read.invoke(&[Argument::Text(path.to_string_lossy().to_string())]);
        assert_eq!(result, Ok(Value::Text("hello".to_string())));
    }

    #[test]
    fn test_read_file_stops_after_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.log");
        let mut bytes = b"hello".to_vec();
        bytes.resize(1000, b'a');
        bytes.push(0xff);
        bytes.resize(4 * 1024 * 1024, b'b');
        std::fs::write(&path, bytes).unwrap();

        assert_eq!(read_file(path.to_str().unwrap(), 5), Ok("hello".to_string()));
        assert!(read_file(path.to_str().unwrap(), 2000).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_read_file_endless_source() {
        assert_eq!(read_file("/dev/zero", 5), Ok("\0".repeat(5)));
    }

    #[test]
    fn test_read_prefix_split_multibyte_chars() {
        struct OneByte<'a>(&'a [u8]);
        impl Read for OneByte<'_> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                match self.0.split_first() {
                    Some((first, rest)) => {
                        buf[0] = *first;
                        self.0 = rest;
                        Ok(1)
                    }
                    None => Ok(0),
                }
            }
        }

        let text = "héllo wörld";
        assert_eq!(read_prefix(OneByte(text.as_bytes()), 4).unwrap(), "héll");
        assert_eq!(read_prefix(OneByte(text.as_bytes()), 100).unwrap(), text);
        assert_eq!(read_prefix(OneByte(text.as_bytes()), 0).unwrap(), "");
        assert!(read_prefix(OneByte(&[b'a', 0xc3]), 10).is_err());
    }

    #[test]
    fn test_read_file_missing() {
        assert_eq!(read_file("/nonexistent/file.txt", 500), Err("File not found: /nonexistent/file.txt".to_string()));
    }

    #[test]
    fn test_list_files_sorted_and_limited() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.txt", "a.txt", "b.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let options = SystemOptions { read_file_max_chars: 500, list_files_limit: 2 };
        let list = spec("list_files", options);
        let result = list.invoke(&[Argument::Text(dir.path().to_string_lossy().to_string())]);
        assert_eq!(result, Ok(Value::List(vec!["a.txt".to_string(), "b.txt".to_string()])));
    }

    #[test]
    fn test_list_files_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "").unwrap();

        let err = list_files(file.to_str().unwrap(), 20).unwrap_err();
        assert!(!err.is_empty());
        assert!(!err.starts_with("Directory not found"));
    }

    #[test]
    fn test_list_files_missing() {
        assert_eq!(
            list_files("/nonexistent/dir", 20),
            Err("Directory not found: /nonexistent/dir".to_string())
        );
    }

    #[test]
    fn test_get_date_shape() {
        let value = spec("get_date", SystemOptions::default()).invoke(&[]).unwrap();
        let text = value.to_string();
        assert_eq!(text.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[test]
    fn test_get_uptime_shape() {
        let value = spec("get_uptime", SystemOptions::default()).invoke(&[]).unwrap();
        assert!(value.to_string().contains("days"));
    }

    #[test]
    fn test_metric_calls_never_panic() {
        for name in ["get_cpu_usage", "get_memory_usage", "get_disk_usage", "get_ip"] {
            let _ = spec(name, SystemOptions::default()).invoke(&[]);
        }
    }

    #[test]
    fn test_options_from_config() {
        let config = CapabilitiesConfig { list_files_limit: 3, ..CapabilitiesConfig::default() };
        let options = SystemOptions::from(&config);
        assert_eq!(options.list_files_limit, 3);
        assert_eq!(options.read_file_max_chars, 500);
    }
}
