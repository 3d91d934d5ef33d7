//! Byte unit helpers

/// Bytes in one GiB
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Convert a GiB amount (possibly fractional) to bytes
pub fn gib_to_bytes(gib: f64) -> u64 {
    if gib <= 0.0 || !gib.is_finite() {
        return 0;
    }
    (gib * GIB as f64).round() as u64
}

pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / GIB as f64
}

/// Human readable size: `512 B`, `3 KB`, `12.50 MB`, `1.00 GB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit < 2 {
        format!("{:.0} {}", value, UNITS[unit])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
