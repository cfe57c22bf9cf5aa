/// Group digits of a whole number with dots: 5700000 -> "5.700.000".
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

/// Format an amount as whole Rupiah: Rp 5.700.000
pub fn rupiah(val: f64) -> String {
    let rounded = val.round();
    let body = group_thousands(rounded.abs() as u64);
    if rounded < 0.0 {
        format!("-Rp {body}")
    } else {
        format!("Rp {body}")
    }
}

/// Compact axis label: 1,5jt for millions, 250rb for thousands.
pub fn compact(val: f64) -> String {
    let abs = val.abs();
    let (scaled, suffix) = if abs >= 1_000_000.0 {
        (val / 1_000_000.0, "jt")
    } else if abs >= 1_000.0 {
        (val / 1_000.0, "rb")
    } else {
        return format!("{}", val.round() as i64);
    };
    if scaled == scaled.floor() {
        format!("{}{suffix}", scaled as i64)
    } else {
        format!("{:.1}{suffix}", scaled).replace('.', ",")
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
